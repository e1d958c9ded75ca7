use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::category::{classify, explanation, CategoryGroup};
use crate::clock::{SessionClock, SystemTimeSource, TimeSource};
use crate::error::{ConfigError, GameError};
use crate::round::{OfferedGroup, RoundGenerator, RoundState};
use crate::scheduler::{Scheduler, Task};
use crate::score::ScoreTracker;

/// How long a round's result stays up before the next number appears.
pub const ROUND_RESULT_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub goal_points: u32,
    pub duration_minutes: u32,
    pub hover_enabled: bool,
    pub enabled_groups: BTreeSet<CategoryGroup>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            goal_points: 50,
            duration_minutes: 5,
            hover_enabled: true,
            enabled_groups: CategoryGroup::ALL.into_iter().collect(),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.goal_points == 0 {
            return Err(ConfigError::NonPositiveGoal);
        }
        if self.duration_minutes == 0 {
            return Err(ConfigError::NonPositiveDuration);
        }
        if self.enabled_groups.is_empty() {
            return Err(ConfigError::NoGroupsEnabled);
        }
        Ok(())
    }

    pub fn set_goal_points(&mut self, goal_points: u32) -> Result<(), ConfigError> {
        if goal_points == 0 {
            return Err(ConfigError::NonPositiveGoal);
        }
        self.goal_points = goal_points;
        Ok(())
    }

    pub fn set_duration_minutes(&mut self, minutes: u32) -> Result<(), ConfigError> {
        if minutes == 0 {
            return Err(ConfigError::NonPositiveDuration);
        }
        self.duration_minutes = minutes;
        Ok(())
    }

    pub fn set_hover_enabled(&mut self, enabled: bool) {
        self.hover_enabled = enabled;
    }

    pub fn set_enabled_groups<I>(&mut self, groups: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = CategoryGroup>,
    {
        let groups: BTreeSet<_> = groups.into_iter().collect();
        if groups.is_empty() {
            return Err(ConfigError::NoGroupsEnabled);
        }
        self.enabled_groups = groups;
        Ok(())
    }

    /// Turning off the last enabled group is refused.
    pub fn toggle_group(&mut self, group: CategoryGroup) -> Result<bool, ConfigError> {
        if self.enabled_groups.contains(&group) {
            if self.enabled_groups.len() == 1 {
                return Err(ConfigError::NoGroupsEnabled);
            }
            self.enabled_groups.remove(&group);
            Ok(false)
        } else {
            self.enabled_groups.insert(group);
            Ok(true)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
pub enum Phase {
    #[strum(to_string = "idle")]
    Idle,
    /// Only held inside [`GameSession::start`] while the clock and score are
    /// reset; `start` returns in [`Phase::RoundPending`].
    #[strum(to_string = "starting")]
    Active,
    #[strum(to_string = "waiting for answers")]
    RoundPending,
    #[strum(to_string = "showing round results")]
    RoundResolved,
    #[strum(to_string = "ended")]
    Ended { won: bool },
}

impl Phase {
    pub fn is_active(self) -> bool {
        matches!(
            self,
            Phase::Active | Phase::RoundPending | Phase::RoundResolved
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Encouragement {
    Better,
    Equal,
    Worse,
}

impl Encouragement {
    pub fn for_counts(correct: u32, incorrect: u32) -> Self {
        use std::cmp::Ordering;
        match correct.cmp(&incorrect) {
            Ordering::Greater => Encouragement::Better,
            Ordering::Equal => Encouragement::Equal,
            Ordering::Less => Encouragement::Worse,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Encouragement::Better => "Great job! Keep it up!",
            Encouragement::Equal => "Not bad! You can do even better!",
            Encouragement::Worse => "Don't give up! You're learning with each try!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub label: String,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundResult {
    pub number: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub verdicts: Vec<Verdict>,
    pub encouragement: Encouragement,
}

impl RoundResult {
    /// e.g. `Correct: 2, Incorrect: 1. Great job! Keep it up!`
    pub fn summary(&self) -> String {
        format!(
            "Correct: {}, Incorrect: {}. {}",
            self.correct,
            self.incorrect,
            self.encouragement.message()
        )
    }

    pub fn verdict_for(&self, label: &str) -> Option<bool> {
        self.verdicts
            .iter()
            .find(|v| v.label == label)
            .map(|v| v.correct)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionOutcome {
    pub won: bool,
    pub final_score: i64,
    pub goal: u32,
}

impl SessionOutcome {
    pub fn message(&self) -> String {
        if self.won {
            format!("Congratulations! You reached {} points!", self.goal)
        } else {
            "Time's up!".to_string()
        }
    }
}

/// Something the host should react to after a [`GameSession::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    RoundStarted { number: u32 },
    SessionEnded(SessionOutcome),
}

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub number: Option<u32>,
    pub offered: Vec<OfferedGroup>,
    pub selected: Vec<String>,
    pub score: i64,
    pub goal: u32,
    pub progress: f64,
    pub remaining: Duration,
    pub last_result: Option<RoundResult>,
    pub outcome: Option<SessionOutcome>,
}

/// One player's game, from the menu through rounds to the final result.
pub struct GameSession {
    config: SessionConfig,
    phase: Phase,
    generator: RoundGenerator,
    time: Box<dyn TimeSource>,
    clock: SessionClock,
    scheduler: Scheduler,
    epoch: u64,
    score: ScoreTracker,
    round: Option<RoundState>,
    last_result: Option<RoundResult>,
    outcome: Option<SessionOutcome>,
}

impl GameSession {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_parts(config, RoundGenerator::new(), SystemTimeSource)
    }

    pub fn with_parts<T>(config: SessionConfig, generator: RoundGenerator, time: T) -> Self
    where
        T: TimeSource + 'static,
    {
        let score = ScoreTracker::new(config.goal_points);
        Self {
            config,
            phase: Phase::Idle,
            generator,
            time: Box::new(time),
            clock: SessionClock::new(),
            scheduler: Scheduler::new(),
            epoch: 0,
            score,
            round: None,
            last_result: None,
            outcome: None,
        }
    }

    pub fn start(&mut self, config: SessionConfig) -> Result<(), GameError> {
        if self.phase.is_active() {
            return Err(self.invalid("start a session"));
        }
        if let Err(err) = config.validate() {
            tracing::warn!(%err, "rejected session settings");
            return Err(err.into());
        }

        self.config = config;
        self.epoch += 1;
        self.scheduler.cancel_all();
        self.score = ScoreTracker::new(self.config.goal_points);
        self.clock
            .start(self.config.duration_minutes, self.time.now());
        self.last_result = None;
        self.outcome = None;
        self.phase = Phase::Active;
        tracing::info!(
            epoch = self.epoch,
            goal = self.config.goal_points,
            minutes = self.config.duration_minutes,
            "session started"
        );

        self.begin_round();
        Ok(())
    }

    /// Replace the settings between sessions.
    pub fn configure(&mut self, config: SessionConfig) -> Result<(), GameError> {
        if self.phase.is_active() {
            return Err(self.invalid("change settings"));
        }
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn toggle_selection(&mut self, label: &str) -> Result<bool, GameError> {
        if self.expire_if_due() || self.phase != Phase::RoundPending {
            return Err(self.invalid("select a category"));
        }
        let round = self.round.as_mut().ok_or(GameError::InvalidState {
            operation: "select a category",
            phase: self.phase,
        })?;
        Ok(round.toggle(label))
    }

    /// Submit whatever has been selected with [`Self::toggle_selection`].
    pub fn submit_selection(&mut self) -> Result<RoundResult, GameError> {
        let selected = match (&self.round, self.phase) {
            (Some(round), Phase::RoundPending) => round.selected().clone(),
            _ => return Err(self.invalid("submit answers")),
        };
        self.submit_answers(selected)
    }

    /// Judge the selected labels against the current number and score them.
    ///
    /// Duplicate labels count once. Reaching the goal ends the session right
    /// away; otherwise the next round is scheduled after
    /// [`ROUND_RESULT_DELAY`].
    pub fn submit_answers<I, S>(&mut self, labels: I) -> Result<RoundResult, GameError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.expire_if_due() {
            return Err(self.invalid("submit answers"));
        }
        let number = match (&self.round, self.phase) {
            (Some(round), Phase::RoundPending) => round.number(),
            _ => return Err(self.invalid("submit answers")),
        };

        let labels: BTreeSet<String> = labels
            .into_iter()
            .map(|label| label.as_ref().to_string())
            .collect();
        let verdicts: Vec<Verdict> = labels
            .into_iter()
            .map(|label| {
                let correct = classify(&label, number);
                Verdict { label, correct }
            })
            .collect();
        let correct = verdicts.iter().filter(|v| v.correct).count() as u32;
        let incorrect = verdicts.len() as u32 - correct;

        self.score.apply_result(correct, incorrect);
        let result = RoundResult {
            number,
            correct,
            incorrect,
            verdicts,
            encouragement: Encouragement::for_counts(correct, incorrect),
        };
        tracing::debug!(
            number,
            correct,
            incorrect,
            score = self.score.score(),
            "answers checked"
        );

        if let Some(round) = self.round.as_mut() {
            round.clear_selection();
        }
        self.last_result = Some(result.clone());

        if self.score.has_won() {
            self.finish(true);
        } else {
            self.phase = Phase::RoundResolved;
            let due = self.time.now() + ROUND_RESULT_DELAY;
            self.scheduler.schedule(due, self.epoch, Task::AdvanceRound);
        }

        Ok(result)
    }

    /// Poll the clock and fire any scheduled work that is due.
    pub fn tick(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        let now = self.time.now();

        if self.phase.is_active() && self.clock.expired(now) {
            if let Ok(outcome) = self.on_time_expired() {
                events.push(SessionEvent::SessionEnded(outcome));
            }
        }

        for task in self.scheduler.take_due(now, self.epoch) {
            match task {
                Task::AdvanceRound if self.phase == Phase::RoundResolved => {
                    self.begin_round();
                    if let Some(round) = &self.round {
                        events.push(SessionEvent::RoundStarted {
                            number: round.number(),
                        });
                    }
                }
                Task::AdvanceRound => {
                    tracing::warn!(phase = %self.phase, "round advance fired outside results");
                }
            }
        }

        events
    }

    /// Time ran out. The session ends as lost unless the goal was already met.
    pub fn on_time_expired(&mut self) -> Result<SessionOutcome, GameError> {
        if !self.phase.is_active() {
            return Err(self.invalid("expire the clock"));
        }
        let won = self.score.has_won();
        Ok(self.finish(won))
    }

    pub fn end(&mut self, won: bool) -> Result<SessionOutcome, GameError> {
        if !self.phase.is_active() {
            return Err(self.invalid("end the session"));
        }
        Ok(self.finish(won))
    }

    /// Back to the main menu from anywhere, dropping the current session.
    pub fn return_to_menu(&mut self) {
        let now = self.time.now();
        self.clock.stop(now);
        self.scheduler.cancel_all();
        self.epoch += 1;
        self.round = None;
        self.last_result = None;
        self.outcome = None;
        self.phase = Phase::Idle;
        tracing::debug!(epoch = self.epoch, "returned to menu");
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn round(&self) -> Option<&RoundState> {
        self.round.as_ref()
    }

    pub fn current_number(&self) -> Option<u32> {
        self.round.as_ref().map(RoundState::number)
    }

    pub fn score(&self) -> i64 {
        self.score.score()
    }

    pub fn progress_fraction(&self) -> f64 {
        self.score.progress_fraction()
    }

    pub fn remaining(&self) -> Duration {
        self.clock.remaining(self.time.now())
    }

    pub fn last_result(&self) -> Option<&RoundResult> {
        self.last_result.as_ref()
    }

    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    /// Explanation for `label`, or `None` when hints are switched off.
    pub fn hint(&self, label: &str) -> Option<String> {
        if self.config.hover_enabled {
            explanation(label)
        } else {
            None
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            number: self.current_number(),
            offered: self
                .round
                .as_ref()
                .map(RoundState::offered_groups)
                .unwrap_or_default(),
            selected: self
                .round
                .as_ref()
                .map(|round| round.selected().iter().cloned().collect())
                .unwrap_or_default(),
            score: self.score.score(),
            goal: self.score.goal(),
            progress: self.score.progress_fraction(),
            remaining: self.remaining(),
            last_result: self.last_result.clone(),
            outcome: self.outcome,
        }
    }

    /// Ends an active session as lost once its deadline has passed, so late
    /// input is never scored.
    fn expire_if_due(&mut self) -> bool {
        if self.phase.is_active() && self.clock.expired(self.time.now()) {
            tracing::debug!(epoch = self.epoch, "input arrived after the deadline");
            self.finish(false);
            true
        } else {
            false
        }
    }

    fn begin_round(&mut self) {
        let round = self.generator.next_round(&self.config.enabled_groups);
        tracing::debug!(number = round.number(), epoch = self.epoch, "round started");
        self.round = Some(round);
        self.phase = Phase::RoundPending;
    }

    fn finish(&mut self, won: bool) -> SessionOutcome {
        let now = self.time.now();
        self.clock.stop(now);
        self.scheduler.cancel_all();
        let outcome = SessionOutcome {
            won,
            final_score: self.score.score(),
            goal: self.score.goal(),
        };
        self.outcome = Some(outcome);
        self.phase = Phase::Ended { won };
        tracing::info!(won, score = outcome.final_score, "session ended");
        outcome
    }

    fn invalid(&self, operation: &'static str) -> GameError {
        GameError::InvalidState {
            operation,
            phase: self.phase,
        }
    }
}
