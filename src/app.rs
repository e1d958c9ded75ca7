//! Front-end state: which screen is up, where the cursors are, and how keys
//! map onto [`GameSession`] calls.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::category::CategoryGroup;
use crate::session::{GameSession, Phase, SessionConfig, SessionEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Settings,
    Game,
    Finished,
}

/// Rows of the settings screen, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsRow {
    Goal,
    Duration,
    Hints,
    Group(CategoryGroup),
}

impl SettingsRow {
    pub fn all() -> Vec<SettingsRow> {
        let mut rows = vec![SettingsRow::Goal, SettingsRow::Duration, SettingsRow::Hints];
        rows.extend(CategoryGroup::ALL.into_iter().map(SettingsRow::Group));
        rows
    }
}

pub struct App {
    pub session: GameSession,
    /// Settings being edited; handed to the session when a game starts.
    pub settings: SessionConfig,
    pub screen: Screen,
    pub cursor: usize,
    pub settings_cursor: usize,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(session: GameSession) -> Self {
        let settings = session.config().clone();
        Self {
            session,
            settings,
            screen: Screen::Menu,
            cursor: 0,
            settings_cursor: 0,
            status: None,
            should_quit: false,
        }
    }

    /// Labels on the game screen in cursor order.
    pub fn game_labels(&self) -> Vec<String> {
        self.session
            .round()
            .map(|round| round.offered_categories().map(|c| c.label()).collect())
            .unwrap_or_default()
    }

    pub fn cursor_label(&self) -> Option<String> {
        self.game_labels().into_iter().nth(self.cursor)
    }

    pub fn on_tick(&mut self) {
        for event in self.session.tick() {
            match event {
                SessionEvent::RoundStarted { .. } => self.cursor = 0,
                SessionEvent::SessionEnded(_) => self.screen = Screen::Finished,
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Menu => self.menu_key(key.code),
            Screen::Settings => self.settings_key(key.code),
            Screen::Game => self.game_key(key.code),
            Screen::Finished => self.finished_key(key.code),
        }
    }

    fn menu_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('s') | KeyCode::Enter => self.start_game(),
            KeyCode::Char('c') => {
                self.status = None;
                self.settings_cursor = 0;
                self.screen = Screen::Settings;
            }
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn settings_key(&mut self, code: KeyCode) {
        let rows = SettingsRow::all();
        let row = rows[self.settings_cursor.min(rows.len() - 1)];

        let outcome = match code {
            KeyCode::Up => {
                self.settings_cursor = self.settings_cursor.saturating_sub(1);
                Ok(())
            }
            KeyCode::Down => {
                self.settings_cursor = (self.settings_cursor + 1).min(rows.len() - 1);
                Ok(())
            }
            KeyCode::Left | KeyCode::Char('-') => self.adjust(row, -1),
            KeyCode::Right | KeyCode::Char('+') => self.adjust(row, 1),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle(row),
            KeyCode::Esc | KeyCode::Char('b') => {
                match self.session.configure(self.settings.clone()) {
                    Ok(()) => {
                        self.status = None;
                        self.screen = Screen::Menu;
                    }
                    Err(err) => self.status = Some(err.to_string()),
                }
                return;
            }
            _ => Ok(()),
        };

        self.status = outcome.err();
    }

    fn adjust(&mut self, row: SettingsRow, delta: i64) -> Result<(), String> {
        let step = |value: u32| (value as i64 + delta).clamp(0, u32::MAX as i64) as u32;
        let result = match row {
            SettingsRow::Goal => self.settings.set_goal_points(step(self.settings.goal_points)),
            SettingsRow::Duration => self
                .settings
                .set_duration_minutes(step(self.settings.duration_minutes)),
            SettingsRow::Hints | SettingsRow::Group(_) => return self.toggle(row),
        };
        result.map_err(|err| err.to_string())
    }

    fn toggle(&mut self, row: SettingsRow) -> Result<(), String> {
        match row {
            SettingsRow::Hints => {
                let enabled = !self.settings.hover_enabled;
                self.settings.set_hover_enabled(enabled);
                Ok(())
            }
            SettingsRow::Group(group) => self
                .settings
                .toggle_group(group)
                .map(|_| ())
                .map_err(|err| err.to_string()),
            SettingsRow::Goal | SettingsRow::Duration => Ok(()),
        }
    }

    fn game_key(&mut self, code: KeyCode) {
        let count = self.game_labels().len();
        match code {
            KeyCode::Left | KeyCode::Up if count > 0 => {
                self.cursor = (self.cursor + count - 1) % count;
            }
            KeyCode::Right | KeyCode::Down | KeyCode::Tab if count > 0 => {
                self.cursor = (self.cursor + 1) % count;
            }
            KeyCode::Char(' ') => {
                if let Some(label) = self.cursor_label() {
                    if let Err(err) = self.session.toggle_selection(&label) {
                        tracing::debug!(%err, "selection ignored");
                    }
                }
            }
            KeyCode::Enter if self.session.phase() == Phase::RoundPending => {
                if let Err(err) = self.session.submit_selection() {
                    tracing::debug!(%err, "answers not accepted");
                }
            }
            KeyCode::Esc => {
                self.session.return_to_menu();
                self.screen = Screen::Menu;
                return;
            }
            _ => {}
        }

        // Reaching the goal or answering past the deadline ends the session.
        if matches!(self.session.phase(), Phase::Ended { .. }) {
            self.screen = Screen::Finished;
        }
    }

    fn finished_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('r') => self.start_game(),
            KeyCode::Enter | KeyCode::Esc => {
                self.session.return_to_menu();
                self.screen = Screen::Menu;
            }
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn start_game(&mut self) {
        match self.session.start(self.settings.clone()) {
            Ok(()) => {
                self.status = None;
                self.cursor = 0;
                self.screen = Screen::Game;
            }
            Err(err) => {
                self.status = Some(err.to_string());
                self.screen = Screen::Menu;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualTimeSource;
    use crate::number_format::to_words;
    use crate::round::RoundGenerator;
    use crate::session::ROUND_RESULT_DELAY;
    use std::time::Duration;

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn test_app(goal_points: u32) -> (App, ManualTimeSource) {
        let time = ManualTimeSource::new();
        let config = SessionConfig {
            goal_points,
            duration_minutes: 1,
            ..SessionConfig::default()
        };
        let session = GameSession::with_parts(config, RoundGenerator::with_seed(3), time.clone());
        (App::new(session), time)
    }

    #[test]
    fn test_menu_start_and_quit() {
        let (mut app, _time) = test_app(50);
        assert_eq!(app.screen, Screen::Menu);

        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.screen, Screen::Game);
        assert_eq!(app.session.phase(), Phase::RoundPending);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Menu);
        assert_eq!(app.session.phase(), Phase::Idle);

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_anywhere() {
        let (mut app, _time) = test_app(50);
        press(&mut app, KeyCode::Enter);
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_cursor_wraps() {
        let (mut app, _time) = test_app(50);
        press(&mut app, KeyCode::Enter);
        let count = app.game_labels().len();
        assert_eq!(count, 22);

        press(&mut app, KeyCode::Left);
        assert_eq!(app.cursor, count - 1);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.cursor, 0);
        assert_eq!(app.cursor_label().as_deref(), Some("Even"));
    }

    #[test]
    fn test_select_submit_and_advance() {
        let (mut app, time) = test_app(50);
        press(&mut app, KeyCode::Enter);
        let n = app.session.current_number().unwrap();

        let words = to_words(n);
        let index = app.game_labels().iter().position(|l| *l == words).unwrap();
        app.cursor = index;
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.session.phase(), Phase::RoundResolved);
        assert_eq!(app.session.score(), 1);

        time.advance(ROUND_RESULT_DELAY);
        app.on_tick();
        assert_eq!(app.session.phase(), Phase::RoundPending);
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn test_timeout_moves_to_finished() {
        let (mut app, time) = test_app(50);
        press(&mut app, KeyCode::Enter);
        time.advance(Duration::from_secs(60));
        app.on_tick();
        assert_eq!(app.screen, Screen::Finished);

        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.screen, Screen::Game);
        assert_eq!(app.session.phase(), Phase::RoundPending);
    }

    #[test]
    fn test_late_answer_moves_to_finished() {
        let (mut app, time) = test_app(1);
        press(&mut app, KeyCode::Enter);
        let words = to_words(app.session.current_number().unwrap());
        app.cursor = app.game_labels().iter().position(|l| *l == words).unwrap();

        time.advance(Duration::from_secs(61));
        press(&mut app, KeyCode::Char(' '));

        assert_eq!(app.screen, Screen::Finished);
        assert_eq!(app.session.phase(), Phase::Ended { won: false });
        assert_eq!(app.session.score(), 0);
    }

    #[test]
    fn test_settings_edits() {
        let (mut app, _time) = test_app(1);
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.screen, Screen::Settings);

        press(&mut app, KeyCode::Left);
        assert_eq!(app.settings.goal_points, 1);
        assert!(app.status.is_some());

        press(&mut app, KeyCode::Right);
        assert_eq!(app.settings.goal_points, 2);
        assert!(app.status.is_none());

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char(' '));
        assert!(!app.settings.hover_enabled);

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char(' '));
        assert!(!app
            .settings
            .enabled_groups
            .contains(&CategoryGroup::BasicProperties));

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Menu);
        assert_eq!(app.session.config().goal_points, 2);
        assert!(!app.session.config().hover_enabled);
    }

    #[test]
    fn test_settings_refuse_last_group() {
        let (mut app, _time) = test_app(5);
        app.settings
            .set_enabled_groups([CategoryGroup::Rounding])
            .unwrap();
        press(&mut app, KeyCode::Char('c'));
        app.settings_cursor = SettingsRow::all()
            .iter()
            .position(|r| *r == SettingsRow::Group(CategoryGroup::Rounding))
            .unwrap();
        press(&mut app, KeyCode::Enter);
        assert!(app.status.is_some());
        assert_eq!(app.settings.enabled_groups.len(), 1);
    }
}
