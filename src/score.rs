/// Running score for one session, measured against a fixed goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreTracker {
    score: i64,
    goal: u32,
}

impl ScoreTracker {
    pub fn new(goal: u32) -> Self {
        Self { score: 0, goal }
    }

    /// Each correct selection is worth a point, each wrong one costs a point.
    pub fn apply_result(&mut self, correct: u32, incorrect: u32) {
        self.score += correct as i64 - incorrect as i64;
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn goal(&self) -> u32 {
        self.goal
    }

    pub fn has_won(&self) -> bool {
        self.score >= self.goal as i64
    }

    /// `score / goal` capped at 1. Negative scores are kept as they are.
    pub fn progress_fraction(&self) -> f64 {
        if self.goal == 0 {
            return 1.0;
        }
        (self.score as f64 / self.goal as f64).min(1.0)
    }

    /// [`Self::progress_fraction`] clamped to `0.0..=1.0` for gauges.
    pub fn clamped_progress(&self) -> f64 {
        self.progress_fraction().max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tracker_starts_at_zero() {
        let tracker = ScoreTracker::new(50);
        assert_eq!(tracker.score(), 0);
        assert_eq!(tracker.goal(), 50);
        assert!(!tracker.has_won());
        assert_eq!(tracker.progress_fraction(), 0.0);
    }

    #[test]
    fn test_results_accumulate() {
        let mut split = ScoreTracker::new(50);
        split.apply_result(3, 1);
        split.apply_result(0, 2);

        let mut combined = ScoreTracker::new(50);
        combined.apply_result(3, 3);

        assert_eq!(split.score(), 0);
        assert_eq!(split, combined);
    }

    #[test]
    fn test_score_can_go_negative() {
        let mut tracker = ScoreTracker::new(10);
        tracker.apply_result(0, 4);
        assert_eq!(tracker.score(), -4);
        assert_eq!(tracker.progress_fraction(), -0.4);
        assert_eq!(tracker.clamped_progress(), 0.0);
    }

    #[test]
    fn test_win_at_goal_and_beyond() {
        let mut tracker = ScoreTracker::new(5);
        tracker.apply_result(4, 0);
        assert!(!tracker.has_won());
        tracker.apply_result(1, 0);
        assert!(tracker.has_won());
        assert_eq!(tracker.progress_fraction(), 1.0);

        tracker.apply_result(6, 0);
        assert_eq!(tracker.score(), 11);
        assert_eq!(tracker.progress_fraction(), 1.0);
    }
}
