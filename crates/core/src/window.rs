use serde::{Deserialize, Serialize};

/// Inclusive range of days-remaining values considered "nearing expiration".
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookaheadWindow {
    pub min_days: i64,
    pub max_days: i64,
}

impl LookaheadWindow {
    /// Default upper bound, in days.
    pub const DEFAULT_DAYS: i64 = 3;

    /// Window `[0, days]`.
    pub fn days(days: i64) -> Self {
        Self {
            min_days: 0,
            max_days: days,
        }
    }

    pub fn contains(&self, days_remaining: i64) -> bool {
        (self.min_days..=self.max_days).contains(&days_remaining)
    }
}

impl Default for LookaheadWindow {
    fn default() -> Self {
        Self::days(Self::DEFAULT_DAYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_is_zero_to_three_inclusive() {
        let window = LookaheadWindow::default();

        assert!(!window.contains(-1));
        assert!(window.contains(0));
        assert!(window.contains(3));
        assert!(!window.contains(4));
    }

    #[test]
    fn custom_window_moves_upper_bound() {
        let window = LookaheadWindow::days(7);

        assert!(window.contains(7));
        assert!(!window.contains(8));
    }
}
