use serde::{Deserialize, Serialize};
use shelflife_core::LookaheadWindow;
use shelflife_notify::NotificationTemplate;

/// How often the same product may be re-notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatPolicy {
    /// Notify on every run while the product stays in the window.
    #[default]
    EveryRun,
    /// After a delivered notification, stay quiet for this many days.
    MinDaysBetween(u32),
}

/// Expiration evaluator configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    pub lookahead: LookaheadWindow,
    pub repeat: RepeatPolicy,
    pub template: NotificationTemplate,
}

impl EvaluatorConfig {
    pub fn with_lookahead(mut self, lookahead: LookaheadWindow) -> Self {
        self.lookahead = lookahead;
        self
    }

    pub fn with_repeat(mut self, repeat: RepeatPolicy) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn with_template(mut self, template: NotificationTemplate) -> Self {
        self.template = template;
        self
    }
}
