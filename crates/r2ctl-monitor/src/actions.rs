//! Row actions and the callbacks they trigger.

use r2ctl_core::{HistorySource, RollupRule};

/// Per-row gestures exposed by the rules table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    Edit,
    Delete,
    History,
}

impl RuleAction {
    pub const ALL: [RuleAction; 3] = [RuleAction::Edit, RuleAction::Delete, RuleAction::History];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Edit => "Edit",
            Self::Delete => "Delete",
            Self::History => "History",
        }
    }

    /// Key that triggers the action on the selected row.
    pub fn key(&self) -> char {
        match self {
            Self::Edit => 'e',
            Self::Delete => 'd',
            Self::History => 'H',
        }
    }
}

/// Caller-supplied side effects.
///
/// The UI never persists anything itself: it hands rules to these callbacks
/// and waits for a `FetchEvent` with the outcome.
pub trait RuleHandlers {
    /// Persist a created or edited rule.
    fn save_rollup_rule(&mut self, rule: RollupRule);

    fn delete_rollup_rule(&mut self, rule: &RollupRule);

    /// Start fetching the history bound to `source`.
    fn load_history(&mut self, source: &HistorySource);

    /// Start (re-)fetching the namespace's rule list.
    fn load_rules(&mut self);
}

/// Handlers that record every call, for tests and dry runs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingHandlers {
    pub calls: Vec<HandlerCall>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerCall {
    Save(RollupRule),
    Delete(RollupRule),
    LoadHistory(HistorySource),
    LoadRules,
}

impl RuleHandlers for RecordingHandlers {
    fn save_rollup_rule(&mut self, rule: RollupRule) {
        self.calls.push(HandlerCall::Save(rule));
    }

    fn delete_rollup_rule(&mut self, rule: &RollupRule) {
        self.calls.push(HandlerCall::Delete(rule.clone()));
    }

    fn load_history(&mut self, source: &HistorySource) {
        self.calls.push(HandlerCall::LoadHistory(source.clone()));
    }

    fn load_rules(&mut self) {
        self.calls.push(HandlerCall::LoadRules);
    }
}
