//! State of an HTTP-backed value and the events that drive it.

use r2ctl_core::{HistorySource, RollupRule};

/// State of a value fetched from the rules API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState<T> {
    /// Nothing requested yet
    Idle,
    /// Request in flight; keeps the previous value while refreshing
    Pending(Option<T>),
    Loaded(T),
    Failed(String),
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        FetchState::Idle
    }
}

impl<T> FetchState<T> {
    /// Mark a request as started, keeping any value already loaded.
    pub fn start(&mut self) {
        let previous = match std::mem::replace(self, FetchState::Idle) {
            FetchState::Loaded(value) | FetchState::Pending(Some(value)) => Some(value),
            _ => None,
        };
        *self = FetchState::Pending(previous);
    }

    /// Apply the result of a request.
    pub fn finish(&mut self, result: Result<T, String>) {
        *self = match result {
            Ok(value) => FetchState::Loaded(value),
            Err(e) => FetchState::Failed(e),
        };
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, FetchState::Pending(_))
    }

    /// The current value, if any (including a stale one while pending).
    pub fn value(&self) -> Option<&T> {
        match self {
            FetchState::Loaded(value) | FetchState::Pending(Some(value)) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Results reported back to the UI by whoever performs the requests.
#[derive(Debug, Clone)]
pub enum FetchEvent {
    RulesLoaded(Result<Vec<RollupRule>, String>),
    HistoryLoaded {
        source: HistorySource,
        result: Result<Vec<RollupRule>, String>,
    },
    RuleSaved(Result<RollupRule, String>),
    RuleDeleted(Result<RollupRule, String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_keeps_previous_value() {
        let mut state = FetchState::Loaded(vec![1, 2]);
        state.start();
        assert!(state.is_pending());
        assert_eq!(state.value(), Some(&vec![1, 2]));

        let mut idle: FetchState<Vec<i32>> = FetchState::Idle;
        idle.start();
        assert_eq!(idle, FetchState::Pending(None));
        assert_eq!(idle.value(), None);
    }

    #[test]
    fn test_failed_is_distinct_from_empty() {
        let mut state: FetchState<Vec<i32>> = FetchState::Pending(None);
        state.finish(Err("connection refused".to_string()));
        assert_eq!(state.error(), Some("connection refused"));
        assert_eq!(state.value(), None);

        state.start();
        state.finish(Ok(vec![]));
        assert_eq!(state.error(), None);
        assert_eq!(state.value(), Some(&vec![]));
    }
}
