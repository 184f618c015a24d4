//! Terminal UI for browsing and editing rollup rules.

pub mod actions;
pub mod app;
pub mod components;
pub mod fetch;
pub mod ui;

pub use actions::{HandlerCall, RecordingHandlers, RuleAction, RuleHandlers};
pub use app::{App, Modal};
pub use fetch::{FetchEvent, FetchState};
pub use ui::Theme;
