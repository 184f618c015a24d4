//! Rollup rule data model for r2ctl.
//!
//! This crate holds the rule types served by the R2 rules API, endpoint
//! paths, and the formatting helpers shared by the API client and the TUI.

pub mod help;
pub mod rules;
pub mod source;
pub mod targets;
pub mod time;

pub use help::{HELP_KEYS, help_text};
pub use rules::{RollupRule, RuleHistory, RuleSet, Target};
pub use source::{ApiPath, HistorySource, namespace_path, rollup_rule_path, rollup_rules_path};
pub use targets::{TargetParseError, format_targets, parse_targets};
pub use time::{
    TIMESTAMP_FORMAT, format_timestamp_millis, format_timestamp_millis_in,
    parse_timestamp_millis, parse_timestamp_millis_in,
};
