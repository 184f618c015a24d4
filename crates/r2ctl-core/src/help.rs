//! Column help texts.

/// Help text keys used by the rules table columns.
pub const HELP_KEYS: [&str; 3] = ["metric-filter", "target", "effective-time"];

/// Look up the help text for a column.
pub fn help_text(key: &str) -> Option<&'static str> {
    match key {
        "metric-filter" => Some(
            "Tag filter selecting the metrics this rule applies to, \
             e.g. `service:api env:prod*`.",
        ),
        "target" => Some(
            "Rolled-up metrics produced by the rule. Each target has storage \
             policies (resolution:retention) and the tags to group by.",
        ),
        "effective-time" => Some(
            "Time at which this version of the rule takes effect (cutover).",
        ),
        _ => None,
    }
}
