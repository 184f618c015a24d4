//! CLI argument parsing for r2ctl.

use camino::Utf8PathBuf;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "r2ctl")]
#[command(about = "Browse and edit rollup rules of an R2 rules namespace")]
pub struct Args {
    /// Namespace whose rollup rules are shown
    #[arg(env = "R2CTL_NAMESPACE")]
    pub namespace: String,

    /// Base URL of the R2 rules API
    #[arg(long, env = "R2CTL_URL", default_value = "http://localhost:9000/r2/v1")]
    pub url: String,

    /// Re-fetch the rule list every N seconds (0 disables)
    #[arg(long, default_value = "0")]
    pub refresh_interval: u64,

    /// Color theme (dark or light)
    #[arg(long, default_value = "dark")]
    pub theme: String,

    /// Log file (the terminal is owned by the UI)
    #[arg(long, env = "R2CTL_LOG_FILE", default_value = "r2ctl.log")]
    pub log_file: Utf8PathBuf,

    /// Open the history of this rollup rule on startup
    #[arg(long, value_name = "ID", conflicts_with = "mapping_rule_history")]
    pub rollup_rule_history: Option<String>,

    /// Open the history of this mapping rule on startup
    #[arg(long, value_name = "ID")]
    pub mapping_rule_history: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["r2ctl", "prod"]).unwrap();
        assert_eq!(args.namespace, "prod");
        assert_eq!(args.refresh_interval, 0);
        assert_eq!(args.theme, "dark");
        assert!(args.rollup_rule_history.is_none());
    }

    #[test]
    fn test_history_flags_conflict() {
        let args = Args::try_parse_from([
            "r2ctl",
            "prod",
            "--url",
            "http://r2:9000/r2/v1",
            "--mapping-rule-history",
            "m1",
        ])
        .unwrap();
        assert_eq!(args.url, "http://r2:9000/r2/v1");
        assert_eq!(args.mapping_rule_history.as_deref(), Some("m1"));

        assert!(
            Args::try_parse_from([
                "r2ctl",
                "prod",
                "--rollup-rule-history",
                "r1",
                "--mapping-rule-history",
                "m1",
            ])
            .is_err()
        );
    }
}
