//! Rollup rule types as served by the R2 rules API.

use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize a string field that may be null, defaulting to empty string.
fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|opt| opt.unwrap_or_default())
}

/// Deserialize an optional string, treating empty strings as absent.
fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
        .map(|opt| opt.filter(|s| !s.trim().is_empty()))
}

/// An aggregation destination within a rollup rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Target {
    /// Name of the rolled-up metric
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub name: String,

    /// Storage policies, e.g. "10s:2d"
    #[serde(default)]
    pub policies: Vec<String>,

    /// Group-by tag keys
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Target {
    pub fn new(name: impl Into<String>, policies: Vec<String>, tags: Vec<String>) -> Self {
        Self {
            name: name.into(),
            policies,
            tags,
        }
    }
}

/// A rollup rule: metrics matching `filter` are aggregated into `targets`.
///
/// Rules are immutable once fetched; an edit produces a whole new value that
/// is handed to the save callback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollupRule {
    /// Rule ID (empty for a rule that has not been created yet)
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub id: String,

    /// Rule name
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub name: String,

    /// Metric filter query, e.g. "service:api env:prod"
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub filter: String,

    /// Aggregation targets, in order
    #[serde(default)]
    pub targets: Vec<Target>,

    /// Who last changed the rule
    #[serde(
        default,
        deserialize_with = "deserialize_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated_by: Option<String>,

    /// When the rule was last changed (epoch milliseconds)
    #[serde(default)]
    pub last_updated_at_millis: i64,

    /// When this version of the rule takes effect (epoch milliseconds)
    #[serde(default)]
    pub cutover_millis: i64,
}

impl RollupRule {
    /// Whether this rule exists server-side.
    pub fn is_new(&self) -> bool {
        self.id.is_empty()
    }
}

/// Rule set of a namespace, as returned by `GET /namespaces/{ns}`.
///
/// Mapping rules are kept as raw JSON; only rollup rules are displayed.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub id: String,

    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub namespace: String,

    #[serde(default)]
    pub version: i64,

    #[serde(default)]
    pub rollup_rules: Vec<RollupRule>,

    #[serde(default)]
    pub mapping_rules: Vec<serde_json::Value>,
}

/// History of a rule, newest first as ordered by the server.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleHistory {
    /// History entries. Mapping rule history is served under `mappingRules`.
    #[serde(default, alias = "mappingRules")]
    pub rollup_rules: Vec<RollupRule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rollup_rule() {
        let json = r#"{
            "id": "rule-1",
            "name": "api requests",
            "filter": "service:api env:prod",
            "targets": [
                {"name": "api.requests", "policies": ["10s:2d", "1m:40d"], "tags": ["host", "region"]}
            ],
            "lastUpdatedBy": "alice",
            "lastUpdatedAtMillis": 1700000000000,
            "cutoverMillis": 1700000060000
        }"#;

        let rule: RollupRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.id, "rule-1");
        assert_eq!(rule.targets.len(), 1);
        assert_eq!(rule.targets[0].policies, vec!["10s:2d", "1m:40d"]);
        assert_eq!(rule.targets[0].tags, vec!["host", "region"]);
        assert_eq!(rule.last_updated_by.as_deref(), Some("alice"));
        assert_eq!(rule.cutover_millis, 1_700_000_060_000);
        assert!(!rule.is_new());
    }

    #[test]
    fn test_parse_rollup_rule_with_nulls() {
        let json = r#"{
            "id": "rule-2",
            "name": null,
            "filter": "a:b",
            "lastUpdatedBy": null
        }"#;

        let rule: RollupRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.name, "");
        assert!(rule.targets.is_empty());
        assert_eq!(rule.last_updated_by, None);
        assert_eq!(rule.last_updated_at_millis, 0);
    }

    #[test]
    fn test_blank_updated_by_is_none() {
        let rule: RollupRule = serde_json::from_str(r#"{"id": "x", "lastUpdatedBy": "  "}"#).unwrap();
        assert_eq!(rule.last_updated_by, None);
    }

    #[test]
    fn test_serialize_camel_case() {
        let rule = RollupRule {
            id: "r".to_string(),
            cutover_millis: 5,
            ..Default::default()
        };
        let value = serde_json::to_value(&rule).unwrap();
        assert_eq!(value["cutoverMillis"], 5);
        assert_eq!(value["lastUpdatedAtMillis"], 0);
        assert!(value.get("lastUpdatedBy").is_none());
    }

    #[test]
    fn test_parse_rule_set() {
        let json = r#"{
            "id": "ns1",
            "namespace": "ns1",
            "version": 3,
            "mappingRules": [{"id": "m1"}],
            "rollupRules": [{"id": "r1"}, {"id": "r2"}],
            "tombstoned": false
        }"#;

        let set: RuleSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.version, 3);
        assert_eq!(set.rollup_rules.len(), 2);
        assert_eq!(set.mapping_rules.len(), 1);
    }

    #[test]
    fn test_parse_history_both_keys() {
        let rollup: RuleHistory =
            serde_json::from_str(r#"{"rollupRules": [{"id": "a"}, {"id": "a"}]}"#).unwrap();
        assert_eq!(rollup.rollup_rules.len(), 2);

        let mapping: RuleHistory =
            serde_json::from_str(r#"{"mappingRules": [{"id": "m", "filter": "x:y"}]}"#).unwrap();
        assert_eq!(mapping.rollup_rules.len(), 1);
        assert_eq!(mapping.rollup_rules[0].filter, "x:y");

        let empty: RuleHistory = serde_json::from_str("{}").unwrap();
        assert!(empty.rollup_rules.is_empty());
    }
}
