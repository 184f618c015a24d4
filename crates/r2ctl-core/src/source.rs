//! Rule history endpoints.

use std::fmt;

/// API path relative to the base URL.
///
/// Segments are kept unescaped; the HTTP client encodes each one, so a `/`
/// inside an ID stays part of that segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApiPath(Vec<String>);

impl ApiPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

/// Which rule a history view is bound to.
///
/// Both variants render the same way; they only differ in the endpoint path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HistorySource {
    RollupRule { namespace: String, id: String },
    MappingRule { namespace: String, id: String },
}

impl HistorySource {
    pub fn rollup_rule(namespace: impl Into<String>, id: impl Into<String>) -> Self {
        Self::RollupRule {
            namespace: namespace.into(),
            id: id.into(),
        }
    }

    pub fn mapping_rule(namespace: impl Into<String>, id: impl Into<String>) -> Self {
        Self::MappingRule {
            namespace: namespace.into(),
            id: id.into(),
        }
    }

    /// Path of the history endpoint.
    pub fn path(&self) -> ApiPath {
        match self {
            Self::RollupRule { namespace, id } => ApiPath::new([
                "namespaces",
                namespace.as_str(),
                "rollup-rules",
                id.as_str(),
                "history",
            ]),
            Self::MappingRule { namespace, id } => ApiPath::new([
                "namespaces",
                namespace.as_str(),
                "mapping-rules",
                id.as_str(),
                "history",
            ]),
        }
    }

    /// Modal title for this history.
    pub fn title(&self) -> &'static str {
        match self {
            Self::RollupRule { .. } => "Rollup Rule History",
            Self::MappingRule { .. } => "Mapping Rule History",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::RollupRule { id, .. } | Self::MappingRule { id, .. } => id,
        }
    }
}

impl fmt::Display for HistorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Path of a namespace's rule set.
pub fn namespace_path(namespace: &str) -> ApiPath {
    ApiPath::new(["namespaces", namespace])
}

/// Path of the rollup rule collection of a namespace.
pub fn rollup_rules_path(namespace: &str) -> ApiPath {
    ApiPath::new(["namespaces", namespace, "rollup-rules"])
}

/// Path of a single rollup rule.
pub fn rollup_rule_path(namespace: &str, id: &str) -> ApiPath {
    ApiPath::new(["namespaces", namespace, "rollup-rules", id])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_paths() {
        let rollup = HistorySource::rollup_rule("prod", "r-1");
        assert_eq!(
            rollup.path().to_string(),
            "/namespaces/prod/rollup-rules/r-1/history"
        );
        assert_eq!(rollup.title(), "Rollup Rule History");
        assert_eq!(rollup.id(), "r-1");

        let mapping = HistorySource::mapping_rule("prod", "m-9");
        assert_eq!(
            mapping.to_string(),
            "/namespaces/prod/mapping-rules/m-9/history"
        );
        assert_eq!(mapping.title(), "Mapping Rule History");
    }

    #[test]
    fn test_rule_paths() {
        assert_eq!(namespace_path("prod").to_string(), "/namespaces/prod");
        assert_eq!(
            rollup_rules_path("prod").to_string(),
            "/namespaces/prod/rollup-rules"
        );
        assert_eq!(
            rollup_rule_path("prod", "r-1").to_string(),
            "/namespaces/prod/rollup-rules/r-1"
        );
    }

    #[test]
    fn test_segments_keep_reserved_characters() {
        let path = rollup_rule_path("team/a", "r?1#x");
        let segments: Vec<&str> = path.segments().collect();
        assert_eq!(segments, vec!["namespaces", "team/a", "rollup-rules", "r?1#x"]);
    }
}
