//! Text syntax for editing a rule's targets in a single line.
//!
//! Targets are separated by `;`. Each target is
//! `name | policy policy ... | tag, tag, ...`, where the policy and tag
//! sections are optional:
//!
//! ```text
//! api.requests | 10s:2d 1m:40d | host, region; api.errors
//! ```
//!
//! A literal `;`, `|`, `,` or `\` inside a value is written as `\;`, `\|`,
//! `\,` or `\\`. Spaces inside a policy are escaped the same way.

use crate::rules::Target;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TargetParseError {
    #[error("Target {0} has no name")]
    MissingName(usize),
    #[error("Target {index} has too many sections: {text}")]
    TooManySections { index: usize, text: String },
}

/// Format targets in the editor syntax.
///
/// Separators inside values are escaped with a backslash, so the result parses back
/// to the same targets.
pub fn format_targets(targets: &[Target]) -> String {
    targets
        .iter()
        .map(|t| {
            let policies: Vec<String> = t.policies.iter().map(|p| escape(p, true)).collect();
            let tags: Vec<String> = t.tags.iter().map(|tag| escape(tag, false)).collect();
            format!(
                "{} | {} | {}",
                escape(&t.name, false),
                policies.join(" "),
                tags.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parse targets from the editor syntax.
///
/// Blank input yields no targets. Empty segments between separators are skipped.
pub fn parse_targets(s: &str) -> Result<Vec<Target>, TargetParseError> {
    split_unescaped(s, |c| c == ';')
        .into_iter()
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .enumerate()
        .map(|(i, segment)| parse_target(i + 1, segment))
        .collect()
}

fn parse_target(index: usize, segment: &str) -> Result<Target, TargetParseError> {
    let sections: Vec<&str> = split_unescaped(segment, |c| c == '|')
        .into_iter()
        .map(str::trim)
        .collect();
    if sections.len() > 3 {
        return Err(TargetParseError::TooManySections {
            index,
            text: segment.to_string(),
        });
    }

    let name = unescape(sections[0]);
    if name.is_empty() {
        return Err(TargetParseError::MissingName(index));
    }

    let policies = sections
        .get(1)
        .map(|p| {
            split_unescaped(p, char::is_whitespace)
                .into_iter()
                .filter(|policy| !policy.is_empty())
                .map(unescape)
                .collect()
        })
        .unwrap_or_default();

    let tags = sections
        .get(2)
        .map(|t| {
            split_unescaped(t, |c| c == ',')
                .into_iter()
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(unescape)
                .collect()
        })
        .unwrap_or_default();

    Ok(Target::new(name, policies, tags))
}

fn is_separator(c: char) -> bool {
    matches!(c, '\\' | ';' | '|' | ',')
}

fn escape(value: &str, escape_whitespace: bool) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if is_separator(c) || (escape_whitespace && c.is_whitespace()) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Split on unescaped separators. Escapes are kept in the pieces.
fn split_unescaped(s: &str, is_sep: impl Fn(char) -> bool) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if is_sep(c) {
            pieces.push(&s[start..i]);
            start = i + c.len_utf8();
        }
    }
    pieces.push(&s[start..]);
    pieces
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            out.push(chars.next().unwrap_or('\\'));
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_targets() {
        let targets =
            parse_targets("api.requests | 10s:2d 1m:40d | host, region; api.errors").unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].name, "api.requests");
        assert_eq!(targets[0].policies, vec!["10s:2d", "1m:40d"]);
        assert_eq!(targets[0].tags, vec!["host", "region"]);
        assert_eq!(targets[1].name, "api.errors");
        assert!(targets[1].policies.is_empty());
        assert!(targets[1].tags.is_empty());
    }

    #[test]
    fn test_parse_blank() {
        assert_eq!(parse_targets("").unwrap(), vec![]);
        assert_eq!(parse_targets(" ; ;").unwrap(), vec![]);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_targets("a | 1m:1d; | 10s:2d"),
            Err(TargetParseError::MissingName(2))
        );
        assert!(matches!(
            parse_targets("a | b | c | d"),
            Err(TargetParseError::TooManySections { index: 1, .. })
        ));
    }

    #[test]
    fn test_format_then_parse() {
        let targets = vec![
            Target::new(
                "cpu",
                vec!["10s:2d".to_string()],
                vec!["host".to_string(), "dc".to_string()],
            ),
            Target::new("mem", vec![], vec![]),
        ];
        let text = format_targets(&targets);
        assert_eq!(text, "cpu | 10s:2d | host, dc; mem |  | ");
        assert_eq!(parse_targets(&text).unwrap(), targets);
    }

    #[test]
    fn test_separators_in_values_are_escaped() {
        let targets = vec![
            Target::new(
                "t;x",
                vec!["10s:2d".to_string(), "odd policy".to_string()],
                vec!["a,b".to_string(), "c|d".to_string(), r"back\slash".to_string()],
            ),
            Target::new("y", vec![], vec![]),
        ];
        let text = format_targets(&targets);
        assert!(text.starts_with(r"t\;x | 10s:2d odd\ policy | a\,b, c\|d, back\\slash; y"));
        assert_eq!(parse_targets(&text).unwrap(), targets);
    }

    #[test]
    fn test_trailing_backslash_is_literal() {
        let targets = parse_targets(r"name\").unwrap();
        assert_eq!(targets[0].name, r"name\");
    }
}
