//! Rollup rule edit form.

use crate::ui::{Theme, centered_rect};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use r2ctl_core::{
    RollupRule, TIMESTAMP_FORMAT, TargetParseError, format_targets, format_timestamp_millis,
    parse_targets, parse_timestamp_millis,
};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EditorError {
    #[error("Rule name is required")]
    MissingName,
    #[error("Metric filter is required")]
    MissingFilter,
    #[error("{0}")]
    Targets(#[from] TargetParseError),
    #[error("Invalid effective time '{0}', expected YYYY-MM-DD HH:MM:SS")]
    InvalidTime(String),
}

/// Form fields, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorField {
    #[default]
    Name,
    Filter,
    Targets,
    EffectiveTime,
}

impl EditorField {
    pub const ALL: [EditorField; 4] = [
        EditorField::Name,
        EditorField::Filter,
        EditorField::Targets,
        EditorField::EffectiveTime,
    ];

    pub fn next(self) -> Self {
        match self {
            Self::Name => Self::Filter,
            Self::Filter => Self::Targets,
            Self::Targets => Self::EffectiveTime,
            Self::EffectiveTime => Self::Name,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Self::Name => Self::EffectiveTime,
            Self::Filter => Self::Name,
            Self::Targets => Self::Filter,
            Self::EffectiveTime => Self::Targets,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "Rule Name",
            Self::Filter => "Metric Filter",
            Self::Targets => "Targets",
            Self::EffectiveTime => "Effective Time (Local)",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Name => 0,
            Self::Filter => 1,
            Self::Targets => 2,
            Self::EffectiveTime => 3,
        }
    }
}

/// What the app should do after the editor handled a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorOutcome {
    Continue,
    Cancel,
    Submit(RollupRule),
}

/// Form state for creating or editing a rollup rule.
#[derive(Debug, Clone)]
pub struct RuleEditor {
    pub title: &'static str,
    /// Rule being edited; fields not on the form are carried over from it
    base: RollupRule,
    values: [String; 4],
    /// Effective time as first shown; submitting it unchanged keeps the exact cutover
    initial_time: String,
    pub focus: EditorField,
    pub error: Option<String>,
}

impl RuleEditor {
    /// Editor pre-filled from an existing rule.
    pub fn edit(rule: RollupRule) -> Self {
        let effective = if rule.cutover_millis > 0 {
            format_timestamp_millis(rule.cutover_millis)
        } else {
            String::new()
        };
        Self {
            title: "Edit Rollup Rule",
            values: [
                rule.name.clone(),
                rule.filter.clone(),
                format_targets(&rule.targets),
                effective.clone(),
            ],
            initial_time: effective,
            base: rule,
            focus: EditorField::default(),
            error: None,
        }
    }

    /// Empty editor for a rule that does not exist yet.
    pub fn create() -> Self {
        Self {
            title: "Add Rollup Rule",
            ..Self::edit(RollupRule::default())
        }
    }

    pub fn base(&self) -> &RollupRule {
        &self.base
    }

    pub fn value(&self, field: EditorField) -> &str {
        &self.values[field.index()]
    }

    pub fn set_value(&mut self, field: EditorField, value: impl Into<String>) {
        self.values[field.index()] = value.into();
    }

    /// Build the submitted rule from the form.
    pub fn submit(&self) -> Result<RollupRule, EditorError> {
        let name = self.value(EditorField::Name).trim();
        if name.is_empty() {
            return Err(EditorError::MissingName);
        }
        let filter = self.value(EditorField::Filter).trim();
        if filter.is_empty() {
            return Err(EditorError::MissingFilter);
        }
        let targets = parse_targets(self.value(EditorField::Targets))?;

        let time = self.value(EditorField::EffectiveTime).trim();
        let cutover_millis = if time.is_empty() || time == self.initial_time {
            self.base.cutover_millis
        } else {
            parse_timestamp_millis(time).ok_or_else(|| EditorError::InvalidTime(time.to_string()))?
        };

        Ok(RollupRule {
            name: name.to_string(),
            filter: filter.to_string(),
            targets,
            cutover_millis,
            ..self.base.clone()
        })
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> EditorOutcome {
        match key.code {
            KeyCode::Esc => return EditorOutcome::Cancel,
            KeyCode::Enter => match self.submit() {
                Ok(rule) => return EditorOutcome::Submit(rule),
                Err(e) => self.error = Some(e.to_string()),
            },
            KeyCode::Tab | KeyCode::Down => self.focus = self.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.focus = self.focus.previous(),
            KeyCode::Backspace => {
                self.values[self.focus.index()].pop();
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.values[self.focus.index()].clear();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.values[self.focus.index()].push(c);
            }
            _ => {}
        }
        EditorOutcome::Continue
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let area = centered_rect(70, 60, area);
        frame.render_widget(Clear, area);

        let mut lines = Vec::new();
        for field in EditorField::ALL {
            let focused = field == self.focus;
            let label_style = if focused {
                Style::default()
                    .fg(theme.warning)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.foreground)
            };
            lines.push(Line::from(Span::styled(field.label(), label_style)));

            let mut value = vec![Span::raw("  "), Span::raw(self.value(field).to_string())];
            if focused {
                value.push(Span::styled("▏", Style::default().fg(theme.warning)));
            }
            lines.push(Line::from(value));

            let hint = match field {
                EditorField::Targets => Some("name | policy policy | tag, tag; next target…"),
                EditorField::EffectiveTime => Some(TIMESTAMP_FORMAT),
                _ => None,
            };
            if let Some(hint) = hint {
                lines.push(Line::from(Span::styled(
                    format!("  {}", hint),
                    theme.muted_style(),
                )));
            }
            lines.push(Line::from(""));
        }

        if let Some(ref err) = self.error {
            lines.push(Line::from(Span::styled(
                err.clone(),
                Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(""));
        }

        lines.push(Line::from(Span::styled(
            "Enter:save  Tab:next field  Ctrl-U:clear  Esc:cancel",
            theme.muted_style(),
        )));

        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .style(theme.popup_style())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", self.title)),
            );
        frame.render_widget(paragraph, area);
    }
}
