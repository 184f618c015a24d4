//! Rollup rules table.
//!
//! Row construction is kept separate from drawing: `table_rows` turns rules
//! into display strings, and `RulesTable::render` lays them out. The same
//! table backs both the namespace view and the history modal.

use crate::actions::RuleAction;
use crate::fetch::FetchState;
use crate::ui::Theme;
use chrono::{Local, TimeZone};
use r2ctl_core::{RollupRule, format_timestamp_millis_in};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
};

/// Placeholder shown for an empty rule list.
pub const EMPTY_TEXT: &str = "No rollup rules";

/// Fallback for rules without an author.
pub const UNKNOWN_AUTHOR: &str = "N/A";

const COLUMNS: [&str; 6] = [
    "Rule Name",
    "Metric Filter",
    "Target",
    "Last Updated By",
    "Last Updated At (Local)",
    "Effective Time (Local)",
];

const ACTION_COLUMN: &str = "Action";

/// How rows are keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowKey {
    /// By rule ID
    #[default]
    Id,
    /// By position; history entries share an ID
    Index,
}

impl RowKey {
    pub fn key(&self, rule: &RollupRule, index: usize) -> String {
        match self {
            Self::Id => rule.id.clone(),
            Self::Index => index.to_string(),
        }
    }
}

/// Display strings for one table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleRow {
    pub key: String,
    pub name: String,
    pub filter: String,
    /// One tag label per target, in order
    pub targets: Vec<String>,
    pub last_updated_by: String,
    pub last_updated_at: String,
    pub effective_time: String,
    pub actions: Option<String>,
}

/// Column titles, with the action column only when shown.
pub fn column_titles(show_actions: bool) -> Vec<&'static str> {
    let mut titles = COLUMNS.to_vec();
    if show_actions {
        titles.push(ACTION_COLUMN);
    }
    titles
}

/// Build display rows with timestamps in local time.
pub fn table_rows(rules: &[RollupRule], row_key: RowKey, show_actions: bool) -> Vec<RuleRow> {
    table_rows_in(rules, row_key, show_actions, &Local)
}

/// Build display rows with timestamps in the given time zone.
pub fn table_rows_in<Tz: TimeZone>(
    rules: &[RollupRule],
    row_key: RowKey,
    show_actions: bool,
    tz: &Tz,
) -> Vec<RuleRow>
where
    Tz::Offset: std::fmt::Display,
{
    let actions = show_actions.then(action_hint);
    rules
        .iter()
        .enumerate()
        .map(|(i, rule)| RuleRow {
            key: row_key.key(rule, i),
            name: rule.name.clone(),
            filter: rule.filter.clone(),
            targets: rule.targets.iter().map(|t| t.name.clone()).collect(),
            last_updated_by: rule
                .last_updated_by
                .clone()
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            last_updated_at: format_timestamp_millis_in(rule.last_updated_at_millis, tz),
            effective_time: format_timestamp_millis_in(rule.cutover_millis, tz),
            actions: actions.clone(),
        })
        .collect()
}

/// Text of the action cell, e.g. "e:Edit d:Delete H:History".
fn action_hint() -> String {
    RuleAction::ALL
        .iter()
        .map(|a| format!("{}:{}", a.key(), a.label()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Row selection and target focus within a rules table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableCursor {
    pub selected: usize,
    /// Target tag focused within the selected row
    pub target: usize,
    /// Whether the focused target's popover is open
    pub preview_open: bool,
}

impl TableCursor {
    pub fn select_next(&mut self, len: usize) {
        if len > 0 {
            self.selected = (self.selected + 1) % len;
            self.reset_target();
        }
    }

    pub fn select_previous(&mut self, len: usize) {
        if len > 0 {
            self.selected = self.selected.checked_sub(1).unwrap_or(len - 1);
            self.reset_target();
        }
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
        self.reset_target();
    }

    pub fn select_last(&mut self, len: usize) {
        if len > 0 {
            self.selected = len - 1;
            self.reset_target();
        }
    }

    pub fn next_target(&mut self, count: usize) {
        if count > 0 {
            self.target = (self.target + 1) % count;
        }
    }

    pub fn previous_target(&mut self, count: usize) {
        if count > 0 {
            self.target = self.target.checked_sub(1).unwrap_or(count - 1);
        }
    }

    /// Toggle the popover; only opens when the row has a target.
    pub fn toggle_preview(&mut self, count: usize) {
        self.preview_open = !self.preview_open && count > 0;
    }

    /// Keep the cursor inside a list of `len` rows.
    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            *self = Self::default();
        } else if self.selected >= len {
            self.selected = len - 1;
            self.reset_target();
        }
    }

    fn reset_target(&mut self) {
        self.target = 0;
        self.preview_open = false;
    }
}

/// Inputs of the rules table.
pub struct RulesTableProps<'a> {
    pub title: &'a str,
    pub rules: &'a FetchState<Vec<RollupRule>>,
    pub row_key: RowKey,
    pub show_actions: bool,
    pub cursor: TableCursor,
    pub is_active: bool,
}

pub struct RulesTable;

impl RulesTable {
    pub fn render(frame: &mut Frame, area: Rect, props: &RulesTableProps, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title_line(props, theme))
            .border_style(if props.is_active {
                Style::default().fg(theme.warning)
            } else {
                Style::default()
            });

        if let Some(err) = props.rules.error() {
            let paragraph = Paragraph::new(Line::from(Span::styled(
                format!("Failed to load rollup rules: {}", err),
                Style::default().fg(theme.error),
            )))
            .wrap(Wrap { trim: true })
            .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let rules = match props.rules.value() {
            Some(rules) if !rules.is_empty() => rules,
            value => {
                let text = if value.is_none() && props.rules.is_pending() {
                    "Loading…"
                } else {
                    EMPTY_TEXT
                };
                let paragraph = Paragraph::new(Line::from(Span::styled(text, theme.muted_style())))
                    .alignment(Alignment::Center)
                    .block(block);
                frame.render_widget(paragraph, area);
                return;
            }
        };

        let rows: Vec<Row> = table_rows(rules, props.row_key, props.show_actions)
            .into_iter()
            .enumerate()
            .map(|(i, row)| build_row(row, props.cursor, i == props.cursor.selected, theme))
            .collect();

        let header = Row::new(
            column_titles(props.show_actions)
                .into_iter()
                .map(|title| Cell::from(Span::styled(title, theme.header_style()))),
        )
        .style(Style::default().add_modifier(Modifier::UNDERLINED));

        let mut widths = vec![
            Constraint::Min(12),    // Name
            Constraint::Min(20),    // Filter
            Constraint::Min(16),    // Targets
            Constraint::Length(15), // Updated by
            Constraint::Length(23), // Updated at
            Constraint::Length(22), // Effective
        ];
        if props.show_actions {
            widths.push(Constraint::Length(26));
        }

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut table_state = TableState::default();
        table_state.select(Some(props.cursor.selected));

        frame.render_stateful_widget(table, area, &mut table_state);
    }
}

fn title_line<'a>(props: &RulesTableProps, theme: &Theme) -> Line<'a> {
    let mut spans = vec![Span::styled(
        format!(" {} ", props.title),
        Style::default().fg(theme.foreground),
    )];
    if let Some(rules) = props.rules.value() {
        spans.push(Span::styled(
            format!("({}) ", rules.len()),
            theme.muted_style(),
        ));
    }
    if props.rules.is_pending() {
        spans.push(Span::styled("Loading… ", Style::default().fg(theme.warning)));
    }
    Line::from(spans)
}

fn build_row(row: RuleRow, cursor: TableCursor, is_selected: bool, theme: &Theme) -> Row<'static> {
    let mut tags = Vec::with_capacity(row.targets.len() * 2);
    for (i, name) in row.targets.into_iter().enumerate() {
        if i > 0 {
            tags.push(Span::raw(" "));
        }
        let style = if is_selected && i == cursor.target {
            Style::default()
                .fg(theme.warning)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(theme.tag)
        };
        tags.push(Span::styled(format!("[{}]", name), style));
    }

    let author_style = if row.last_updated_by == UNKNOWN_AUTHOR {
        theme.muted_style()
    } else {
        Style::default().fg(theme.foreground)
    };

    let mut cells = vec![
        Cell::from(Span::styled(row.name, Style::default().fg(theme.highlight))),
        Cell::from(Span::styled(row.filter, Style::default().fg(theme.code))),
        Cell::from(Line::from(tags)),
        Cell::from(Span::styled(row.last_updated_by, author_style)),
        Cell::from(row.last_updated_at),
        Cell::from(row.effective_time),
    ];
    if let Some(actions) = row.actions {
        cells.push(Cell::from(Span::styled(actions, theme.muted_style())));
    }

    Row::new(cells)
}
