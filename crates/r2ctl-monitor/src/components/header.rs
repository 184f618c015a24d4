//! Header component with namespace and load status.

use crate::fetch::FetchState;
use crate::ui::Theme;
use chrono::Local;
use r2ctl_core::RollupRule;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub struct Header;

impl Header {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        namespace: &str,
        rules: &FetchState<Vec<RollupRule>>,
        theme: &Theme,
    ) {
        // Current date/time for right side
        let datetime = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let status = match rules {
            FetchState::Idle => Span::styled("idle", theme.muted_style()),
            FetchState::Pending(_) => Span::styled("loading", Style::default().fg(theme.warning)),
            FetchState::Loaded(rules) => Span::styled(
                format!("{} rules", rules.len()),
                Style::default().fg(theme.success),
            ),
            FetchState::Failed(_) => Span::styled("✗ unreachable", Style::default().fg(theme.error)),
        };

        let title = Line::from(vec![
            Span::raw(" r2ctl"),
            Span::styled(" │ ", theme.muted_style()),
            Span::styled(namespace.to_string(), Style::default().fg(theme.highlight)),
            Span::styled(" │ ", theme.muted_style()),
            status,
            Span::raw(" "),
        ]);

        let datetime_line = Line::from(Span::styled(datetime, Style::default().fg(theme.warning)))
            .alignment(Alignment::Right);

        let paragraph = Paragraph::new(Line::from(Span::styled(
            "Rollup rules",
            theme.muted_style(),
        )))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_top(datetime_line),
        );

        frame.render_widget(paragraph, area);
    }
}
