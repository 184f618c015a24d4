//! Popover with a target's policies and group-by tags.

use crate::ui::Theme;
use r2ctl_core::Target;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

pub struct TargetPreview;

impl TargetPreview {
    /// Popover body: policies space-separated, tags comma-separated.
    pub fn lines(target: &Target, theme: &Theme) -> Vec<Line<'static>> {
        let label = Style::default()
            .fg(theme.foreground)
            .add_modifier(Modifier::BOLD);

        vec![
            Line::from(Span::styled("Policies", label)),
            value_line(&target.policies.join(" "), theme),
            Line::from(""),
            Line::from(Span::styled("GroupBy Tags", label)),
            value_line(&target.tags.join(", "), theme),
        ]
    }

    /// Render the popover anchored below `anchor` (the table area), clipped to it.
    pub fn render(frame: &mut Frame, anchor: Rect, target: &Target, theme: &Theme) {
        let lines = Self::lines(target, theme);
        let title = Span::raw(target.name.as_str()).width() + 2;
        let widest = lines.iter().map(Line::width).max().unwrap_or(0).max(title);
        let width = u16::try_from(widest + 2)
            .unwrap_or(u16::MAX)
            .max(24)
            .min(anchor.width);
        let height = (lines.len() as u16 + 2).min(anchor.height);

        let area = Rect {
            x: anchor.x + anchor.width.saturating_sub(width) / 2,
            y: anchor.y + anchor.height.saturating_sub(height) / 2,
            width,
            height,
        };

        frame.render_widget(Clear, area);
        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .style(theme.popup_style())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Span::styled(
                        format!(" {} ", target.name),
                        Style::default()
                            .fg(theme.highlight)
                            .add_modifier(Modifier::BOLD),
                    )),
            );
        frame.render_widget(paragraph, area);
    }
}

fn value_line(value: &str, theme: &Theme) -> Line<'static> {
    if value.is_empty() {
        Line::from(Span::styled("none", theme.muted_style()))
    } else {
        Line::from(Span::raw(value.to_string()))
    }
}
