//! Footer component with keyboard shortcuts and status messages.

use crate::ui::Theme;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP: &str = "j/k:nav  h/l:target  space:preview  e:edit  d:delete  H:history  n:new  c:copy  r:refresh  ?:help  q:quit";

pub struct Footer;

impl Footer {
    pub fn render(frame: &mut Frame, area: Rect, status_message: Option<&str>, theme: &Theme) {
        let version = format!("v{}", VERSION);

        // Split footer into left (help/status), right (version)
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(version.len() as u16 + 1),
            ])
            .split(area);

        // Show status message if present, otherwise show help
        let left_content = if let Some(msg) = status_message {
            Line::from(Span::styled(
                msg.to_string(),
                Style::default()
                    .fg(theme.highlight)
                    .add_modifier(Modifier::BOLD),
            ))
        } else {
            Line::from(Span::styled(HELP, theme.muted_style()))
        };

        frame.render_widget(Paragraph::new(left_content), chunks[0]);

        let version_paragraph =
            Paragraph::new(Line::from(Span::styled(version, theme.muted_style())));
        frame.render_widget(version_paragraph, chunks[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};

    fn render(status: Option<&str>, theme: &Theme) -> ratatui::buffer::Buffer {
        let backend = TestBackend::new(160, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| Footer::render(f, f.area(), status, theme))
            .unwrap();
        terminal.backend().buffer().clone()
    }

    fn row_text(buf: &ratatui::buffer::Buffer) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_help_lists_every_key() {
        let buf = render(None, &Theme::dark());
        let text = row_text(&buf);
        assert!(text.contains("c:copy"), "{text}");
        assert!(text.contains("H:history"), "{text}");
    }

    #[test]
    fn test_uses_theme_colors() {
        let theme = Theme::light();
        let buf = render(None, &theme);
        assert_eq!(buf[(0, 0)].fg, theme.muted);

        let buf = render(Some("Saved"), &theme);
        assert!(row_text(&buf).starts_with("Saved"));
        assert_eq!(buf[(0, 0)].fg, theme.highlight);
    }
}
