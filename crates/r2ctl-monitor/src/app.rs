//! Main TUI application.

use crate::actions::{RuleAction, RuleHandlers};
use crate::components::{
    EditorOutcome, Footer, Header, HistoryView, RowKey, RuleEditor, RulesTable, RulesTableProps,
    TableCursor, TargetPreview,
};
use crate::fetch::{FetchEvent, FetchState};
use crate::ui::{Theme, centered_rect};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use r2ctl_core::{HELP_KEYS, HistorySource, RollupRule, Target, help_text};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use std::time::{Duration, Instant};

/// How long a status message stays in the footer.
const STATUS_TTL: Duration = Duration::from_secs(3);

/// The single open modal, if any.
#[derive(Debug, Clone)]
pub enum Modal {
    Editor(RuleEditor),
    History(HistoryView),
}

/// Main application state.
pub struct App<H: RuleHandlers> {
    pub namespace: String,
    pub rules: FetchState<Vec<RollupRule>>,
    pub cursor: TableCursor,
    pub modal: Option<Modal>,
    pub show_help: bool,
    pub should_quit: bool,
    pub theme: Theme,
    pub handlers: H,
    status_message: Option<(String, Instant)>, // Temporary status message with timestamp
}

impl<H: RuleHandlers> App<H> {
    pub fn new(namespace: impl Into<String>, handlers: H) -> Self {
        Self {
            namespace: namespace.into(),
            rules: FetchState::Idle,
            cursor: TableCursor::default(),
            modal: None,
            show_help: false,
            should_quit: false,
            theme: Theme::dark(),
            handlers,
            status_message: None,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Start (re-)fetching the rule list.
    pub fn load_rules(&mut self) {
        self.rules.start();
        self.handlers.load_rules();
    }

    /// Open the history modal bound to `source` and start its fetch.
    pub fn open_history(&mut self, source: HistorySource) {
        self.handlers.load_history(&source);
        self.modal = Some(Modal::History(HistoryView::new(source)));
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    fn rule_count(&self) -> usize {
        self.rules.value().map_or(0, Vec::len)
    }

    /// Get the currently selected rule.
    pub fn selected_rule(&self) -> Option<&RollupRule> {
        self.rules
            .value()
            .and_then(|rules| rules.get(self.cursor.selected))
    }

    fn target_count(&self) -> usize {
        self.selected_rule().map_or(0, |r| r.targets.len())
    }

    /// Target whose popover is open in the main table.
    pub fn previewed_target(&self) -> Option<&Target> {
        if !self.cursor.preview_open {
            return None;
        }
        self.selected_rule()
            .and_then(|r| r.targets.get(self.cursor.target))
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    /// Recent status message (within `STATUS_TTL`).
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_ref().and_then(|(msg, timestamp)| {
            if timestamp.elapsed() < STATUS_TTL {
                Some(msg.as_str())
            } else {
                None
            }
        })
    }

    /// Run a row action against the selected rule.
    pub fn dispatch(&mut self, action: RuleAction) {
        let Some(rule) = self.selected_rule().cloned() else {
            self.set_status("No rule selected");
            return;
        };

        match action {
            RuleAction::Edit => {
                self.modal = Some(Modal::Editor(RuleEditor::edit(rule)));
            }
            RuleAction::Delete => {
                self.handlers.delete_rollup_rule(&rule);
                self.set_status(format!("Deleting rollup rule {}…", rule.name));
            }
            RuleAction::History => {
                let source = HistorySource::rollup_rule(&self.namespace, &rule.id);
                self.open_history(source);
            }
        }
    }

    /// Open the editor on an empty rule.
    pub fn new_rule(&mut self) {
        self.modal = Some(Modal::Editor(RuleEditor::create()));
    }

    fn finish_editor(&mut self, outcome: EditorOutcome) {
        match outcome {
            EditorOutcome::Continue => {}
            EditorOutcome::Cancel => self.modal = None,
            EditorOutcome::Submit(rule) => {
                self.modal = None;
                self.set_status(format!("Saving rollup rule {}…", rule.name));
                self.handlers.save_rollup_rule(rule);
            }
        }
    }

    /// Apply the outcome of a request.
    pub fn apply(&mut self, event: FetchEvent) {
        match event {
            FetchEvent::RulesLoaded(result) => {
                self.rules.finish(result);
                let len = self.rule_count();
                self.cursor.clamp(len);
            }
            FetchEvent::HistoryLoaded { source, result } => {
                if let Some(Modal::History(view)) = self.modal.as_mut() {
                    view.apply(&source, result);
                }
            }
            FetchEvent::RuleSaved(Ok(rule)) => {
                self.set_status(format!("Saved rollup rule {}", rule.name));
            }
            FetchEvent::RuleSaved(Err(e)) => {
                self.set_status(format!("Failed to save rollup rule: {}", e));
            }
            FetchEvent::RuleDeleted(Ok(rule)) => {
                self.set_status(format!("Deleted rollup rule {}", rule.name));
            }
            FetchEvent::RuleDeleted(Err(e)) => {
                self.set_status(format!("Failed to delete rollup rule: {}", e));
            }
        }
    }

    /// Copy the selected rule's filter to clipboard.
    fn copy_filter(&mut self) {
        let Some(filter) = self.selected_rule().map(|r| r.filter.clone()) else {
            self.set_status("No rule selected");
            return;
        };

        match arboard::Clipboard::new() {
            Ok(mut clipboard) => match clipboard.set_text(filter) {
                Ok(()) => self.set_status("Filter copied to clipboard"),
                Err(_) => self.set_status("Failed to copy to clipboard"),
            },
            Err(_) => self.set_status("Clipboard not available"),
        }
    }

    /// Handle a key event.
    pub fn handle_key(&mut self, key: KeyEvent) {
        // If help is showing, any key closes it
        if self.show_help {
            self.show_help = false;
            return;
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return;
        }

        // An open modal takes all keys
        match self.modal.as_mut() {
            Some(Modal::Editor(editor)) => {
                let outcome = editor.handle_key(key);
                self.finish_editor(outcome);
                return;
            }
            Some(Modal::History(view)) => {
                if view.handle_key(key) {
                    self.modal = None;
                }
                return;
            }
            None => {}
        }

        let len = self.rule_count();
        let targets = self.target_count();
        match key.code {
            KeyCode::Esc if self.cursor.preview_open => self.cursor.preview_open = false,
            KeyCode::Char('q') => self.quit(),
            KeyCode::Char('j') | KeyCode::Down => self.cursor.select_next(len),
            KeyCode::Char('k') | KeyCode::Up => self.cursor.select_previous(len),
            KeyCode::Char('g') | KeyCode::Home => self.cursor.select_first(),
            KeyCode::Char('G') | KeyCode::End => self.cursor.select_last(len),
            KeyCode::Char('l') | KeyCode::Right => self.cursor.next_target(targets),
            KeyCode::Char('h') | KeyCode::Left => self.cursor.previous_target(targets),
            KeyCode::Char(' ') | KeyCode::Enter => self.cursor.toggle_preview(targets),
            KeyCode::Char('e') => self.dispatch(RuleAction::Edit),
            KeyCode::Char('d') => self.dispatch(RuleAction::Delete),
            KeyCode::Char('H') => self.dispatch(RuleAction::History),
            KeyCode::Char('n') => self.new_rule(),
            KeyCode::Char('r') | KeyCode::F(5) => self.load_rules(),
            KeyCode::Char('c') => self.copy_filter(),
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }

    /// Poll for events and handle them.
    pub fn poll_events(&mut self, timeout: Duration) -> std::io::Result<bool> {
        if event::poll(timeout)? {
            return Ok(self.handle_event(event::read()?));
        }
        Ok(false)
    }

    /// Handle one terminal event. Only key presses are acted on.
    pub fn handle_event(&mut self, event: Event) -> bool {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press {
                self.handle_key(key);
                return true;
            }
        }
        false
    }

    /// Render the UI.
    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header (1 line + borders)
                Constraint::Min(5),    // Rules table
                Constraint::Length(1), // Footer
            ])
            .split(area);

        Header::render(frame, chunks[0], &self.namespace, &self.rules, &self.theme);

        let props = RulesTableProps {
            title: "Rollup Rules",
            rules: &self.rules,
            row_key: RowKey::Id,
            show_actions: true,
            cursor: self.cursor,
            is_active: self.modal.is_none(),
        };
        RulesTable::render(frame, chunks[1], &props, &self.theme);

        if let Some(target) = self.previewed_target() {
            TargetPreview::render(frame, chunks[1], target, &self.theme);
        }

        Footer::render(frame, chunks[2], self.status_message(), &self.theme);

        match &self.modal {
            Some(Modal::Editor(editor)) => editor.render(frame, area, &self.theme),
            Some(Modal::History(view)) => view.render(frame, area, &self.theme),
            None => {}
        }

        // Help overlay (on top of everything)
        if self.show_help {
            self.render_help_overlay(frame);
        }
    }

    fn render_help_overlay(&self, frame: &mut Frame) {
        let area = centered_rect(70, 80, frame.area());
        frame.render_widget(Clear, area);

        let paragraph = Paragraph::new(help_overlay_text())
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" Help "))
            .style(Style::default().fg(self.theme.foreground).bg(self.theme.muted));

        frame.render_widget(paragraph, area);
    }
}

/// Help text: key bindings followed by the column descriptions.
fn help_overlay_text() -> String {
    let mut text = String::from(
        r#"
  Keyboard Shortcuts
  ──────────────────

  Rules Table
  j/k / ↑↓       Navigate rules
  g / G          Go to first/last rule
  h/l / ←→       Focus previous/next target
  Space / Enter  Show target policies and tags
  e              Edit rule
  d              Delete rule
  H              Rule history
  n              New rule
  c              Copy filter
  r / F5         Refresh

  Modals
  Tab / Shift-Tab  Next/previous field
  Enter            Save
  Esc              Close

  ?              This help
  q / Ctrl+C     Quit

  Columns
  ───────
"#,
    );

    for key in HELP_KEYS {
        if let Some(help) = help_text(key) {
            text.push_str(&format!("  {}\n    {}\n", key, help));
        }
    }

    text.push_str("\n  Press any key to close\n");
    text
}
