//! Read-only history of a rollup or mapping rule, shown in a modal.

use crate::components::rules_table::{RowKey, RulesTable, RulesTableProps, TableCursor};
use crate::components::target_preview::TargetPreview;
use crate::fetch::FetchState;
use crate::ui::{Theme, centered_rect};
use crossterm::event::{KeyCode, KeyEvent};
use r2ctl_core::{HistorySource, RollupRule, Target};
use ratatui::{Frame, layout::Rect, widgets::Clear};

/// History modal state, bound to one history endpoint.
#[derive(Debug, Clone)]
pub struct HistoryView {
    pub source: HistorySource,
    pub history: FetchState<Vec<RollupRule>>,
    pub cursor: TableCursor,
}

impl HistoryView {
    /// New view whose fetch has been started.
    pub fn new(source: HistorySource) -> Self {
        let mut history = FetchState::Idle;
        history.start();
        Self {
            source,
            history,
            cursor: TableCursor::default(),
        }
    }

    /// Apply a fetch result. Results for another source are ignored.
    pub fn apply(&mut self, source: &HistorySource, result: Result<Vec<RollupRule>, String>) -> bool {
        if *source != self.source {
            return false;
        }
        self.history.finish(result);
        self.cursor.clamp(self.len());
        true
    }

    fn len(&self) -> usize {
        self.history.value().map_or(0, Vec::len)
    }

    pub fn selected_entry(&self) -> Option<&RollupRule> {
        self.history
            .value()
            .and_then(|entries| entries.get(self.cursor.selected))
    }

    fn target_count(&self) -> usize {
        self.selected_entry().map_or(0, |e| e.targets.len())
    }

    pub fn previewed_target(&self) -> Option<&Target> {
        if !self.cursor.preview_open {
            return None;
        }
        self.selected_entry()
            .and_then(|e| e.targets.get(self.cursor.target))
    }

    /// Handle a key. Returns true when the modal should close.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let len = self.len();
        let targets = self.target_count();
        match key.code {
            KeyCode::Esc if self.cursor.preview_open => self.cursor.preview_open = false,
            KeyCode::Esc | KeyCode::Char('q') => return true,
            KeyCode::Char('j') | KeyCode::Down => self.cursor.select_next(len),
            KeyCode::Char('k') | KeyCode::Up => self.cursor.select_previous(len),
            KeyCode::Char('g') | KeyCode::Home => self.cursor.select_first(),
            KeyCode::Char('G') | KeyCode::End => self.cursor.select_last(len),
            KeyCode::Char('l') | KeyCode::Right => self.cursor.next_target(targets),
            KeyCode::Char('h') | KeyCode::Left => self.cursor.previous_target(targets),
            KeyCode::Char(' ') | KeyCode::Enter => self.cursor.toggle_preview(targets),
            _ => {}
        }
        false
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let area = centered_rect(90, 80, area);
        frame.render_widget(Clear, area);

        let props = RulesTableProps {
            title: self.source.title(),
            rules: &self.history,
            row_key: RowKey::Index,
            show_actions: false,
            cursor: self.cursor,
            is_active: true,
        };
        RulesTable::render(frame, area, &props, theme);

        if let Some(target) = self.previewed_target() {
            TargetPreview::render(frame, area, target, theme);
        }
    }
}
