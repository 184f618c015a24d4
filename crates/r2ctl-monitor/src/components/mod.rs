//! TUI components.

pub mod footer;
pub mod header;
pub mod history_view;
pub mod rule_editor;
pub mod rules_table;
pub mod target_preview;

pub use footer::Footer;
pub use header::Header;
pub use history_view::HistoryView;
pub use rule_editor::{EditorError, EditorField, EditorOutcome, RuleEditor};
pub use rules_table::{
    EMPTY_TEXT, RowKey, RuleRow, RulesTable, RulesTableProps, TableCursor, column_titles,
    table_rows, table_rows_in,
};
pub use target_preview::TargetPreview;
