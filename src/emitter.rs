//! pandas code emitter
//!
//! Renders a translated query as a short pandas script: the merges in
//! tree order, then one boolean-mask filter, then the projection.

use crate::builder::SelectedColumns;
use crate::filter::FilterCondition;
use crate::merge::{python_identifier, python_string};
use crate::translator::Translation;

/// Emits pandas code for a translation
#[derive(Debug, Default, Clone, Copy)]
pub struct PandasEmitter;

impl PandasEmitter {
    pub fn new() -> Self {
        PandasEmitter
    }

    /// Render the whole translation, one statement per line
    pub fn emit(&self, translation: &Translation) -> String {
        let frame = python_identifier(translation.result_name());
        let mut lines: Vec<String> = translation.merges.iter().map(|m| m.to_string()).collect();

        if let Some(line) = self.filter_line(&frame, &translation.filters) {
            lines.push(line);
        }
        if let Some(line) = self.projection_line(&frame, &translation.tree.columns) {
            lines.push(line);
        }

        let mut script = lines.join("\n");
        script.push('\n');
        script
    }

    fn filter_line(&self, frame: &str, filters: &[FilterCondition]) -> Option<String> {
        if filters.is_empty() {
            return None;
        }

        let mask = filters
            .iter()
            .map(|f| {
                format!(
                    "({}[{}] {} {})",
                    frame,
                    python_string(&f.column),
                    f.operator.as_python(),
                    f.value.as_python()
                )
            })
            .collect::<Vec<_>>()
            .join(" & ");
        Some(format!("{} = {}[{}]", frame, frame, mask))
    }

    /// Column selection; skipped when a wildcard keeps every column
    ///
    /// DISTINCT drops duplicate rows after the columns are picked.
    fn projection_line(&self, frame: &str, columns: &SelectedColumns) -> Option<String> {
        if columns.is_empty() || columns.has_wildcard() {
            return columns
                .is_distinct()
                .then(|| format!("{} = {}.drop_duplicates()", frame, frame));
        }

        let names = columns
            .columns()
            .iter()
            .map(|c| python_string(&c.column_name))
            .collect::<Vec<_>>()
            .join(", ");
        let mut line = format!("{} = {}[[{}]]", frame, frame, names);

        let renames: Vec<String> = columns
            .columns()
            .iter()
            .filter_map(|c| {
                c.alias
                    .as_ref()
                    .map(|alias| format!("{}: {}", python_string(&c.column_name), python_string(alias)))
            })
            .collect();
        if !renames.is_empty() {
            line.push_str(&format!(".rename(columns={{{}}})", renames.join(", ")));
        }
        if columns.is_distinct() {
            line.push_str(".drop_duplicates()");
        }
        Some(line)
    }
}
