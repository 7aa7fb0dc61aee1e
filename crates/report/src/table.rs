//! Fixed-width ASCII tables, split into chunks that fit a Slack section
//!
//! A chunk is a bold label line followed by a fenced code block holding the
//! header row, the separator row and the data rows:
//!
//! ```text
//! *Failed tests (2)*
//! #   | Module     | Test ID    | Title ...        | Error ...
//! ----+------------+------------+------------------+----------
//! 1   | Login      | TS-13165   | Login with va... | Expected ...
//! ```
//!
//! Every chunk repeats the header and separator so it can be posted as a
//! block on its own.

use crate::metadata::{TestMetadata, UNPARSEABLE};
use crate::playwright::{CaseStatus, TestCase};

const ELLIPSIS: &str = "...";
const COLUMN_JOIN: &str = " | ";
const SEPARATOR_JOIN: &str = "-+-";
const FENCE: &str = "```";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub header: &'static str,
    pub width: usize,
}

pub const COLUMNS: [Column; 4] = [
    Column { header: "#", width: 3 },
    Column { header: "Module", width: 10 },
    Column { header: "Test ID", width: 10 },
    Column { header: "Title", width: 55 },
];

/// Extra column on the failed table
pub const ERROR_COLUMN: Column = Column { header: "Error", width: 45 };

/// Replace characters that would break a row, then trim
pub fn sanitize_cell(value: &str) -> String {
    value
        .chars()
        .map(|c| if matches!(c, '|' | '\r' | '\n' | '\t') { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Sanitize, truncate with `...` and right-pad to exactly `width` characters
pub fn format_cell(value: &str, width: usize) -> String {
    let clean = sanitize_cell(value);
    let len = clean.chars().count();

    let mut cell = if len <= width {
        clean
    } else if width > ELLIPSIS.len() {
        let mut cut: String = clean.chars().take(width - ELLIPSIS.len()).collect();
        cut.push_str(ELLIPSIS);
        cut
    } else {
        clean.chars().take(width).collect()
    };

    let padding = width - cell.chars().count();
    cell.extend(std::iter::repeat(' ').take(padding));
    cell
}

fn render_row<S: AsRef<str>>(cells: &[S], columns: &[Column]) -> String {
    cells
        .iter()
        .zip(columns)
        .map(|(value, column)| format_cell(value.as_ref(), column.width))
        .collect::<Vec<_>>()
        .join(COLUMN_JOIN)
}

/// Dashes per column joined by `-+-`, no trailing `+`
fn render_separator(columns: &[Column]) -> String {
    columns
        .iter()
        .map(|c| "-".repeat(c.width))
        .collect::<Vec<_>>()
        .join(SEPARATOR_JOIN)
}

fn columns_for(status: CaseStatus) -> Vec<Column> {
    let mut columns = COLUMNS.to_vec();
    if status == CaseStatus::Failed {
        columns.push(ERROR_COLUMN);
    }
    columns
}

pub fn class_title(status: CaseStatus) -> &'static str {
    match status {
        CaseStatus::Failed => "Failed tests",
        CaseStatus::Passed => "Passed tests",
        CaseStatus::Skipped => "Skipped tests",
    }
}

/// Renders per-outcome tables under a row cap and a per-chunk size ceiling
#[derive(Debug, Clone, Copy)]
pub struct TableBuilder {
    /// Maximum rows shown per outcome class
    pub detail_limit: usize,
    /// Soft ceiling for a chunk, in characters
    pub max_chars: usize,
}

impl TableBuilder {
    pub fn new(detail_limit: usize, max_chars: usize) -> Self {
        Self { detail_limit, max_chars }
    }

    /// Chunks for every case with `status`, in case order. Empty when no case
    /// matches.
    pub fn chunks(&self, cases: &[TestCase], status: CaseStatus) -> Vec<String> {
        let matching: Vec<&TestCase> = cases.iter().filter(|c| c.status == status).collect();
        if matching.is_empty() {
            return Vec::new();
        }

        let columns = columns_for(status);
        let headers: Vec<&str> = columns.iter().map(|c| c.header).collect();
        let frame = ChunkFrame {
            base_label: format!("{} ({})", class_title(status), matching.len()),
            header: render_row(&headers, &columns),
            separator: render_separator(&columns),
        };

        let shown = matching.len().min(self.detail_limit);
        let hidden = matching.len() - shown;
        let suffix = if hidden > 0 {
            format!("\n_{} more not shown_", hidden)
        } else {
            String::new()
        };
        // the suffix rides on the final chunk only
        let final_budget = self.max_chars.saturating_sub(suffix.chars().count());

        let mut chunks = Vec::new();
        let mut rows: Vec<String> = Vec::new();

        for (index, case) in matching.iter().take(shown).enumerate() {
            rows.push(render_case(index + 1, case, &columns));

            let budget = if index + 1 == shown { final_budget } else { self.max_chars };
            if rows.len() > 1 && frame.render(chunks.len(), &rows).chars().count() > budget {
                let overflow = rows.pop().unwrap_or_default();
                chunks.push(frame.render(chunks.len(), &rows));
                rows = vec![overflow];
            }
        }

        if !rows.is_empty() {
            chunks.push(frame.render(chunks.len(), &rows));
        }
        if let Some(last) = chunks.last_mut() {
            last.push_str(&suffix);
        }

        chunks
    }
}

struct ChunkFrame {
    base_label: String,
    header: String,
    separator: String,
}

impl ChunkFrame {
    fn label(&self, index: usize) -> String {
        if index == 0 {
            self.base_label.clone()
        } else {
            format!("{} cont. {}", self.base_label, index + 1)
        }
    }

    fn render(&self, index: usize, rows: &[String]) -> String {
        format!(
            "*{}*\n{}\n{}\n{}\n{}\n{}",
            self.label(index),
            FENCE,
            self.header,
            self.separator,
            rows.join("\n"),
            FENCE
        )
    }
}

fn render_case(position: usize, case: &TestCase, columns: &[Column]) -> String {
    let meta = TestMetadata::from_path(&case.file);
    let title = if meta.title == UNPARSEABLE {
        case.title.as_str()
    } else {
        meta.title.as_str()
    };

    let mut cells = vec![
        position.to_string(),
        meta.module_name.clone(),
        meta.test_case_id.clone(),
        title.to_string(),
    ];
    if columns.len() > COLUMNS.len() {
        cells.push(case.error.clone().unwrap_or_default());
    }

    render_row(&cells, columns)
}
