//! Column-aligned text tables with `|` separators.

use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Row {
    Cells(Vec<String>),
    /// A dashed rule; the first `skip` columns stay blank.
    Rule { skip: usize },
}

/// An in-memory table.
///
/// Every column is padded to its widest cell. The last cell of a row is
/// written without padding, so rows may have fewer cells than the header.
///
/// ```
/// use rbac_tool::table::Table;
///
/// let mut table = Table::new(["Kind", "Name"]);
/// table.row(["ClusterRole", "view"]);
/// assert_eq!(table.render(), "Kind        |Name\n----------- |----\nClusterRole |view\n");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    /// Create a table with a header and the rule under it.
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::default();
        table.row(header);
        table.rule();
        table
    }

    /// Append a row.
    pub fn row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(Row::Cells(cells.into_iter().map(Into::into).collect()));
    }

    /// Append a full-width rule.
    pub fn rule(&mut self) {
        self.rows.push(Row::Rule { skip: 0 });
    }

    /// Append a rule that leaves the first `skip` columns blank.
    pub fn partial_rule(&mut self, skip: usize) {
        self.rows.push(Row::Rule { skip });
    }

    /// Number of data rows, excluding the header and rules.
    pub fn data_rows(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| matches!(row, Row::Cells(_)))
            .count()
            .saturating_sub(1)
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = Vec::new();
        for row in &self.rows {
            if let Row::Cells(cells) = row {
                if widths.len() < cells.len() {
                    widths.resize(cells.len(), 0);
                }
                for (width, cell) in widths.iter_mut().zip(cells) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }
        widths
    }

    /// Render the table to a string.
    pub fn render(&self) -> String {
        let widths = self.widths();
        let mut out = String::new();

        for row in &self.rows {
            match row {
                Row::Cells(cells) => {
                    let last = cells.len().saturating_sub(1);
                    for (i, cell) in cells.iter().enumerate() {
                        if i == last {
                            out.push_str(cell);
                        } else {
                            let _ = write!(out, "{cell:<width$} |", width = widths[i]);
                        }
                    }
                }
                Row::Rule { skip } => {
                    let last = widths.len().saturating_sub(1);
                    for (i, width) in widths.iter().enumerate() {
                        let fill = if i < *skip { ' ' } else { '-' };
                        out.extend(std::iter::repeat(fill).take(*width));
                        if i != last {
                            out.push_str(" |");
                        }
                    }
                }
            }
            out.push('\n');
        }
        out
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}
