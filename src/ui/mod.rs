//! User interface abstraction
//!
//! Commands write through the [`UI`] trait so they can be driven from the
//! terminal or captured in tests. Diagnostics go through `tracing` instead.

use crate::error::Result;
use std::io::{self, Write};

#[cfg(test)]
pub mod test_ui;

/// Abstract UI trait for command interaction
pub trait UI {
    /// Output a message to the user
    fn output(&mut self, message: &str) -> Result<()>;

    /// Output an error message
    fn error(&mut self, message: &str) -> Result<()>;

    /// Output a warning message
    fn warning(&mut self, message: &str) -> Result<()>;

    /// Output rows of cells as left-aligned columns
    fn output_table(&mut self, rows: &[Vec<String>]) -> Result<()> {
        for line in format_table(rows) {
            self.output(&line)?;
        }
        Ok(())
    }
}

/// Pad every column but the last to its widest cell.
pub fn format_table(rows: &[Vec<String>]) -> Vec<String> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0; columns];
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    rows.iter()
        .map(|row| {
            let last = row.len().saturating_sub(1);
            row.iter()
                .enumerate()
                .map(|(i, cell)| {
                    if i == last {
                        cell.clone()
                    } else {
                        format!("{:<width$}", cell, width = widths[i])
                    }
                })
                .collect::<Vec<_>>()
                .join("  ")
        })
        .collect()
}

/// Command-line UI implementation
pub struct CliUI {
    stdout: Box<dyn Write>,
    stderr: Box<dyn Write>,
}

impl CliUI {
    /// Creates a new command-line UI instance using stdout and stderr.
    pub fn new() -> Self {
        CliUI {
            stdout: Box::new(io::stdout()),
            stderr: Box::new(io::stderr()),
        }
    }
}

impl Default for CliUI {
    fn default() -> Self {
        Self::new()
    }
}

impl UI for CliUI {
    fn output(&mut self, message: &str) -> Result<()> {
        writeln!(self.stdout, "{}", message)?;
        Ok(())
    }

    fn error(&mut self, message: &str) -> Result<()> {
        writeln!(self.stderr, "Error: {}", message)?;
        Ok(())
    }

    fn warning(&mut self, message: &str) -> Result<()> {
        writeln!(self.stderr, "Warning: {}", message)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::test_ui::TestUI;
    use super::*;

    #[test]
    fn test_format_table_aligns_columns() {
        let rows = vec![
            vec!["Build".to_string(), "Passed".to_string(), "Failed".to_string()],
            vec!["#10".to_string(), "3".to_string(), "0".to_string()],
        ];
        assert_eq!(
            format_table(&rows),
            vec!["Build  Passed  Failed", "#10    3       0"]
        );
    }

    #[test]
    fn test_output_table_goes_through_output() {
        let mut ui = TestUI::new();
        ui.output_table(&[vec!["a".to_string(), "b".to_string()]])
            .unwrap();
        assert_eq!(ui.output, vec!["a  b"]);
    }

    #[test]
    fn test_format_table_empty() {
        assert!(format_table(&[]).is_empty());
    }
}
