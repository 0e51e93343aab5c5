//! Rendering primitives for CLI output.

use std::io::IsTerminal;

use comfy_table::{Attribute, Cell, ContentArrangement, Table as ComfyTable};

/// Output mode determines how results are formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Machine-readable JSON output only
    Json,
    /// Plain text, stable for logs and scripts
    #[default]
    Plain,
    /// Human-friendly tables (TTY only)
    Pretty,
}

impl OutputMode {
    /// Resolve output mode from flags and environment.
    ///
    /// `--json` wins, `TERM=dumb` forces plain, otherwise pretty only on a TTY.
    pub fn resolve(json_flag: bool, is_tty: bool, term_is_dumb: bool) -> Self {
        if json_flag {
            return Self::Json;
        }
        if is_tty && !term_is_dumb {
            Self::Pretty
        } else {
            Self::Plain
        }
    }

    pub fn from_env(json_flag: bool) -> Self {
        let is_tty = std::io::stdout().is_terminal();
        let term_is_dumb = std::env::var("TERM").map(|v| v == "dumb").unwrap_or(false);
        Self::resolve(json_flag, is_tty, term_is_dumb)
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }

    pub fn is_pretty(&self) -> bool {
        matches!(self, Self::Pretty)
    }
}

/// Render rows as a borderless table (pretty) or tab-separated lines (plain).
pub fn simple_table(mode: OutputMode, headers: &[&str], rows: &[Vec<String>]) -> String {
    if mode.is_pretty() {
        let mut table = ComfyTable::new();
        table.load_preset(comfy_table::presets::NOTHING);
        table.set_content_arrangement(ContentArrangement::Dynamic);

        let header_cells: Vec<Cell> = headers
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Dim))
            .collect();
        table.set_header(header_cells);

        for i in 0..headers.len() {
            if let Some(column) = table.column_mut(i) {
                column.set_padding((0, 2));
            }
        }
        for row in rows {
            table.add_row(row);
        }

        table.to_string()
    } else {
        rows.iter()
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Render a key-value line.
pub fn kv(mode: OutputMode, key: &str, value: &str) -> String {
    if mode.is_pretty() {
        format!("{:<10} {}", format!("{}:", key), value)
    } else {
        format!("{}={}", key.to_lowercase().replace(' ', "_"), value)
    }
}

/// Format an error message, splitting off a trailing hint line.
///
/// Pretty mode: "Error: message" with "Hint: ..." on the next line.
/// Plain mode: "error=message" with optional "hint=suggestion".
pub fn error_message(mode: OutputMode, message: &str) -> String {
    let (message, hint) = match message.find("\nHint:") {
        Some(idx) => (&message[..idx], Some(message[idx + 1..].trim_start_matches("Hint:").trim())),
        None => (message, None),
    };

    let mut lines = Vec::new();
    if mode.is_pretty() {
        lines.push(format!("Error: {}", message));
        if let Some(h) = hint {
            lines.push(format!("Hint: {}", h));
        }
    } else {
        lines.push(format!("error={}", message));
        if let Some(h) = hint {
            lines.push(format!("hint={}", h));
        }
    }
    lines.join("\n")
}
