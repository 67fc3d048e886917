//! Terminal output helpers for the CLI
//!
//! Human-readable output goes through an [`OutputStyle`], which drops color
//! and box-drawing characters when `NO_COLOR` is set so piped or logged
//! output stays readable.

use comfy_table::{ContentArrangement, Table, modifiers, presets};
use owo_colors::OwoColorize;

/// Output format selection, shared by all subcommands.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    JsonPretty,
}

/// Rendering mode for text output.
#[derive(Debug, Clone, Copy)]
pub struct OutputStyle {
    plain: bool,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self {
            plain: std::env::var_os("NO_COLOR").is_some(),
        }
    }
}

impl OutputStyle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Force plain output regardless of the environment.
    #[must_use]
    pub fn no_color(mut self) -> Self {
        self.plain = true;
        self
    }

    /// A section heading.
    pub fn header(&self, text: &str) -> String {
        if self.plain {
            text.to_string()
        } else {
            text.bold().bright_blue().to_string()
        }
    }

    /// A completed-action line.
    pub fn success(&self, text: &str) -> String {
        if self.plain {
            text.to_string()
        } else {
            text.green().to_string()
        }
    }

    /// A failure line.
    pub fn error(&self, text: &str) -> String {
        if self.plain {
            text.to_string()
        } else {
            text.red().to_string()
        }
    }

    /// A `key: value` line with the key highlighted.
    pub fn key_value(&self, key: &str, value: &str) -> String {
        if self.plain {
            format!("{key}: {value}")
        } else {
            format!("{}: {value}", key.cyan())
        }
    }

    /// An empty table with borders matching the style. Column widths adapt
    /// to the terminal.
    pub fn table(&self) -> Table {
        let mut table = Table::new();
        if self.plain {
            table.load_preset(presets::ASCII_FULL_CONDENSED);
        } else {
            table
                .load_preset(presets::UTF8_FULL_CONDENSED)
                .apply_modifier(modifiers::UTF8_ROUND_CORNERS);
        }
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_style_passes_text_through() {
        let style = OutputStyle::new().no_color();
        assert_eq!(style.success("done"), "done");
        assert_eq!(style.error("failed"), "failed");
        assert_eq!(style.header("Import"), "Import");
        assert_eq!(style.key_value("Games", "42"), "Games: 42");
    }

    #[test]
    fn test_plain_table_has_no_box_drawing() {
        let mut table = OutputStyle::new().no_color().table();
        table.set_header(vec!["Name"]);
        table.add_row(vec!["Portal"]);
        let rendered = table.to_string();
        assert!(rendered.is_ascii());
        assert!(rendered.contains("Portal"));
    }
}
