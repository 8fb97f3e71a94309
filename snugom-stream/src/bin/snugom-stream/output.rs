use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

use crate::theme::{ICONS, THEME};

/// Output format options for CLI commands
#[derive(Clone, Debug, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    /// Human-readable, colored output (default)
    #[default]
    Text,
    /// JSON output for scripting
    Json,
}

/// Global CLI options that affect output
#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub no_color: bool,
}

/// Data with a human-readable rendering next to its JSON form
pub trait TextDisplay {
    fn print_text(&self, output: &OutputManager);
}

/// Output manager handles formatting and display
pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        if options.no_color {
            colored::control::set_override(false);
        }
        Self { options }
    }

    /// Display data according to the configured output format
    pub fn display<T>(&self, data: &T) -> Result<()>
    where
        T: Serialize + TextDisplay,
    {
        if self.options.quiet {
            return Ok(());
        }

        match self.options.output_format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(data)?;
                println!("{json}");
            }
            OutputFormat::Text => data.print_text(self),
        }
        Ok(())
    }

    /// Display a success message with color and icon
    pub fn success(&self, message: &str) {
        if !self.options.quiet {
            println!("{} {}", ICONS.success.color(THEME.success), message.color(THEME.success));
        }
    }

    /// Display an error message with color and icon
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", ICONS.error.color(THEME.error), message.color(THEME.error));
    }

    /// Display info message with color and icon. Suppressed for JSON output.
    pub fn info(&self, message: &str) {
        if !self.options.quiet && self.options.output_format == OutputFormat::Text {
            println!("{} {}", ICONS.info.color(THEME.info), message.color(THEME.info));
        }
    }

    /// Display a heading
    pub fn heading(&self, text: &str) {
        if !self.options.quiet {
            if self.options.no_color {
                println!("\n{text}\n{}", "=".repeat(text.len()));
            } else {
                println!("\n{}", text.color(THEME.primary).bold());
            }
        }
    }

    /// Display a key-value pair
    pub fn key_value(&self, key: &str, value: &str) {
        if !self.options.quiet {
            println!("{}: {}", key.color(THEME.key).bold(), value.color(THEME.value));
        }
    }

    /// Display a bullet list item
    pub fn bullet(&self, text: &str) {
        if !self.options.quiet {
            println!("  {} {text}", ICONS.bullet.color(THEME.muted));
        }
    }
}
