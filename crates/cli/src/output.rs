//! Output formatting utilities

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print rows as a rounded table
pub fn print_rows<T: Tabled>(rows: Vec<T>) {
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a volume in liters
pub fn format_liters(liters: f64) -> String {
    format!("{:.2} L", liters)
}

/// Format an accuracy score, `-` when unknown
pub fn format_accuracy(accuracy: Option<f64>) -> String {
    match accuracy {
        Some(a) => format!("{:.1}%", a),
        None => "-".to_string(),
    }
}

/// Color accuracy based on value
pub fn color_accuracy(accuracy: Option<f64>) -> String {
    let formatted = format_accuracy(accuracy);
    match accuracy {
        Some(a) if a >= 90.0 => formatted.green().to_string(),
        Some(a) if a >= 75.0 => formatted.yellow().to_string(),
        Some(_) => formatted.red().to_string(),
        None => formatted.dimmed().to_string(),
    }
}
