//! Styled terminal output

use console::style;
use nypl_data_api_client::Payload;

use crate::diff::{DiffLine, diff_lines};

/// Print a response payload (pretty JSON or raw text)
pub fn print_payload(payload: Option<&Payload>) {
    match payload {
        Some(Payload::Json(value)) => match serde_json::to_string_pretty(value) {
            Ok(pretty) => println!("{pretty}"),
            Err(_) => println!("{value}"),
        },
        Some(Payload::Text(text)) => println!("{text}"),
        None => println!("{}", style("[empty response]").dim()),
    }
}

/// Print a coloured line diff of two JSON documents
pub fn print_json_diff(previous: &serde_json::Value, next: &serde_json::Value) {
    let old = serde_json::to_string_pretty(previous).unwrap_or_default();
    let new = serde_json::to_string_pretty(next).unwrap_or_default();

    println!("Diff: (green additions, red removals)");
    if old == new {
        println!("{}", style("[No detected change]").dim());
        return;
    }

    for line in diff_lines(&old, &new) {
        match line {
            DiffLine::Same(text) => println!("  {}", style(text).dim()),
            DiffLine::Added(text) => println!("{} {}", style("+").green(), style(text).green()),
            DiffLine::Removed(text) => println!("{} {}", style("-").red(), style(text).red()),
        }
    }
}

/// Print a warning line
pub fn print_warning(message: &str) {
    eprintln!("{} {message}", style("Warning:").yellow().bold());
}

/// Print an error line
pub fn print_error(message: &str) {
    eprintln!("{} {message}", style("Error:").red().bold());
}
