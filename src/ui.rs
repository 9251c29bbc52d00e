use colored::{ColoredString, Colorize};
use declarative::ApplyResult;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Status symbol for an apply result
pub fn result_symbol(result: &ApplyResult) -> ColoredString {
    match result {
        ApplyResult::NoChange => "○".dimmed(),
        ApplyResult::Created { .. } | ApplyResult::Modified { .. } | ApplyResult::Removed { .. } => {
            "✓".green()
        }
        ApplyResult::Failed { .. } => "✗".red(),
        ApplyResult::Skipped { .. } => "⊘".yellow(),
    }
}

/// One-line detail for an apply result: old and new values, or the cause
pub fn result_detail(result: &ApplyResult) -> String {
    match result {
        ApplyResult::NoChange => String::new(),
        ApplyResult::Created { details } => {
            format!("(absent) → {}", display_value(details.as_deref()))
        }
        ApplyResult::Modified { from, to } => {
            format!("{} → {}", display_value(Some(from)), display_value(Some(to)))
        }
        ApplyResult::Removed { details } => {
            format!("{} → (absent)", display_value(details.as_deref()))
        }
        ApplyResult::Failed { error } => error.clone(),
        ApplyResult::Skipped { reason } => reason.clone(),
    }
}

/// Quote empty values so they stay visible
pub fn display_value(value: Option<&str>) -> String {
    match value {
        Some("") => "\"\"".to_string(),
        Some(v) => v.to_string(),
        None => "(absent)".to_string(),
    }
}
