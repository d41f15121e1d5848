/// Terminal status lines for the extract and rename commands
use colored::*;

enum Marker {
    Done,
    Warn,
    Step,
}

impl Marker {
    fn glyph(&self) -> ColoredString {
        match self {
            Marker::Done => "✓".green(),
            Marker::Warn => "⚠".yellow(),
            Marker::Step => "▶".cyan(),
        }
    }
}

fn status(marker: Marker, message: &str) {
    println!("{} {}", marker.glyph(), message);
}

pub fn section_header(title: &str) {
    println!("\n{}", title.bold().cyan());
}

pub fn success(message: &str) {
    status(Marker::Done, message);
}

pub fn warning(message: &str) {
    status(Marker::Warn, message);
}

pub fn action(message: &str) {
    status(Marker::Step, message);
}

/// One branch of a summary tree; `last` closes the tree.
pub fn tree_item(last: bool, label: &str, value: Option<&str>) {
    let branch = (if last { "└─" } else { "├─" }).dimmed();
    match value {
        Some(value) => println!("{} {}: {}", branch, label, value),
        None => println!("{} {}", branch, label),
    }
}

/// Counts in summaries are grouped by thousands: `12345` -> `12,345`
pub fn format_number(n: usize) -> String {
    let digits = n.to_string();
    let head = digits.len() % 3;
    let mut groups: Vec<&str> = Vec::new();
    if head > 0 {
        groups.push(&digits[..head]);
    }
    groups.extend(
        digits.as_bytes()[head..]
            .chunks(3)
            .filter_map(|chunk| std::str::from_utf8(chunk).ok()),
    );
    groups.join(",")
}
