//! Terminal rendering for the status and config commands.

use colored::Colorize;
use serde_json::Value;

const INDENT: &str = "  ";

/// Prints `value` as indented JSON, coloring keys and scalars.
pub fn print_json(value: &Value) {
    println!("{}", render_json(value));
}

/// Renders `value` as indented JSON. Keys are cyan, strings green, numbers
/// yellow, booleans and null magenta.
#[must_use]
pub fn render_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, 0, &mut out);
    out
}

fn write_value(value: &Value, depth: usize, out: &mut String) {
    match value {
        Value::Null => out.push_str(&"null".magenta().to_string()),
        Value::Bool(b) => out.push_str(&b.to_string().magenta().to_string()),
        Value::Number(n) => out.push_str(&n.to_string().yellow().to_string()),
        Value::String(s) => out.push_str(&quoted(s).green().to_string()),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                open_line(i, depth + 1, out);
                write_value(item, depth + 1, out);
            }
            close_line(depth, out);
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                open_line(i, depth + 1, out);
                out.push_str(&quoted(key).cyan().to_string());
                out.push_str(": ");
                write_value(item, depth + 1, out);
            }
            close_line(depth, out);
            out.push('}');
        }
    }
}

fn open_line(index: usize, depth: usize, out: &mut String) {
    if index > 0 {
        out.push(',');
    }
    out.push('\n');
    out.push_str(&INDENT.repeat(depth));
}

fn close_line(depth: usize, out: &mut String) {
    out.push('\n');
    out.push_str(&INDENT.repeat(depth));
}

fn quoted(s: &str) -> String { Value::String(s.to_owned()).to_string() }

/// Shortens a slot URL to `max_chars`, keeping its head and tail. The tail
/// carries the photo id or random token that tells two URLs apart.
#[must_use]
pub fn shorten_url(url: &str, max_chars: usize) -> String {
    let len = url.chars().count();
    if len <= max_chars {
        return url.to_string();
    }
    if max_chars < 3 {
        return "…".to_string();
    }

    let keep = max_chars - 1;
    let tail = keep / 3;
    let head = keep - tail;
    let head: String = url.chars().take(head).collect();
    let tail: String = url.chars().skip(len - tail).collect();
    format!("{head}…{tail}")
}

/// Table cell for a slot's URL; an empty slot renders as a dimmed dash.
#[must_use]
pub fn slot_url_cell(url: Option<&str>, max_chars: usize) -> String {
    url.map_or_else(|| "-".dimmed().to_string(), |url| shorten_url(url, max_chars))
}

/// Table cell for whether a slot holds a URL.
#[must_use]
pub fn slot_state_cell(is_set: bool) -> String {
    if is_set { "set".green().to_string() } else { "empty".yellow().to_string() }
}
