//! Keep client-controlled text from breaking log records.
//!
//! Datagram payloads can hold anything, including newlines and terminal
//! escapes. Everything that reaches a log line from the network goes through
//! [`escape_log`] or [`payload_preview`] first.

use std::fmt::Write;

const PREVIEW_CHARS: usize = 120;

/// Escape control characters and backslashes so the result is one line.
/// Long input is cut with an ellipsis.
pub fn escape_log(s: &str) -> String {
    escape_log_capped(s, PREVIEW_CHARS)
}

pub fn escape_log_capped(s: &str, max_chars: usize) -> String {
    let mut out = String::with_capacity(s.len().min(max_chars) + 4);
    for (count, ch) in s.chars().enumerate() {
        if count == max_chars {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// First line of an outbound message plus how many lines were left out,
/// e.g. `DISPLAY (+21 lines)` for a map refresh.
pub fn payload_preview(text: &str) -> String {
    let mut lines = text.lines();
    let head = escape_log(lines.next().unwrap_or(""));
    match lines.count() {
        0 => head,
        rest => format!("{} (+{} lines)", head, rest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_control_characters() {
        assert_eq!(escape_log("PLAY a\nb\r\tc"), "PLAY a\\nb\\r\\tc");
        assert_eq!(escape_log("x\u{1b}[2J"), "x\\x1B[2J");
        assert_eq!(escape_log("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn long_input_is_cut() {
        let long = "k".repeat(500);
        let esc = escape_log(&long);
        assert_eq!(esc.chars().count(), PREVIEW_CHARS + 1);
        assert!(esc.ends_with('…'));
        assert_eq!(escape_log_capped("abcdef", 3), "abc…");
    }

    #[test]
    fn preview_counts_hidden_lines() {
        assert_eq!(payload_preview("GOLD 1 2 3"), "GOLD 1 2 3");
        assert_eq!(payload_preview("DISPLAY\n+--+\n|..|\n+--+\n"), "DISPLAY (+3 lines)");
        assert_eq!(payload_preview(""), "");
    }
}
