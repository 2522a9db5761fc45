//! Line addressing: content <-> line sequence <-> line-number-keyed map.
//!
//! Lines are split strictly on `\n`. A trailing `\r` stays part of its line,
//! so CRLF files round-trip byte for byte.

use std::collections::BTreeMap;

/// Line number (decimal string, 1-based) to line content.
///
/// This is also the JSON wire format of a patch: `{"2": "new text"}`.
pub type LineMap = BTreeMap<String, String>;

/// Split content into its line sequence.
///
/// Empty content is a single empty line, and a trailing newline produces a
/// trailing empty line. Joining the result with `\n` restores the input.
pub fn split_lines(content: &str) -> Vec<&str> {
    content.split('\n').collect()
}

/// Join a line sequence back into content.
pub fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut out = String::with_capacity(lines.iter().map(|l| l.as_ref().len() + 1).sum());
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(line.as_ref());
    }
    out
}

/// Convert content into a line map keyed by 1-based line number.
pub fn to_line_map(content: &str) -> LineMap {
    split_lines(content)
        .into_iter()
        .enumerate()
        .map(|(i, line)| ((i + 1).to_string(), line.to_string()))
        .collect()
}

/// Rebuild content from a line map.
///
/// Keys are ordered numerically, not lexically. Keys that do not parse as an
/// integer are dropped. Keys that parse to the same number (`"2"`, `"02"`)
/// are kept in lexical key order.
pub fn from_line_map(map: &LineMap) -> String {
    let mut numbered: Vec<(i64, &str)> = map
        .iter()
        .filter_map(|(key, line)| parse_line_key(key).map(|n| (n, line.as_str())))
        .collect();

    // Stable: equal numbers keep the map's lexical order
    numbered.sort_by_key(|(n, _)| *n);

    let lines: Vec<&str> = numbered.into_iter().map(|(_, line)| line).collect();
    join_lines(&lines)
}

/// Parse a decimal line key. Surrounding whitespace is not accepted.
pub fn parse_line_key(key: &str) -> Option<i64> {
    key.parse::<i64>().ok()
}
