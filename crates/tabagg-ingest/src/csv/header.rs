//! Header line analysis: separator detection and field splitting.

/// Comma separator.
pub const COMMA: u8 = b',';

/// Semicolon separator.
pub const SEMICOLON: u8 = b';';

/// Strips a UTF-8 byte order mark from the start of a line.
pub fn strip_bom(line: &str) -> &str {
    line.strip_prefix('\u{feff}').unwrap_or(line)
}

/// Counts `separator` occurrences outside double-quoted sections.
fn count_unquoted(line: &str, separator: char) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c == separator && !in_quotes => count += 1,
            _ => {}
        }
    }
    count
}

/// Chooses the field separator for a delimited file from its header line.
///
/// Semicolon wins only when it occurs strictly more often than comma
/// (outside quotes); every other case, ties included, resolves to comma.
pub fn detect_separator(header_line: &str) -> u8 {
    let line = strip_bom(header_line);
    let commas = count_unquoted(line, ',');
    let semicolons = count_unquoted(line, ';');
    if semicolons > commas { SEMICOLON } else { COMMA }
}

/// Splits a delimited line into trimmed fields, handling quoted values.
pub fn split_fields(line: &str, separator: u8) -> Vec<String> {
    let separator = char::from(separator);
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = strip_bom(line).chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if !in_quotes => {
                in_quotes = true;
            }
            '"' if in_quotes => {
                // Check for escaped quote ("")
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            c if c == separator && !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => {
                current.push(c);
            }
        }
    }

    // Don't forget the last field
    fields.push(current.trim().to_string());
    fields
}
