use crate::properties::Properties;

/// Parses properties text into a [`Properties`] document.
///
/// Never fails. Blank lines are dropped, lines starting with `#` are kept as comments and
/// everything else is read as a property. The key ends at the first `=` or `:` that is not
/// escaped with a backslash; a line without a separator becomes a key with an empty value.
pub fn parse(text: &str) -> Properties {
    let mut properties = Properties::new();

    for line in text.split('\n') {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('#') {
            properties.push_comment(line.to_string());
            continue;
        }

        let (key, value) = match find_separator(line) {
            Some(position) => (trim_key(&line[..position]), line[position + 1..].trim()),
            None => (trim_key(strip_dangling_escape(line)), ""),
        };
        properties.push_property(key.to_string(), value.to_string());
    }

    properties
}

/// Byte position of the first `=` or `:` not preceded by an odd number of backslashes.
fn find_separator(line: &str) -> Option<usize> {
    let mut backslashes = 0;
    for (position, c) in line.char_indices() {
        match c {
            '\\' => backslashes += 1,
            '=' | ':' if backslashes % 2 == 0 => return Some(position),
            _ => backslashes = 0,
        }
    }
    None
}

fn trailing_backslashes(text: &str) -> usize {
    text.chars().rev().take_while(|&c| c == '\\').count()
}

/// Trims a key, except for a trailing whitespace character escaped by a backslash.
fn trim_key(raw: &str) -> &str {
    let raw = raw.trim_start();
    let trimmed = raw.trim_end();
    if trailing_backslashes(trimmed) % 2 == 0 {
        return trimmed;
    }

    match raw[trimmed.len()..].chars().next() {
        Some(escaped) => &raw[..trimmed.len() + escaped.len_utf8()],
        None => trimmed,
    }
}

// a lone backslash at the end of a key would escape the `=` written after it
fn strip_dangling_escape(key: &str) -> &str {
    if trailing_backslashes(key) % 2 == 1 {
        &key[..key.len() - 1]
    } else {
        key
    }
}

/// Replaces line breaks with a space, so the text stays on one line when written out.
pub(crate) fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace('\n', " ")
}

/// Brings a key into the form [`parse`] stores it in.
///
/// Unescaped `=` and `:` and a leading `#` get a backslash, and a trailing lone backslash is
/// doubled. Keys read from a file already have this form and come back unchanged.
pub(crate) fn escape_key(key: &str) -> String {
    let key = single_line(key);
    let key = trim_key(&key);

    let mut escaped = String::with_capacity(key.len());
    let mut backslashes = 0;
    for c in key.chars() {
        let needs_escape = match c {
            '=' | ':' => backslashes % 2 == 0,
            '#' => escaped.is_empty(),
            _ => false,
        };
        if needs_escape {
            escaped.push('\\');
        }
        escaped.push(c);
        backslashes = if c == '\\' { backslashes + 1 } else { 0 };
    }
    if backslashes % 2 == 1 {
        escaped.push('\\');
    }
    escaped
}
