use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub mod parser;
pub mod storage;

pub use parser::parse;
pub use storage::{FileStorage, Filesystem, load, load_from};

/// A single non-blank line of a properties file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Trimmed comment text, including the leading `#`
    Comment(String),
    Property { key: String, value: String },
}

impl Line {
    pub fn key(&self) -> Option<&str> {
        match self {
            Line::Comment(_) => None,
            Line::Property { key, .. } => Some(key),
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Line::Comment(_) => None,
            Line::Property { value, .. } => Some(value),
        }
    }
}

impl Display for Line {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Line::Comment(text) => write!(f, "{text}"),
            Line::Property { key, value } => write!(f, "{key}={value}"),
        }
    }
}

/// An ordered, editable properties document.
///
/// Lines keep their original order. Lookups go through an index that points at the most
/// recently added property line for every key, so with duplicate keys the last one wins.
/// Keys and values are stored trimmed, and values are stored as text: anything passed to
/// [`Properties::set`] or [`Properties::add_property`] is written in its [`ToString`] form.
/// Keys are stored the way they appear in the file, so `=`, `:` and a leading `#` in a key
/// are escaped with a backslash on write. Line breaks in keys, values and comments are
/// replaced with a space.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    lines: Vec<Line>,
    index: HashMap<String, usize>,
}

// line breaks would split the value over several lines of the file
fn clean_value(value: &str) -> String {
    parser::single_line(value).trim().to_string()
}

/// Creates an empty properties document.
pub fn create_property_file() -> Properties {
    Properties::new()
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of the last property line defining `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.index
            .get(&parser::escape_key(key))
            .and_then(|&position| self.lines[position].value())
    }

    /// Parses the value of `key` into `T`. `None` when the key is absent.
    pub fn get_as<T: FromStr>(&self, key: &str) -> Option<Result<T, T::Err>> {
        self.get(key).map(str::parse)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(&parser::escape_key(key))
    }

    /// Replaces the value of `key` in place, or appends a new property line if it is not
    /// defined yet.
    pub fn set(&mut self, key: &str, value: impl ToString) {
        let key = parser::escape_key(key);
        let value = clean_value(&value.to_string());

        match self.index.get(&key) {
            Some(&position) => {
                if let Line::Property { value: old, .. } = &mut self.lines[position] {
                    *old = value;
                }
            }
            None => self.push_property(key, value),
        }
    }

    /// Always appends a new property line, even if `key` is already defined. Later lookups
    /// see the new value, while the older line is kept and still gets written out.
    pub fn add_property(&mut self, key: &str, value: impl ToString) {
        self.push_property(parser::escape_key(key), clean_value(&value.to_string()));
    }

    /// Appends a comment line. A `#` is prepended if the text does not start with one.
    pub fn add_comment(&mut self, text: &str) {
        let text = parser::single_line(text);
        let text = text.trim();
        let text = if text.starts_with('#') {
            text.to_string()
        } else {
            format!("# {text}").trim().to_string()
        };
        self.lines.push(Line::Comment(text));
    }

    fn push_property(&mut self, key: String, value: String) {
        self.index.insert(key.clone(), self.lines.len());
        self.lines.push(Line::Property { key, value });
    }

    fn push_comment(&mut self, text: String) {
        self.lines.push(Line::Comment(text));
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Number of lines, comments included.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Iterates over every `(key, value)` pair in file order, duplicates included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.lines.iter().filter_map(|line| match line {
            Line::Property { key, value } => Some((key.as_str(), value.as_str())),
            Line::Comment(_) => None,
        })
    }

    pub fn comments(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| match line {
            Line::Comment(text) => Some(text.as_str()),
            Line::Property { .. } => None,
        })
    }

    /// Serializes the document into its normal form: one `key=value` or comment per line,
    /// no blank lines, and every line terminated by `\n`.
    pub fn stringify(&self) -> String {
        self.to_string()
    }
}

impl Display for Properties {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

impl FromStr for Properties {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(parse(s))
    }
}
