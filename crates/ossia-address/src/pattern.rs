//! OSC address pattern compilation.
//!
//! A pattern is split on `/` like an address. Each segment is one of:
//! - a plain name, matched literally;
//! - a brace alternation of plain names (`{left,right}`), matched literally
//!   and creatable;
//! - anything else, compiled to an anchored regular expression.
//!
//! Inside regex segments the OSC forms are translated first: `{a,b}` becomes
//! `(?:a|b)`, `[!...]` becomes `[^...]` and a `*` not preceded by `.`
//! becomes `.*`.

use regex::Regex;
use thiserror::Error;

use crate::validate::{validate_address, ValidationError};

/// Characters that turn a segment into a regular expression.
const META: &[char] = &['*', '?', '[', ']', '{', '}', '(', ')', '+', '|', '^', '$', '\\'];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("unbalanced braces in segment {0:?}")]
    UnbalancedBraces(String),
    #[error("invalid regex in segment {segment:?}: {message}")]
    InvalidRegex { segment: String, message: String },
    #[error(transparent)]
    Address(#[from] ValidationError),
}

/// One compiled pattern segment.
#[derive(Debug, Clone)]
pub enum Segment {
    Literal(String),
    Alternatives(Vec<String>),
    Regex(Regex),
}

impl Segment {
    /// Compile a single segment.
    pub fn parse(segment: &str) -> Result<Self, PatternError> {
        if !segment.contains(META) {
            return Ok(Segment::Literal(segment.to_owned()));
        }
        if let Some(names) = literal_alternatives(segment) {
            return Ok(Segment::Alternatives(names));
        }
        let source = translate(segment)?;
        Regex::new(&format!("^(?:{source})$"))
            .map(Segment::Regex)
            .map_err(|e| PatternError::InvalidRegex {
                segment: segment.to_owned(),
                message: e.to_string(),
            })
    }

    /// Test a node name against this segment.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Segment::Literal(literal) => literal == name,
            Segment::Alternatives(names) => names.iter().any(|n| n == name),
            Segment::Regex(re) => re.is_match(name),
        }
    }

    /// Names this segment can create when missing. Empty for regex segments.
    pub fn creatable_names(&self) -> &[String] {
        match self {
            Segment::Literal(literal) => std::slice::from_ref(literal),
            Segment::Alternatives(names) => names,
            Segment::Regex(_) => &[],
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Segment::Literal(_))
    }
}

/// A compiled address pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    segments: Vec<Segment>,
}

impl Pattern {
    /// Compile a pattern string.
    ///
    /// # Errors
    ///
    /// Fails on an over-long address, unbalanced braces or a segment that is
    /// not a valid regular expression.
    ///
    /// # Example
    ///
    /// ```
    /// use ossia_address::Pattern;
    ///
    /// let p = Pattern::parse("/mixer/{left,right}/gain").unwrap();
    /// assert_eq!(p.segments().len(), 3);
    /// assert!(p.matches_path(&["mixer", "left", "gain"]));
    /// assert!(!p.matches_path(&["mixer", "center", "gain"]));
    /// ```
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        validate_address(pattern)?;
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(Segment::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Check a full path of names against the pattern.
    pub fn matches_path<S: AsRef<str>>(&self, path: &[S]) -> bool {
        self.segments.len() == path.len()
            && self
                .segments
                .iter()
                .zip(path)
                .all(|(segment, name)| segment.matches(name.as_ref()))
    }

    /// True when every segment is a plain name.
    pub fn is_literal(&self) -> bool {
        self.segments.iter().all(Segment::is_literal)
    }
}

/// Check if an address contains any pattern syntax.
///
/// # Example
///
/// ```
/// use ossia_address::is_pattern;
///
/// assert!(is_pattern("/g/.*"));
/// assert!(is_pattern("/a/{b,c}"));
/// assert!(!is_pattern("/a/foo.1"));
/// ```
pub fn is_pattern(address: &str) -> bool {
    address.contains(META)
}

/// `{a,b,c}` where every alternative is a plain name.
fn literal_alternatives(segment: &str) -> Option<Vec<String>> {
    let inner = segment.strip_prefix('{')?.strip_suffix('}')?;
    let names: Vec<String> = inner.split(',').map(str::to_owned).collect();
    let plain = names.iter().all(|n| !n.is_empty() && !n.contains(META));
    plain.then_some(names)
}

fn translate(segment: &str) -> Result<String, PatternError> {
    let mut out = String::with_capacity(segment.len() + 8);
    let mut in_braces = false;
    let mut in_class = false;
    let mut chars = segment.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ']' if in_class => {
                in_class = false;
                out.push(']');
            }
            other if in_class => out.push(other),
            '{' if !in_braces => {
                in_braces = true;
                out.push_str("(?:");
            }
            '{' => return Err(PatternError::UnbalancedBraces(segment.to_owned())),
            '}' if in_braces => {
                in_braces = false;
                out.push(')');
            }
            '}' => return Err(PatternError::UnbalancedBraces(segment.to_owned())),
            ',' if in_braces => out.push('|'),
            '[' => {
                in_class = true;
                if chars.peek() == Some(&'!') {
                    chars.next();
                    out.push_str("[^");
                } else {
                    out.push('[');
                }
            }
            '*' => {
                if !out.ends_with('.') {
                    out.push('.');
                }
                out.push('*');
            }
            other => out.push(other),
        }
    }
    if in_braces {
        return Err(PatternError::UnbalancedBraces(segment.to_owned()));
    }
    Ok(out)
}
