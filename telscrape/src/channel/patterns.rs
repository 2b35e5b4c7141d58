//! Pattern matching utilities for prompt detection.

use memchr::memmem::Finder;
use regex::bytes::Regex;

/// Trait for prompt matching - regex by default, literals via memchr.
pub trait PromptMatcher: Send + Sync {
    /// Returns byte offset where the first match ends, or None if no match.
    fn find_match(&self, data: &[u8]) -> Option<usize>;

    /// Check if the data matches the pattern.
    fn is_match(&self, data: &[u8]) -> bool {
        self.find_match(data).is_some()
    }
}

/// Regex-based prompt matcher (the default implementation).
impl PromptMatcher for Regex {
    fn find_match(&self, data: &[u8]) -> Option<usize> {
        self.find(data).map(|m| m.end())
    }
}

/// Fixed-text matcher for login prompts and pagination markers.
///
/// Device prompts such as `---- More ( Press 'Q' to break ) ----` are full
/// of regex metacharacters, so they are matched literally. An empty literal
/// never matches.
#[derive(Debug, Clone)]
pub struct Literal {
    text: String,
    finder: Finder<'static>,
}

impl Literal {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let finder = Finder::new(text.as_bytes()).into_owned();
        Self { text, finder }
    }

    /// The literal text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Byte offset of the first occurrence in `data`.
    pub fn find(&self, data: &[u8]) -> Option<usize> {
        if self.text.is_empty() {
            return None;
        }
        self.finder.find(data)
    }

    /// Matcher that fires only when the literal ends the data.
    pub fn trailing(&self) -> Trailing<'_> {
        Trailing(self)
    }

    /// Remove every occurrence of the literal from `text`.
    pub fn strip_all(&self, text: &str) -> String {
        if self.text.is_empty() {
            return text.to_string();
        }
        text.replace(self.text.as_str(), "")
    }
}

impl PromptMatcher for Literal {
    fn find_match(&self, data: &[u8]) -> Option<usize> {
        self.find(data).map(|start| start + self.text.len())
    }
}

/// A [`Literal`] that must sit at the end of the data, trailing blanks
/// aside.
///
/// A pagination marker followed by more text is not waiting for a
/// keystroke.
#[derive(Debug, Clone, Copy)]
pub struct Trailing<'a>(&'a Literal);

impl PromptMatcher for Trailing<'_> {
    fn find_match(&self, data: &[u8]) -> Option<usize> {
        let text = self.0.as_str().as_bytes();
        let end = data.trim_ascii_end();
        (!text.is_empty() && end.ends_with(text)).then_some(end.len())
    }
}

/// Compile a shell prompt pattern string into a regex.
///
/// Anchors to end of buffer if no anchor is given. Only spaces and tabs
/// may follow the prompt, so a line that merely ends in the prompt
/// character and is followed by a line break does not end a read.
pub fn compile_prompt_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    let pattern = if pattern.ends_with('$') {
        pattern.to_string()
    } else {
        format!("{}[ \\t]*$", pattern)
    };

    Regex::new(&pattern)
}
