//! Accumulates device text between prompts.
//!
//! Prompt detection looks at the trailing `search_depth` bytes only,
//! never the whole response. For long paged outputs (full interface
//! or ONT tables) this keeps each read O(search_depth).

use std::fmt;

use vte::{Params, Parser, Perform};

use super::patterns::PromptMatcher;

/// Default number of tail bytes searched for prompts.
pub const DEFAULT_SEARCH_DEPTH: usize = 1000;

const READ_HINT: usize = 4096;

/// Buffer for accumulating device output and searching it for prompts.
///
/// Incoming bytes pass through a persistent `vte` parser, so ANSI escape
/// sequences are removed even when a sequence is split across two reads.
/// Carriage returns and other C0 controls are dropped; `\n` and `\t` are
/// kept.
///
/// Blanks written after a cursor-left (`ESC[nD`) and then backed over by
/// another cursor-left are dropped as well. Huawei erases its pagination
/// marker this way, and the marker itself never reaches the output.
pub struct PatternBuffer {
    /// The accumulated, cleaned output.
    buffer: Vec<u8>,

    /// Tail length searched for prompts.
    search_depth: usize,

    /// Escape-sequence parser state carried between `extend` calls.
    parser: Parser,

    /// Overwrite state carried between `extend` calls.
    erase: EraseState,
}

#[derive(Debug, Default)]
struct EraseState {
    /// The cursor was last moved left, so blanks may be erasing text.
    after_cursor_left: bool,

    /// Blanks held back until we know whether they get backed over.
    blanks: usize,
}

/// `vte` performer that keeps printable text only.
struct TextSink<'a> {
    out: &'a mut Vec<u8>,
    erase: &'a mut EraseState,
}

impl TextSink<'_> {
    fn flush_blanks(&mut self) {
        self.out.resize(self.out.len() + self.erase.blanks, b' ');
        self.erase.blanks = 0;
        self.erase.after_cursor_left = false;
    }
}

impl Perform for TextSink<'_> {
    fn print(&mut self, c: char) {
        if c == ' ' && self.erase.after_cursor_left {
            self.erase.blanks += 1;
            return;
        }
        self.flush_blanks();
        let mut utf8 = [0u8; 4];
        self.out.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
    }

    fn execute(&mut self, byte: u8) {
        if byte == b'\n' || byte == b'\t' {
            self.flush_blanks();
            self.out.push(byte);
        }
    }

    fn csi_dispatch(
        &mut self,
        params: &Params,
        _intermediates: &[u8],
        _ignore: bool,
        action: char,
    ) {
        if action != 'D' {
            return;
        }
        let columns = params
            .iter()
            .next()
            .and_then(|param| param.first().copied())
            .filter(|&n| n > 0)
            .unwrap_or(1) as usize;

        if self.erase.blanks > 0 && columns >= self.erase.blanks {
            self.erase.blanks = 0;
        } else {
            self.flush_blanks();
        }
        self.erase.after_cursor_left = true;
    }
}

impl PatternBuffer {
    /// Empty buffer searching the last `search_depth` bytes.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(READ_HINT),
            search_depth,
            parser: Parser::new(),
            erase: EraseState::default(),
        }
    }

    /// Extend the buffer with raw device data, stripping escape codes.
    pub fn extend(&mut self, data: &[u8]) {
        let mut sink = TextSink {
            out: &mut self.buffer,
            erase: &mut self.erase,
        };
        self.parser.advance(&mut sink, data);
    }

    /// Search only the tail of the buffer.
    ///
    /// Returns the end offset of the match within the full buffer.
    pub fn search_tail(&self, matcher: &dyn PromptMatcher) -> Option<usize> {
        let start = self.buffer.len().saturating_sub(self.search_depth);
        matcher
            .find_match(&self.buffer[start..])
            .map(|end| start + end)
    }

    /// Check if the tail contains a match.
    pub fn tail_contains(&self, matcher: &dyn PromptMatcher) -> bool {
        self.search_tail(matcher).is_some()
    }

    /// Drain the text collected so far.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }

    #[cfg(test)]
    fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEPTH)
    }
}

impl fmt::Debug for PatternBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternBuffer")
            .field("len", &self.buffer.len())
            .field("search_depth", &self.search_depth)
            .finish()
    }
}
