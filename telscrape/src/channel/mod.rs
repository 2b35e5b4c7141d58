//! Channel layer for prompt matching over a text stream.
//!
//! This module handles output accumulation, escape-code stripping and
//! pattern-based prompt detection.

mod buffer;
mod patterns;

pub use buffer::{DEFAULT_SEARCH_DEPTH, PatternBuffer};
pub use patterns::{Literal, PromptMatcher, Trailing, compile_prompt_pattern};
