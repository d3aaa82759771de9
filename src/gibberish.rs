//! Detection of garbled text produced by broken glyph extraction
//!
//! Fonts without usable encodings often come out one character at a time
//! ("T h e  S c o p e"). Such lines must never become titles or headings.

use crate::config::GibberishConfig;
use once_cell::sync::Lazy;
use regex::Regex;

/// Two isolated word characters, each surrounded by whitespace
static ISOLATED_CHAR_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s\w\s\w\s").unwrap());

/// Check whether `text` looks like an extraction artifact, using default thresholds
pub fn is_gibberish(text: &str) -> bool {
    is_gibberish_with(text, &GibberishConfig::default())
}

/// Check whether `text` looks like an extraction artifact
pub fn is_gibberish_with(text: &str, config: &GibberishConfig) -> bool {
    has_excess_single_char_tokens(text, config)
        || isolated_char_runs(text) > config.max_isolated_runs
}

fn has_excess_single_char_tokens(text: &str, config: &GibberishConfig) -> bool {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() <= config.min_tokens {
        return false;
    }

    let single = tokens.iter().filter(|t| t.chars().count() == 1).count();
    single as f32 / tokens.len() as f32 > config.single_char_ratio
}

/// Count non-overlapping runs of isolated characters
fn isolated_char_runs(text: &str) -> usize {
    ISOLATED_CHAR_RUN_RE.find_iter(text).count()
}
