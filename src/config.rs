//! Tunable thresholds for title and heading inference

/// Thresholds for the gibberish detector
#[derive(Debug, Clone, PartialEq)]
pub struct GibberishConfig {
    /// Token count that must be exceeded before the single-character ratio applies
    pub min_tokens: usize,
    /// Fraction of one-character tokens above which text is gibberish
    pub single_char_ratio: f32,
    /// Number of isolated-character runs (`" a b "`) that may occur before text is gibberish
    pub max_isolated_runs: usize,
}

impl Default for GibberishConfig {
    fn default() -> Self {
        Self {
            min_tokens: 5,
            single_char_ratio: 0.4,
            max_isolated_runs: 3,
        }
    }
}

/// Configuration for outline extraction
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineConfig {
    /// Blocks must start below this fraction of the page height (default: 0.10)
    pub header_zone_ratio: f32,
    /// Blocks must end above this fraction of the page height (default: 0.90)
    pub footer_zone_ratio: f32,
    /// Lines with more words are never headings
    pub max_heading_words: usize,
    /// Spans within this distance of the largest size on page 1 form the title
    pub title_size_tolerance: f32,
    /// Number of heading levels to emit, clamped to 1..=3
    pub max_heading_levels: usize,
    /// The native bookmark tree is used when it has more entries than this
    pub min_native_toc_entries: usize,
    /// Ignore page 1 of multi-page documents when looking for headings
    pub skip_first_page: bool,
    pub gibberish: GibberishConfig,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            header_zone_ratio: 0.10,
            footer_zone_ratio: 0.90,
            max_heading_words: 20,
            title_size_tolerance: 0.1,
            max_heading_levels: 3,
            min_native_toc_entries: 3,
            skip_first_page: true,
            gibberish: GibberishConfig::default(),
        }
    }
}

impl OutlineConfig {
    /// Heading levels actually emitted
    pub fn heading_levels(&self) -> usize {
        self.max_heading_levels.clamp(1, crate::model::HeadingLevel::MAX_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_config_default() {
        let config = OutlineConfig::default();
        assert!((config.header_zone_ratio - 0.10).abs() < 0.001);
        assert!((config.footer_zone_ratio - 0.90).abs() < 0.001);
        assert_eq!(config.max_heading_words, 20);
        assert!((config.title_size_tolerance - 0.1).abs() < 0.001);
        assert_eq!(config.min_native_toc_entries, 3);
        assert_eq!(config.gibberish.min_tokens, 5);
        assert!((config.gibberish.single_char_ratio - 0.4).abs() < 0.001);
        assert_eq!(config.gibberish.max_isolated_runs, 3);
    }

    #[test]
    fn test_heading_levels_clamped() {
        let mut config = OutlineConfig::default();
        assert_eq!(config.heading_levels(), 3);
        config.max_heading_levels = 0;
        assert_eq!(config.heading_levels(), 1);
        config.max_heading_levels = 6;
        assert_eq!(config.heading_levels(), 3);
    }
}
