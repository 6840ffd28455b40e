//! Overlapping word-window chunker.
//!
//! Splits text on whitespace and emits one window of `window` words every
//! `stride` words. The last windows of a page may be shorter than `window`.

use crate::config::ChunkingConfig;

/// Split `text` into overlapping word windows joined by single spaces.
///
/// Window starts are `0, stride, 2 * stride, ...` while the start is below
/// the word count, so whitespace-only text yields no windows.
pub fn word_windows(text: &str, config: ChunkingConfig) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let stride = config.stride.max(1);

    (0..words.len())
        .step_by(stride)
        .map(|start| {
            let end = start.saturating_add(config.window).min(words.len());
            words[start..end].join(" ")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_empty_and_whitespace_text() {
        let config = ChunkingConfig::default();
        assert!(word_windows("", config).is_empty());
        assert!(word_windows("  \n\t  ", config).is_empty());
    }

    #[test]
    fn test_250_words_yield_three_windows() {
        let chunks = word_windows(&numbered_words(250), ChunkingConfig::default());
        assert_eq!(chunks.len(), 3);

        let lens: Vec<usize> = chunks.iter().map(|c| c.split(' ').count()).collect();
        assert_eq!(lens, vec![110, 110, 50]);

        assert!(chunks[0].starts_with("w0 "));
        assert!(chunks[1].starts_with("w100 "));
        assert!(chunks[2].starts_with("w200 "));
        assert!(chunks[2].ends_with("w249"));
    }

    #[test]
    fn test_consecutive_windows_share_overlap() {
        let chunks = word_windows(&numbered_words(250), ChunkingConfig::default());
        let first: Vec<&str> = chunks[0].split(' ').collect();
        let second: Vec<&str> = chunks[1].split(' ').collect();
        assert_eq!(&first[100..], &second[..10]);
    }

    #[test]
    fn test_short_page_is_one_window() {
        let chunks = word_windows("just a few words here", ChunkingConfig::default());
        assert_eq!(chunks, vec!["just a few words here".to_string()]);
    }

    #[test]
    fn test_whitespace_is_normalized() {
        let chunks = word_windows("  alpha\n\nbeta\t gamma  ", ChunkingConfig::default());
        assert_eq!(chunks, vec!["alpha beta gamma".to_string()]);
    }

    #[test]
    fn test_exact_stride_multiple() {
        let chunks = word_windows(&numbered_words(200), ChunkingConfig::default());
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].split(' ').count(), 100);
    }

    #[test]
    fn test_custom_window_and_stride() {
        let config = ChunkingConfig { window: 3, stride: 2 };
        let chunks = word_windows("a b c d e", config);
        assert_eq!(chunks, vec!["a b c", "c d e", "e"]);
    }

    #[test]
    fn test_huge_window_runs_to_end_of_page() {
        let config = ChunkingConfig {
            window: usize::MAX,
            stride: 100,
        };
        assert!(config.validate().is_ok());

        let chunks = word_windows(&numbered_words(150), config);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].split(' ').count(), 150);
        assert!(chunks[1].starts_with("w100 "));
        assert!(chunks[1].ends_with("w149"));
    }
}
