//! Card text source and word wrapping

use std::path::Path;

use tracing::{debug, trace};

use crate::error::{CardError, Result};
use crate::font::FontMetrics;

/// Read the ordered card texts from a newline-separated UTF-8 file.
///
/// Each line is trimmed; empty lines are kept as empty-text cards. The
/// item count is never padded to fill the last page.
pub fn read_card_lines(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        CardError::Config(format!("cannot read text source '{}': {e}", path.display()))
    })?;
    let lines: Vec<String> = raw.lines().map(|l| l.trim().to_string()).collect();
    debug!(path = %path.display(), count = lines.len(), "loaded card texts");
    Ok(lines)
}

/// Break text into lines that fit within `max_width` points, measuring with
/// real font metrics.
///
/// Explicit newlines are preserved, words are greedily packed, and a single
/// word wider than the line is split at character boundaries.
pub fn wrap_text_with_metrics(
    text: &str,
    max_width: f32,
    font_size: f32,
    metrics: &dyn FontMetrics,
) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }

    let mut all_lines = Vec::new();

    for segment in text.split('\n') {
        if segment.is_empty() {
            all_lines.push(String::new());
            continue;
        }

        let words: Vec<&str> = segment.split_whitespace().collect();

        if words.is_empty() {
            all_lines.push(String::new());
            continue;
        }

        let space_width = metrics.char_width(' ', font_size);
        let mut current_line = String::new();
        let mut current_width: f32 = 0.0;

        for word in words {
            let word_width = metrics.text_width(word, font_size);

            if current_width > 0.0 && current_width + space_width + word_width > max_width {
                all_lines.push(current_line.trim().to_string());
                current_line = word.to_string();
                current_width = word_width;
            } else {
                if !current_line.is_empty() {
                    current_line.push(' ');
                    current_width += space_width;
                }
                current_line.push_str(word);
                current_width += word_width;
            }

            // Handle very long words that exceed max_width
            if word_width > max_width {
                let mut remaining = word;
                while !remaining.is_empty() {
                    let mut split_at_char = 0;
                    let mut accumulated = 0.0;
                    for (i, ch) in remaining.char_indices() {
                        let cw = metrics.char_width(ch, font_size);
                        if accumulated + cw > max_width && split_at_char > 0 {
                            break;
                        }
                        accumulated += cw;
                        split_at_char = i + ch.len_utf8();
                    }
                    if split_at_char == 0 {
                        // Single char wider than max_width, take at least one char
                        split_at_char = remaining
                            .char_indices()
                            .nth(1)
                            .map(|(i, _)| i)
                            .unwrap_or(remaining.len());
                    }
                    let (chunk, rest) = remaining.split_at(split_at_char);
                    if rest.is_empty() {
                        current_line = chunk.to_string();
                        current_width = metrics.text_width(chunk, font_size);
                    } else {
                        all_lines.push(chunk.to_string());
                    }
                    remaining = rest;
                }
            }
        }

        if !current_line.trim().is_empty() {
            all_lines.push(current_line.trim().to_string());
        }
    }

    if all_lines.is_empty() {
        all_lines.push(String::new());
    }

    trace!("wrapped text into {} lines", all_lines.len());
    all_lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::testing::FixedMetrics;

    // FixedMetrics: every char is font_size * 0.5 wide, so at size 10 a
    // 100 pt line holds 20 characters.

    #[test]
    fn test_wrap_splits_long_text() {
        let text = "This is a long piece of text that should be wrapped into multiple lines";
        let lines = wrap_text_with_metrics(text, 100.0, 10.0, &FixedMetrics);
        assert!(lines.len() > 1);
    }

    #[test]
    fn test_empty_text_is_one_empty_line() {
        let lines = wrap_text_with_metrics("", 100.0, 10.0, &FixedMetrics);
        assert_eq!(lines, vec![String::new()]);
    }

    #[test]
    fn test_short_text_stays_on_one_line() {
        let lines = wrap_text_with_metrics("I am enough", 200.0, 10.0, &FixedMetrics);
        assert_eq!(lines, vec!["I am enough".to_string()]);
    }

    #[test]
    fn test_newlines_are_preserved() {
        let lines = wrap_text_with_metrics("Line 1\nLine 2\nLine 3", 200.0, 10.0, &FixedMetrics);
        assert_eq!(lines, vec!["Line 1", "Line 2", "Line 3"]);
    }

    #[test]
    fn test_consecutive_newlines_keep_blank_lines() {
        let lines = wrap_text_with_metrics("Line 1\n\nLine 3", 200.0, 10.0, &FixedMetrics);
        assert_eq!(lines, vec!["Line 1", "", "Line 3"]);
    }

    #[test]
    fn test_long_word_splits_without_panicking() {
        let lines =
            wrap_text_with_metrics("supercalifragilisticexpialidocious", 50.0, 10.0, &FixedMetrics);
        assert!(lines.len() > 1);
        let total: String = lines.join("");
        assert_eq!(total, "supercalifragilisticexpialidocious");
    }

    #[test]
    fn test_multibyte_long_word_splits_at_char_boundaries() {
        let text = "caf\u{00e9}caf\u{00e9}caf\u{00e9}caf\u{00e9}caf\u{00e9}";
        let lines = wrap_text_with_metrics(text, 30.0, 10.0, &FixedMetrics);
        assert!(!lines.is_empty());
        let total: String = lines.join("");
        assert_eq!(total, text);
    }

    #[test]
    fn test_read_card_lines_trims_and_keeps_blanks() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("cardgrid-text-{}.txt", std::process::id()));
        std::fs::write(&path, "  first card \nsecond card\n\nlast card\n").unwrap();
        let lines = read_card_lines(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(lines, vec!["first card", "second card", "", "last card"]);
    }

    #[test]
    fn test_read_card_lines_missing_file_is_config_error() {
        let result = read_card_lines(Path::new("/nonexistent/cards.txt"));
        assert!(matches!(result, Err(CardError::Config(_))));
    }
}
