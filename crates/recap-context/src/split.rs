// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Output chunking at linguistically sensible boundaries.

/// Split markers in preference order. Splits happen immediately after the
/// marker found closest to the length boundary.
const SPLIT_PATTERNS: [&str; 12] = [
    "\n\n", ". ", ".\n", "! ", "?\n", "? ", "!\n", "\n", "; ", ", ", " - ", " ",
];

/// Splits `text` into chunks of at most `max_length` characters each,
/// preferring paragraph and sentence boundaries over hard cuts.
///
/// Whitespace at split points is trimmed: each emitted chunk loses trailing
/// whitespace and the remainder loses leading whitespace. Lengths are
/// counted in characters, so multi-byte text never splits mid-character.
pub fn split_message(text: &str, max_length: usize) -> Vec<String> {
    if text.chars().count() <= max_length {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while remaining.chars().count() > max_length {
        let split_point =
            find_best_split_point(remaining, max_length).unwrap_or_else(|| char_boundary(remaining, max_length));

        let (chunk, rest) = remaining.split_at(split_point);
        chunks.push(chunk.trim_end().to_string());
        remaining = rest.trim_start();
    }

    if !remaining.trim().is_empty() {
        chunks.push(remaining.trim().to_string());
    }

    chunks
}

/// Byte index of the boundary after `max_chars` characters.
fn char_boundary(text: &str, max_chars: usize) -> usize {
    text.char_indices()
        .nth(max_chars)
        .map_or(text.len(), |(i, _)| i)
}

/// Byte index just past the best split marker within the first `max_length`
/// characters, or `None` if no marker occurs in range.
fn find_best_split_point(text: &str, max_length: usize) -> Option<usize> {
    let prefix = &text[..char_boundary(text, max_length)];

    for pattern in SPLIT_PATTERNS {
        if let Some(pos) = prefix.rfind(pattern) {
            return Some(pos + pattern.len());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn short_text_is_a_single_chunk() {
        assert_eq!(split_message("hello", 100), vec!["hello"]);
    }

    #[test]
    fn prefers_paragraph_breaks() {
        let text = "first paragraph here\n\nsecond paragraph follows with more words";
        let chunks = split_message(text, 30);
        assert_eq!(chunks[0], "first paragraph here");
        assert!(chunks[1].starts_with("second paragraph"));
    }

    #[test]
    fn falls_back_to_sentence_boundaries() {
        let text = "One sentence here. Another one follows. And a third for good measure.";
        let chunks = split_message(text, 25);
        assert_eq!(chunks[0], "One sentence here.");
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 25, "{chunk:?}");
        }
    }

    #[test]
    fn hard_splits_an_unbroken_run() {
        let text = "a".repeat(25);
        let chunks = split_message(&text, 10);
        assert_eq!(chunks, vec!["a".repeat(10), "a".repeat(10), "a".repeat(5)]);
    }

    #[test]
    fn hard_split_respects_char_boundaries() {
        let text = "é".repeat(15);
        let chunks = split_message(&text, 10);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 10);
        assert_eq!(chunks[1].chars().count(), 5);
    }

    #[test]
    fn split_point_whitespace_is_trimmed() {
        let text = "alpha beta gamma delta epsilon";
        let chunks = split_message(text, 12);
        for chunk in &chunks {
            assert_eq!(chunk, &chunk.trim().to_string());
        }
    }

    proptest! {
        #[test]
        fn chunks_respect_length_and_preserve_content(
            text in "[a-z .,!?\n-]{0,300}",
            max_length in 1usize..60,
        ) {
            let chunks = split_message(&text, max_length);

            for chunk in &chunks {
                prop_assert!(chunk.chars().count() <= max_length);
            }

            // Only whitespace is dropped at split points: the non-whitespace
            // character sequence survives unchanged.
            let original: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            let rebuilt: String = chunks
                .concat()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            prop_assert_eq!(original, rebuilt);
        }
    }
}
