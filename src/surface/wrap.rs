//! Text wrapping by display width.
//!
//! Breaks at word boundaries when possible and splits overlong words at
//! grapheme boundaries. Widths come from `unicode-width`, so wide CJK and
//! emoji graphemes take two columns.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const TAB: &str = "    ";

/// Wrap `text` into lines no wider than `width` columns.
///
/// Existing line breaks are kept. Whitespace at a wrap point is dropped.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for raw in text.split('\n') {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let expanded;
        let raw = if raw.contains('\t') {
            expanded = raw.replace('\t', TAB);
            expanded.as_str()
        } else {
            raw
        };

        let mut line = String::new();
        let mut used = 0;

        for word in raw.split_word_bounds() {
            let word_width = word.width();

            if used + word_width > width && used > 0 {
                push_trimmed(&mut lines, &mut line);
                used = 0;
                if word.trim().is_empty() {
                    continue;
                }
            }

            if word_width > width {
                for grapheme in word.graphemes(true) {
                    let grapheme_width = grapheme.width();
                    if used + grapheme_width > width && used > 0 {
                        push_trimmed(&mut lines, &mut line);
                        used = 0;
                    }
                    line.push_str(grapheme);
                    used += grapheme_width;
                }
                continue;
            }

            line.push_str(word);
            used += word_width;
        }

        lines.push(line);
    }

    lines
}

fn push_trimmed(lines: &mut Vec<String>, line: &mut String) {
    line.truncate(line.trim_end().len());
    lines.push(std::mem::take(line));
}

/// The part of `text` between display columns `start` and `start + width`.
///
/// A wide grapheme straddling either edge is left out.
pub fn slice_columns(text: &str, start: usize, width: usize) -> String {
    let mut out = String::new();
    let mut column = 0;

    for grapheme in text.graphemes(true) {
        let grapheme_width = grapheme.width();
        if column >= start && column + grapheme_width <= start + width {
            out.push_str(grapheme);
        }
        column += grapheme_width;
        if column >= start + width {
            break;
        }
    }

    out
}
