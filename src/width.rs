//! Display width helpers for preview labels.
//!
//! Labels handed to the text preview may carry ANSI styling, so widths are
//! measured after stripping escapes.

use unicode_width::UnicodeWidthChar;

/// Compute the display width of a string after stripping ANSI escapes.
pub fn display_width(text: &str) -> usize {
    let clean = strip_ansi_escapes::strip(text);
    let clean_str = String::from_utf8_lossy(&clean);
    unicode_width::UnicodeWidthStr::width(&*clean_str)
}

/// Strip escapes and cut `text` so it occupies at most `width` columns,
/// padding with spaces up to exactly `width`.
pub fn fit_to_width(text: &str, width: usize) -> String {
    let clean = strip_ansi_escapes::strip(text);
    let clean_str = String::from_utf8_lossy(&clean);

    let mut out = String::new();
    let mut used = 0;
    for ch in clean_str.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    while used < width {
        out.push(' ');
        used += 1;
    }
    out
}
