//! Small text helpers shared by the loop and the observer.

/// Marker appended to shortened text.
pub const ELLIPSIS: &str = "...";

/// Shorten `text` to at most `max_chars` characters, ending in [`ELLIPSIS`]
/// when anything was cut. Counts `char`s, never splits a code point.
///
/// A cap too small to hold the marker cuts without it.
pub fn ellipsize(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    if max_chars <= ELLIPSIS.len() {
        return text.chars().take(max_chars).collect();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(ellipsize("hello", 10), "hello");
        assert_eq!(ellipsize("", 3), "");
    }

    #[test]
    fn long_text_is_cut_on_char_boundaries() {
        let cut = ellipsize("ééééééééé", 6);
        assert_eq!(cut, "ééé...");
        assert_eq!(cut.chars().count(), 6);
    }

    #[test]
    fn tiny_cap_never_exceeds_itself() {
        assert_eq!(ellipsize("abcdef", 0), "");
        assert_eq!(ellipsize("abcdef", 2), "ab");
        assert_eq!(ellipsize("abcdef", 3), "abc");
        assert_eq!(ellipsize("abcdef", 4), "a...");
    }
}
