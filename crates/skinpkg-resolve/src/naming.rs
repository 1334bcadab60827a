//! Filename conventions: `Name (TAG).png` and friends.

use std::path::Path;

/// Split a base name of the form `Name (TAG)` into `("Name", "TAG")`.
///
/// `(TAG)` alone yields an empty name. Returns `None` when there is no
/// trailing parenthesized group or the tag is empty.
#[must_use]
pub fn split_tag(stem: &str) -> Option<(&str, &str)> {
    let stem = stem.trim_end();
    let inner = stem.strip_suffix(')')?;
    let open = inner.rfind('(')?;
    let tag = inner[open + 1..].trim();
    if tag.is_empty() {
        return None;
    }
    Some((inner[..open].trim(), tag))
}

/// Whether `name` has a `.png` extension (any case).
#[must_use]
pub fn is_png(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

/// File name without its final extension.
#[must_use]
pub fn stem(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_tag_named() {
        assert_eq!(split_tag("Game Boy (GB)"), Some(("Game Boy", "GB")));
    }

    #[test]
    fn split_tag_bare_tag() {
        assert_eq!(split_tag("(MD)"), Some(("", "MD")));
    }

    #[test]
    fn split_tag_uses_last_group() {
        assert_eq!(
            split_tag("Sega (Japan) Mega Drive (MD)"),
            Some(("Sega (Japan) Mega Drive", "MD"))
        );
    }

    #[test]
    fn split_tag_rejects_untagged_and_empty() {
        assert_eq!(split_tag("Root"), None);
        assert_eq!(split_tag("Thing ()"), None);
    }

    #[test]
    fn png_detection_is_case_insensitive() {
        assert!(is_png("a.PNG"));
        assert!(!is_png("a.jpg"));
        assert_eq!(stem("Game Boy (GB).png"), "Game Boy (GB)");
    }
}
