//! URL-safe slug generation.

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

static NON_SLUG_CHARS: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"[^a-z0-9]+").unwrap()
});

/// Maximum length of the base slug before any uniqueness suffix.
const MAX_SLUG_LEN: usize = 80;

/// Convert a title into a lowercase, hyphen-separated, URL-safe slug.
///
/// Runs of non-alphanumeric characters collapse into single hyphens and
/// leading/trailing hyphens are stripped. An empty result (e.g. an
/// all-punctuation title) falls back to `"untitled"`.
#[must_use]
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let slug = NON_SLUG_CHARS.replace_all(&lower, "-");
    let slug = slug.trim_matches('-');

    let mut slug = slug.to_string();
    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        if let Some(cut) = slug.rfind('-') {
            slug.truncate(cut);
        }
    }

    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// Slugify a title and append a short random suffix.
///
/// Used when the plain slug is already taken; the 6-char suffix keeps
/// slugs readable while making collisions vanishingly unlikely.
#[must_use]
pub fn slugify_unique(title: &str) -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();
    format!("{}-{}", slugify(title), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Rust & Writing  "), "rust-writing");
        assert_eq!(slugify("Already-Slugged"), "already-slugged");
    }

    #[test]
    fn test_slugify_unicode_and_empty() {
        assert_eq!(slugify("!!!"), "untitled");
        assert_eq!(slugify(""), "untitled");
    }

    #[test]
    fn test_slugify_truncates_long_titles() {
        let long = "word ".repeat(40);
        let slug = slugify(&long);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn test_slugify_unique_appends_suffix() {
        let a = slugify_unique("My Title");
        let b = slugify_unique("My Title");
        assert!(a.starts_with("my-title-"));
        assert_ne!(a, b);
    }
}
