//! Heading anchor slugs.

use std::collections::HashSet;

/// Convert heading text to a URL-safe slug.
///
/// Lower-cases, keeps alphanumerics, turns whitespace, `-` and `_` into
/// single dashes and drops everything else.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c)
            } else if c.is_whitespace() || c == '-' || c == '_' {
                Some('-')
            } else {
                None
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Hands out unique slugs within one document.
#[derive(Debug, Default)]
pub struct SlugRegistry {
    taken: HashSet<String>,
}

impl SlugRegistry {
    /// Slug for `text`, suffixed `-1`, `-2`, … when already taken.
    pub fn claim(&mut self, text: &str) -> String {
        let base = match slugify(text) {
            s if s.is_empty() => "section".to_string(),
            s => s,
        };

        if self.taken.insert(base.clone()) {
            return base;
        }

        let mut n = 1;
        loop {
            let candidate = format!("{base}-{n}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}
