use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

/// Combining diacritical marks block, U+0300..=U+036F
fn is_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Slugify `title`: strip accents, hyphenate whitespace runs, lowercase.
///
/// Lowercasing runs once over the whole slug so context-dependent mappings
/// (Greek final sigma) see word boundaries.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut in_space = false;

    for c in title.nfd().filter(|c| !is_diacritic(*c)) {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
                in_space = true;
            }
        } else {
            slug.push(c);
            in_space = false;
        }
    }

    slug.to_lowercase()
        .chars()
        .filter(|c| !is_diacritic(*c))
        .collect()
}

/// Post identifier: the slugified title followed by a fresh v4 UUID.
pub fn slug_id(title: &str) -> String {
    format!("{}{}", slugify(title), Uuid::new_v4())
}
