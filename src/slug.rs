/// Slug derivation for shareable snippets
use uuid::Uuid;

/// Turn a title into a URL-safe slug
///
/// Algorithm:
/// 1. Lowercase the title
/// 2. Keep ASCII letters and digits
/// 3. Collapse every other run of characters into a single "-"
/// 4. Drop leading and trailing "-"
///
/// Examples:
/// - "My Snippet!!" → "my-snippet"
/// - "  Rust: Iterators & Closures " → "rust-iterators-closures"
/// - "!!!" → ""
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Slug for a public snippet; titles with nothing sluggable get a random one
pub fn slug_for_title(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        let id = Uuid::new_v4().simple().to_string();
        format!("snippet-{}", &id[..8])
    } else {
        slug
    }
}
