/// Snippet list operations: ordering, insert, delete, filtering
use crate::snippet::Snippet;

/// Newest first; ties keep their original order
///
/// Timestamps come from one backend in one format, so string order is time order.
pub fn sort_newest_first(snippets: &[Snippet]) -> Vec<Snippet> {
    let mut sorted = snippets.to_vec();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted
}

/// Put a freshly inserted snippet at the top
pub fn insert_first(snippets: &[Snippet], snippet: Snippet) -> Vec<Snippet> {
    let id = snippet.id.clone();
    let mut updated = Vec::with_capacity(snippets.len() + 1);
    updated.push(snippet);
    updated.extend(snippets.iter().filter(|s| s.id != id).cloned());
    updated
}

/// Drop the snippet with `id`; the flag says whether anything was removed
pub fn remove_by_id(snippets: &[Snippet], id: &str) -> (Vec<Snippet>, bool) {
    let keep: Vec<Snippet> = snippets.iter().filter(|s| s.id != id).cloned().collect();
    let removed = keep.len() < snippets.len();
    (keep, removed)
}

/// Case-insensitive search over title, code and notes, plus an exact tag filter
pub fn filter_snippets(snippets: &[Snippet], query: &str, tag: Option<&str>) -> Vec<Snippet> {
    let query = query.trim().to_lowercase();

    snippets
        .iter()
        .filter(|snippet| query.is_empty() || snippet.matches_query(&query))
        .filter(|snippet| tag.is_none_or(|tag| snippet.tags.iter().any(|t| t == tag)))
        .cloned()
        .collect()
}

/// Every tag in use, in first-seen order
pub fn collect_tags(snippets: &[Snippet]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    snippets
        .iter()
        .flat_map(|s| s.tags.iter())
        .filter(|tag| seen.insert(tag.as_str()))
        .cloned()
        .collect()
}
