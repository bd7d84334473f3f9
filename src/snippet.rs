/// Data structures for Snippet Organizer
use crate::error::ValidationError;
use crate::slug::slug_for_title;
use serde::{Deserialize, Serialize};

/// A row of the `snippets` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snippet {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub code: String,
    pub language: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub views: Option<i64>,
    /// RFC 3339, as written by the backend
    pub created_at: String,
    pub updated_at: String,
}

impl Snippet {
    /// Calendar date of creation ("YYYY-MM-DD")
    pub fn created_date(&self) -> &str {
        self.created_at.get(..10).unwrap_or(&self.created_at)
    }

    pub fn matches_query(&self, query_lower: &str) -> bool {
        self.title.to_lowercase().contains(query_lower)
            || self.code.to_lowercase().contains(query_lower)
            || self
                .notes
                .as_ref()
                .is_some_and(|notes| notes.to_lowercase().contains(query_lower))
    }
}

/// Insert payload; the backend fills id, timestamps and views
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewSnippet {
    pub user_id: String,
    pub title: String,
    pub code: String,
    pub language: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub is_public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

/// What the form holds before submit
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SnippetDraft {
    pub title: String,
    pub code: String,
    pub language: String,
    /// Comma separated, as typed
    pub tags: String,
    pub notes: String,
    pub is_public: bool,
}

impl SnippetDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.code.trim().is_empty() {
            return Err(ValidationError::EmptyCode);
        }
        Ok(())
    }

    /// Validate and build the insert payload for `user_id`
    pub fn to_new_snippet(&self, user_id: &str) -> Result<NewSnippet, ValidationError> {
        self.validate()?;

        let title = self.title.trim().to_string();
        let notes = Some(self.notes.trim().to_string()).filter(|n| !n.is_empty());
        let slug = self.is_public.then(|| slug_for_title(&title));

        Ok(NewSnippet {
            user_id: user_id.to_string(),
            title,
            code: self.code.clone(),
            language: self.language.clone(),
            tags: split_tags(&self.tags),
            notes,
            is_public: self.is_public,
            slug,
        })
    }
}

/// Split "a, b,,c" into ["a", "b", "c"], dropping blanks and repeats
pub fn split_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}
