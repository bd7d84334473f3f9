/// Snippet load/create/delete as the popup runs them
///
/// Each operation takes the list the popup currently shows and hands back the
/// list to show next, so the view never holds a half-applied change.
use crate::backend::Backend;
use crate::error::{DataError, Error};
use crate::operations::{insert_first, remove_by_id, sort_newest_first};
use crate::session::Session;
use crate::snippet::{Snippet, SnippetDraft};
use crate::summarize::{Summarizer, append_summary};

pub async fn load_snippets<B: Backend>(backend: &B, session: &Session) -> Result<Vec<Snippet>, Error> {
    let snippets = backend.list_snippets(session).await?;
    log::debug!("Loaded {} snippets", snippets.len());
    Ok(sort_newest_first(&snippets))
}

/// Append an AI summary to the draft's notes
///
/// The draft is validated first so an empty snippet never leaves the popup.
pub async fn summarize_draft(summarizer: &Summarizer, draft: SnippetDraft) -> Result<SnippetDraft, Error> {
    draft.validate()?;
    let summary = summarizer.summarize(&draft.code, &draft.language).await?;
    Ok(SnippetDraft {
        notes: append_summary(&draft.notes, &summary),
        ..draft
    })
}

pub async fn create_snippet<B: Backend>(
    backend: &B,
    session: Option<&Session>,
    draft: &SnippetDraft,
    current: &[Snippet],
) -> Result<Vec<Snippet>, Error> {
    draft.validate()?;
    let session = session.ok_or(DataError::NotSignedIn)?;
    let new = draft.to_new_snippet(&session.user.id)?;

    let row = backend.insert_snippet(session, &new).await?;
    log::info!("Saved snippet {}", row.id);
    Ok(insert_first(current, row))
}

pub async fn delete_snippet<B: Backend>(
    backend: &B,
    session: Option<&Session>,
    id: &str,
    current: &[Snippet],
) -> Result<Vec<Snippet>, Error> {
    let session = session.ok_or(DataError::NotSignedIn)?;

    backend.delete_snippet(session, id).await?;

    let (remaining, removed) = remove_by_id(current, id);
    if !removed {
        log::warn!("Deleted snippet {} was not in the list", id);
    }
    Ok(remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::{SummarizeError, ValidationError};
    use crate::testing::{FakeBackend, create_test_session};

    fn create_test_draft(title: &str, code: &str) -> SnippetDraft {
        SnippetDraft {
            title: title.to_string(),
            code: code.to_string(),
            language: "javascript".to_string(),
            tags: "utils".to_string(),
            notes: String::new(),
            is_public: false,
        }
    }

    fn seeded_row(id: &str, user_id: &str, created_at: &str) -> Snippet {
        Snippet {
            id: id.to_string(),
            user_id: user_id.to_string(),
            title: id.to_string(),
            code: "let x = 1;".to_string(),
            language: "javascript".to_string(),
            tags: vec![],
            notes: None,
            is_public: None,
            slug: None,
            views: None,
            created_at: created_at.to_string(),
            updated_at: created_at.to_string(),
        }
    }

    #[tokio::test]
    async fn test_load_only_own_snippets_newest_first() {
        let backend = FakeBackend::new();
        backend.seed(seeded_row("old", "user-1", "2024-01-01T00:00:00+00:00"));
        backend.seed(seeded_row("theirs", "user-2", "2024-06-01T00:00:00+00:00"));
        backend.seed(seeded_row("new", "user-1", "2024-03-01T00:00:00+00:00"));

        let snippets = load_snippets(&backend, &create_test_session("user-1")).await.unwrap();

        let ids: Vec<&str> = snippets.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn test_empty_code_makes_no_network_call() {
        let backend = FakeBackend::new();
        let session = create_test_session("user-1");

        let result = create_snippet(&backend, Some(&session), &create_test_draft("Empty", "  "), &[]).await;

        assert_eq!(result, Err(Error::Validation(ValidationError::EmptyCode)));
        assert_eq!(backend.network_calls(), 0);
    }

    #[tokio::test]
    async fn test_created_snippet_comes_first() {
        let backend = FakeBackend::new();
        let session = create_test_session("user-1");
        backend.seed(seeded_row("existing", "user-1", "2024-01-01T00:00:00+00:00"));
        let current = load_snippets(&backend, &session).await.unwrap();

        let updated = create_snippet(&backend, Some(&session), &create_test_draft("Fresh", "let y = 2;"), &current)
            .await
            .unwrap();

        assert_eq!(updated.len(), 2);
        assert_eq!(updated[0].title, "Fresh");
        assert_eq!(updated[0].user_id, "user-1");
        assert_eq!(updated[0].tags, vec!["utils"]);

        // A fresh fetch agrees on the order
        let fetched = load_snippets(&backend, &session).await.unwrap();
        assert_eq!(fetched[0].id, updated[0].id);
    }

    #[tokio::test]
    async fn test_failed_insert_keeps_list() {
        let backend = FakeBackend::new();
        backend.fail_inserts();
        let session = create_test_session("user-1");

        let result = create_snippet(&backend, Some(&session), &create_test_draft("X", "code"), &[]).await;

        assert_eq!(
            result,
            Err(Error::Data(DataError::Insert("permission denied".to_string())))
        );
    }

    #[tokio::test]
    async fn test_create_requires_session() {
        let backend = FakeBackend::new();

        let result = create_snippet(&backend, None, &create_test_draft("X", "code"), &[]).await;

        assert_eq!(result, Err(Error::Data(DataError::NotSignedIn)));
        assert_eq!(backend.network_calls(), 0);
    }

    #[tokio::test]
    async fn test_deleted_snippet_is_gone() {
        let backend = FakeBackend::new();
        let session = create_test_session("user-1");
        backend.seed(seeded_row("keep", "user-1", "2024-01-01T00:00:00+00:00"));
        backend.seed(seeded_row("drop", "user-1", "2024-02-01T00:00:00+00:00"));
        let current = load_snippets(&backend, &session).await.unwrap();

        let updated = delete_snippet(&backend, Some(&session), "drop", &current).await.unwrap();

        assert!(updated.iter().all(|s| s.id != "drop"));
        let fetched = load_snippets(&backend, &session).await.unwrap();
        assert!(fetched.iter().all(|s| s.id != "drop"));
        assert_eq!(fetched.len(), 1);
    }

    #[tokio::test]
    async fn test_summarize_validates_first() {
        let summarizer = Summarizer::from_config(&Config::from_getter(|_| None));

        let result = summarize_draft(&summarizer, create_test_draft("X", "")).await;
        assert_eq!(result, Err(Error::Validation(ValidationError::EmptyCode)));

        let result = summarize_draft(&summarizer, create_test_draft("X", "code")).await;
        assert_eq!(result, Err(Error::Summarize(SummarizeError::NotConfigured)));
    }
}
