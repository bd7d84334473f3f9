/// Snippet list with search, tag filter and expandable cards
use crate::language::file_extension;
use crate::operations::{collect_tags, filter_snippets};
use crate::snippet::Snippet;
use crate::ui::bridge::copy_to_clipboard;
use crate::ui::editor::CodeEditor;
use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct SnippetListProps {
    pub snippets: Vec<Snippet>,
    pub busy: bool,
    pub on_delete: Callback<String>,
}

#[function_component(SnippetList)]
pub fn snippet_list(props: &SnippetListProps) -> Html {
    let query = use_state(String::new);
    let tag = use_state(|| None::<String>);
    let tags = collect_tags(&props.snippets);

    // Drop the filter once no snippet carries the tag
    {
        let tag = tag.clone();
        use_effect_with(tags.clone(), move |tags| {
            if tag.is_some() && selected_tag(tags, tag.as_deref()).is_none() {
                tag.set(None);
            }
        });
    }

    if props.snippets.is_empty() {
        return html! {
            <div class="empty-state">
                <p>{"No snippets yet. Save your first one with New Snippet."}</p>
            </div>
        };
    }

    let on_query = {
        let query = query.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                query.set(input.value());
            }
        })
    };

    let on_tag = {
        let tag = tag.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                let value = select.value();
                tag.set(if value.is_empty() { None } else { Some(value) });
            }
        })
    };

    let active_tag = selected_tag(&tags, tag.as_deref());
    let visible = filter_snippets(&props.snippets, &query, active_tag);

    html! {
        <div class="snippet-list">
            <div class="list-filters">
                <input
                    type="search"
                    class="form-input"
                    placeholder="Search snippets..."
                    value={(*query).clone()}
                    oninput={on_query}
                />
                if !tags.is_empty() {
                    <select class="form-input" onchange={on_tag}>
                        <option value="" selected={active_tag.is_none()}>{"All tags"}</option>
                        { for tags.iter().map(|t| html! {
                            <option value={t.clone()} selected={active_tag == Some(t.as_str())}>
                                {t}
                            </option>
                        }) }
                    </select>
                }
            </div>

            if visible.is_empty() {
                <p class="empty-state">{"No snippets match."}</p>
            }

            { for visible.into_iter().map(|snippet| {
                let key = snippet.id.clone();
                html! {
                    <SnippetCard
                        {key}
                        {snippet}
                        busy={props.busy}
                        on_delete={props.on_delete.clone()}
                    />
                }
            }) }
        </div>
    }
}

/// The chosen tag, if any snippet still carries it
fn selected_tag<'a>(tags: &[String], chosen: Option<&'a str>) -> Option<&'a str> {
    chosen.filter(|chosen| tags.iter().any(|t| t == chosen))
}

#[derive(Properties, PartialEq)]
pub struct SnippetCardProps {
    pub snippet: Snippet,
    pub busy: bool,
    pub on_delete: Callback<String>,
}

#[function_component(SnippetCard)]
pub fn snippet_card(props: &SnippetCardProps) -> Html {
    let expanded = use_state(|| false);
    let copied = use_state(|| false);
    let snippet = &props.snippet;

    let on_toggle = {
        let expanded = expanded.clone();
        Callback::from(move |_: MouseEvent| expanded.set(!*expanded))
    };

    let on_copy = {
        let code = snippet.code.clone();
        let copied = copied.clone();
        Callback::from(move |_| {
            let code = code.clone();
            let copied = copied.clone();
            spawn_local(async move {
                match copy_to_clipboard(&code).await {
                    Ok(()) => copied.set(true),
                    Err(e) => log::error!("{}", e),
                }
            });
        })
    };

    let on_delete = {
        let id = snippet.id.clone();
        props.on_delete.reform(move |_| id.clone())
    };

    html! {
        <div class="snippet-card">
            <div class="snippet-card-header" onclick={on_toggle}>
                <span class="snippet-title">{&snippet.title}</span>
                <span class="snippet-language" title={format!(".{}", file_extension(&snippet.language))}>
                    {&snippet.language}
                </span>
                <span class="snippet-date">{snippet.created_date()}</span>
            </div>

            if !snippet.tags.is_empty() {
                <div class="snippet-tags">
                    { for snippet.tags.iter().map(|t| html! {
                        <span class="snippet-tag">{t}</span>
                    }) }
                </div>
            }

            if *expanded {
                <CodeEditor value={snippet.code.clone()} language={snippet.language.clone()} read_only={true} />
                if let Some(notes) = snippet.notes.as_ref().filter(|n| !n.is_empty()) {
                    <p class="snippet-notes">{notes}</p>
                }
                <div class="snippet-actions">
                    <Button onclick={on_copy} variant={ButtonVariant::Secondary}>
                        { if *copied { "Copied" } else { "Copy" } }
                    </Button>
                    <Button onclick={on_delete} disabled={props.busy} variant={ButtonVariant::Danger}>
                        {"Delete"}
                    </Button>
                </div>
            }
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::remove_by_id;

    fn tagged(id: &str, tags: &[&str]) -> Snippet {
        Snippet {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            title: id.to_string(),
            code: "x".to_string(),
            language: "javascript".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            notes: None,
            is_public: None,
            slug: None,
            views: None,
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
            updated_at: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_selected_tag() {
        let tags = vec!["react".to_string(), "sql".to_string()];

        assert_eq!(selected_tag(&tags, Some("sql")), Some("sql"));
        assert_eq!(selected_tag(&tags, Some("rust")), None);
        assert_eq!(selected_tag(&tags, None), None);
    }

    #[test]
    fn test_tag_filter_cleared_after_last_tagged_snippet_deleted() {
        let snippets = vec![tagged("a", &["react"]), tagged("b", &["sql"])];
        let (remaining, _) = remove_by_id(&snippets, "b");
        let tags = collect_tags(&remaining);

        let active = selected_tag(&tags, Some("sql"));

        assert_eq!(active, None);
        assert_eq!(filter_snippets(&remaining, "", active).len(), 1);
    }
}
