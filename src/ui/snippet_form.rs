/// New snippet form
use crate::language::{DEFAULT_LANGUAGE, detect_language, supported_languages};
use crate::snippet::SnippetDraft;
use crate::ui::editor::CodeEditor;
use patternfly_yew::prelude::*;
use web_sys::{HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub draft: SnippetDraft,
    pub summarize: bool,
}

#[derive(Properties, PartialEq)]
pub struct SnippetFormProps {
    pub busy: bool,
    pub summaries_enabled: bool,
    pub on_submit: Callback<Submission>,
    pub on_cancel: Callback<()>,
}

#[function_component(SnippetForm)]
pub fn snippet_form(props: &SnippetFormProps) -> Html {
    let draft = use_state(|| SnippetDraft {
        language: DEFAULT_LANGUAGE.to_string(),
        ..SnippetDraft::default()
    });
    // Auto-detection stops once the user picks a language
    let language_picked = use_state(|| false);
    let summarize = use_state(|| false);
    let error = use_state(|| None::<String>);

    let on_title = {
        let draft = draft.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                draft.set(SnippetDraft { title: input.value(), ..(*draft).clone() });
            }
        })
    };

    let on_code = {
        let draft = draft.clone();
        let language_picked = language_picked.clone();
        Callback::from(move |code: String| {
            let language = if *language_picked {
                draft.language.clone()
            } else {
                detect_language(&code).to_string()
            };
            draft.set(SnippetDraft { code, language, ..(*draft).clone() });
        })
    };

    let on_language = {
        let draft = draft.clone();
        let language_picked = language_picked.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                language_picked.set(true);
                draft.set(SnippetDraft { language: select.value(), ..(*draft).clone() });
            }
        })
    };

    let on_tags = {
        let draft = draft.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                draft.set(SnippetDraft { tags: input.value(), ..(*draft).clone() });
            }
        })
    };

    let on_notes = {
        let draft = draft.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(textarea) = e.target_dyn_into::<HtmlTextAreaElement>() {
                draft.set(SnippetDraft { notes: textarea.value(), ..(*draft).clone() });
            }
        })
    };

    let on_public = {
        let draft = draft.clone();
        Callback::from(move |e: Event| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                draft.set(SnippetDraft { is_public: input.checked(), ..(*draft).clone() });
            }
        })
    };

    let on_summarize = {
        let summarize = summarize.clone();
        Callback::from(move |e: Event| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                summarize.set(input.checked());
            }
        })
    };

    let on_save = {
        let draft = draft.clone();
        let summarize = summarize.clone();
        let error = error.clone();
        let on_submit = props.on_submit.clone();
        Callback::from(move |_| {
            if let Err(e) = draft.validate() {
                error.set(Some(e.to_string()));
                return;
            }
            error.set(None);
            on_submit.emit(Submission {
                draft: (*draft).clone(),
                summarize: *summarize,
            });
        })
    };

    let languages = supported_languages();

    html! {
        <div class="snippet-form">
            <h2 class="section-title">{"New Snippet"}</h2>

            if let Some(message) = &*error {
                <Alert r#type={AlertType::Warning} title={message.clone()} inline={true} />
            }

            <label class="form-label">{"Title"}</label>
            <input
                type="text"
                class="form-input"
                placeholder="Untitled snippet"
                value={draft.title.clone()}
                oninput={on_title}
            />

            <label class="form-label">{"Code"}</label>
            <CodeEditor value={draft.code.clone()} language={draft.language.clone()} on_change={on_code} />

            <label class="form-label">{"Language"}</label>
            <select class="form-input" onchange={on_language}>
                { for languages.iter().map(|lang| html! {
                    <option value={lang.name.clone()} selected={lang.name == draft.language}>
                        {&lang.display_name}
                    </option>
                }) }
            </select>

            <label class="form-label">{"Tags"}</label>
            <input
                type="text"
                class="form-input"
                placeholder="react, hooks, utils"
                value={draft.tags.clone()}
                oninput={on_tags}
            />

            <label class="form-label">{"Notes"}</label>
            <textarea
                class="form-input"
                rows="3"
                value={draft.notes.clone()}
                oninput={on_notes}
            />

            <label class="form-check">
                <input type="checkbox" checked={draft.is_public} onchange={on_public} />
                {" Public"}
            </label>

            if props.summaries_enabled {
                <label class="form-check">
                    <input type="checkbox" checked={*summarize} onchange={on_summarize} />
                    {" Add AI summary to notes"}
                </label>
            }

            <div class="form-actions">
                <Button
                    onclick={on_save}
                    disabled={props.busy}
                    variant={ButtonVariant::Primary}
                >
                    {"Save"}
                </Button>
                <Button
                    onclick={props.on_cancel.reform(|_| ())}
                    disabled={props.busy}
                    variant={ButtonVariant::Secondary}
                >
                    {"Cancel"}
                </Button>
            </div>
        </div>
    }
}
