/// Popup UI for Snippet Organizer

use crate::backend::{Backend, SupabaseClient};
use crate::config::Config;
use crate::credentials::{ChromeStorage, THEME_KEY, load_json, save_json};
use crate::error::Error;
use crate::library::{create_snippet, delete_snippet, load_snippets, summarize_draft};
use crate::messages::{Request, send};
use crate::session::Session;
use crate::snippet::Snippet;
use crate::summarize::Summarizer;
use crate::ui::bridge::apply_theme;
use crate::ui::components::{Header, LoginView, Theme};
use crate::ui::snippet_form::{SnippetForm, Submission};
use crate::ui::snippet_list::SnippetList;
use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

type Client = SupabaseClient<ChromeStorage>;

/// Clients built once per popup from the build-time config
struct Services {
    backend: Client,
    summarizer: Summarizer,
    website_url: String,
}

impl Services {
    fn from_config(config: &Config) -> Self {
        Services {
            backend: SupabaseClient::new(config, ChromeStorage),
            summarizer: Summarizer::from_config(config),
            website_url: config.website_url().to_string(),
        }
    }
}

#[derive(Clone, PartialEq)]
enum AppState {
    Idle,
    Loading(String),
    Error(String),
}

/// Stored session plus its snippets, or `None` when signed out
async fn load_view(backend: &Client) -> Result<Option<(Session, Vec<Snippet>)>, Error> {
    let Some(session) = backend.current_session().await? else {
        return Ok(None);
    };
    let snippets = load_snippets(backend, &session).await?;
    Ok(Some((session, snippets)))
}

async fn login_with_oauth(backend: &Client) -> Result<Option<(Session, Vec<Snippet>)>, Error> {
    let session: Session = send(&Request::InitiateLogin).await?;
    log::info!("Signed in as {}", session.user_id());
    // The background worker persisted the session; read it back from storage
    load_view(backend).await
}

async fn login_with_website(services: &Services) -> Result<Option<(Session, Vec<Snippet>)>, Error> {
    // The background worker installs the cookie tokens under its login gate
    let session: Session = send(&Request::GetTokens {
        domain: services.website_url.clone(),
    })
    .await?;
    log::info!("Signed in from website as {}", session.user_id());
    load_view(&services.backend).await
}

async fn save_submission(
    services: &Services,
    session: Option<&Session>,
    submission: Submission,
    current: &[Snippet],
) -> Result<Vec<Snippet>, Error> {
    let draft = if submission.summarize {
        summarize_draft(&services.summarizer, submission.draft).await?
    } else {
        submission.draft
    };
    create_snippet(&services.backend, session, &draft, current).await
}

#[function_component(App)]
pub fn app() -> Html {
    let services = use_memo((), |_| Services::from_config(&Config::from_build_env()));
    let state = use_state(|| AppState::Loading("Loading...".to_string()));
    let session = use_state(|| None::<Session>);
    let session_checked = use_state(|| false);
    let snippets = use_state(Vec::<Snippet>::new);
    let show_form = use_state(|| false);
    let theme = use_state(Theme::default);

    // Applies a load result to the view
    let show_view = {
        let state = state.clone();
        let session = session.clone();
        let session_checked = session_checked.clone();
        let snippets = snippets.clone();
        Callback::from(move |result: Result<Option<(Session, Vec<Snippet>)>, Error>| {
            session_checked.set(true);
            match result {
                Ok(Some((current, list))) => {
                    session.set(Some(current));
                    snippets.set(list);
                    state.set(AppState::Idle);
                }
                Ok(None) => {
                    session.set(None);
                    snippets.set(Vec::new());
                    state.set(AppState::Idle);
                }
                Err(e) => {
                    log::error!("{}", e);
                    state.set(AppState::Error(e.to_string()));
                }
            }
        })
    };

    // Load session, snippets and theme on mount
    {
        let services = services.clone();
        let show_view = show_view.clone();
        let theme = theme.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match load_json::<_, Theme>(&ChromeStorage, THEME_KEY).await {
                    Ok(Some(saved)) => {
                        apply_theme(saved.as_str());
                        theme.set(saved);
                    }
                    Ok(None) => apply_theme(Theme::default().as_str()),
                    Err(e) => log::warn!("Failed to load theme: {}", e),
                }

                show_view.emit(load_view(&services.backend).await);
            });
            || ()
        });
    }

    let on_oauth_login = {
        let services = services.clone();
        let state = state.clone();
        let show_view = show_view.clone();
        Callback::from(move |_| {
            let services = services.clone();
            let show_view = show_view.clone();
            state.set(AppState::Loading("Waiting for sign in...".to_string()));
            spawn_local(async move {
                show_view.emit(login_with_oauth(&services.backend).await);
            });
        })
    };

    let on_website_login = {
        let services = services.clone();
        let state = state.clone();
        let show_view = show_view.clone();
        Callback::from(move |_| {
            let services = services.clone();
            let show_view = show_view.clone();
            state.set(AppState::Loading("Reading website login...".to_string()));
            spawn_local(async move {
                show_view.emit(login_with_website(&services).await);
            });
        })
    };

    let on_sign_out = {
        let services = services.clone();
        let state = state.clone();
        let show_view = show_view.clone();
        let show_form = show_form.clone();
        Callback::from(move |_| {
            let services = services.clone();
            let state = state.clone();
            let show_view = show_view.clone();
            show_form.set(false);
            state.set(AppState::Loading("Signing out...".to_string()));
            spawn_local(async move {
                match services.backend.sign_out().await {
                    Ok(()) => show_view.emit(Ok(None)),
                    Err(e) => {
                        log::error!("Sign out failed: {}", e);
                        state.set(AppState::Error(e.to_string()));
                    }
                }
            });
        })
    };

    let on_toggle_theme = {
        let theme = theme.clone();
        Callback::from(move |_| {
            let next = theme.toggled();
            apply_theme(next.as_str());
            theme.set(next);
            spawn_local(async move {
                if let Err(e) = save_json(&ChromeStorage, THEME_KEY, &next).await {
                    log::warn!("Failed to save theme: {}", e);
                }
            });
        })
    };

    let on_new_snippet = {
        let show_form = show_form.clone();
        Callback::from(move |_| show_form.set(true))
    };

    let on_cancel = {
        let show_form = show_form.clone();
        Callback::from(move |_| show_form.set(false))
    };

    let on_submit = {
        let services = services.clone();
        let state = state.clone();
        let session = session.clone();
        let snippets = snippets.clone();
        let show_form = show_form.clone();
        Callback::from(move |submission: Submission| {
            let services = services.clone();
            let state = state.clone();
            let current_session = (*session).clone();
            let snippets = snippets.clone();
            let show_form = show_form.clone();

            let message = if submission.summarize { "Summarizing and saving..." } else { "Saving..." };
            state.set(AppState::Loading(message.to_string()));

            spawn_local(async move {
                match save_submission(&services, current_session.as_ref(), submission, &snippets).await {
                    Ok(updated) => {
                        snippets.set(updated);
                        show_form.set(false);
                        state.set(AppState::Idle);
                    }
                    Err(e) => {
                        log::error!("{}", e);
                        state.set(AppState::Error(e.to_string()));
                    }
                }
            });
        })
    };

    let on_delete = {
        let services = services.clone();
        let state = state.clone();
        let session = session.clone();
        let snippets = snippets.clone();
        Callback::from(move |id: String| {
            let services = services.clone();
            let state = state.clone();
            let current_session = (*session).clone();
            let snippets = snippets.clone();

            state.set(AppState::Loading("Deleting...".to_string()));

            spawn_local(async move {
                match delete_snippet(&services.backend, current_session.as_ref(), &id, &snippets).await {
                    Ok(updated) => {
                        snippets.set(updated);
                        state.set(AppState::Idle);
                    }
                    Err(e) => {
                        log::error!("{}", e);
                        state.set(AppState::Error(e.to_string()));
                    }
                }
            });
        })
    };

    let busy = matches!(*state, AppState::Loading(_));

    html! {
        <div class={classes!("popup-container", format!("theme-{}", theme.as_str()))}>
            if let AppState::Loading(message) = &*state {
                <div class="status-message">
                    <Spinner />
                    <span>{message}</span>
                </div>
            }

            if let AppState::Error(message) = &*state {
                <Alert r#type={AlertType::Danger} title={message.clone()} inline={true} />
            }

            if let Some(current) = &*session {
                <Header
                    email={current.user.email.clone()}
                    theme={*theme}
                    {busy}
                    {on_new_snippet}
                    {on_sign_out}
                    {on_toggle_theme}
                />

                if *show_form {
                    <SnippetForm
                        {busy}
                        summaries_enabled={services.summarizer.is_enabled()}
                        {on_submit}
                        {on_cancel}
                    />
                }

                <SnippetList snippets={(*snippets).clone()} {busy} {on_delete} />
            } else if *session_checked {
                <LoginView {busy} {on_oauth_login} {on_website_login} />
            }
        </div>
    }
}
