/// Reusable UI components

use patternfly_yew::prelude::*;
use serde::{Deserialize, Serialize};
use yew::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct HeaderProps {
    pub email: Option<String>,
    pub theme: Theme,
    pub busy: bool,
    pub on_new_snippet: Callback<()>,
    pub on_sign_out: Callback<()>,
    pub on_toggle_theme: Callback<()>,
}

#[function_component(Header)]
pub fn header(props: &HeaderProps) -> Html {
    let theme_icon = match props.theme {
        Theme::Light => "🌙",
        Theme::Dark => "☀️",
    };

    html! {
        <header class="popup-header">
            <div class="popup-header-title">
                <h1 class="popup-title">{"Snippet Organizer"}</h1>
                if let Some(email) = &props.email {
                    <span class="popup-user">{email}</span>
                }
            </div>
            <div class="popup-header-actions">
                <Button
                    onclick={props.on_toggle_theme.reform(|_| ())}
                    variant={ButtonVariant::Plain}
                >
                    {theme_icon}
                </Button>
                <Button
                    onclick={props.on_new_snippet.reform(|_| ())}
                    disabled={props.busy}
                    variant={ButtonVariant::Primary}
                >
                    {"New Snippet"}
                </Button>
                <Button
                    onclick={props.on_sign_out.reform(|_| ())}
                    disabled={props.busy}
                    variant={ButtonVariant::Secondary}
                >
                    {"Sign Out"}
                </Button>
            </div>
        </header>
    }
}

#[derive(Properties, PartialEq)]
pub struct LoginViewProps {
    pub busy: bool,
    pub on_oauth_login: Callback<()>,
    pub on_website_login: Callback<()>,
}

#[function_component(LoginView)]
pub fn login_view(props: &LoginViewProps) -> Html {
    html! {
        <div class="login-container">
            <h1 class="popup-title">{"Snippet Organizer"}</h1>
            <p class="login-hint">{"Sign in to see and save your snippets."}</p>
            <div class="flex-column-gap">
                <Button
                    onclick={props.on_oauth_login.reform(|_| ())}
                    disabled={props.busy}
                    variant={ButtonVariant::Primary}
                    block={true}
                >
                    {"Sign in with GitHub"}
                </Button>
                <Button
                    onclick={props.on_website_login.reform(|_| ())}
                    disabled={props.busy}
                    variant={ButtonVariant::Secondary}
                    block={true}
                >
                    {"Use website login"}
                </Button>
            </div>
        </div>
    }
}
