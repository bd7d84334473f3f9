/// Build-time configuration for the extension
///
/// Values come from the environment at compile time (`option_env!`), the way a
/// bundler bakes `VITE_*` variables into an extension build. Everything goes
/// through [`Config::from_getter`] so tests can supply their own values.

/// Backend URL used when none is configured.
pub const DEFAULT_SUPABASE_URL: &str = "http://localhost:54321";

/// Companion website that sets the token cookies.
pub const DEFAULT_WEBSITE_URL: &str = "http://localhost:3000";

/// Identity provider passed to the backend's authorize endpoint.
pub const DEFAULT_OAUTH_PROVIDER: &str = "github";

/// OpenAI-compatible base URL for summaries.
pub const DEFAULT_SUMMARY_BASE_URL: &str = "https://api.openai.com/v1";

pub const DEFAULT_SUMMARY_MODEL: &str = "gpt-4o-mini";

const CHAT_COMPLETIONS_PATH: &str = "chat/completions";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    supabase_url: String,
    supabase_anon_key: String,
    website_url: String,
    oauth_provider: String,
    summary_api_key: Option<String>,
    summary_base_url: String,
    summary_model: String,
}

impl Config {
    /// Configuration baked in at compile time.
    pub fn from_build_env() -> Self {
        Self::from_getter(|key| {
            let value = match key {
                "SUPABASE_URL" => option_env!("SUPABASE_URL"),
                "SUPABASE_ANON_KEY" => option_env!("SUPABASE_ANON_KEY"),
                "WEBSITE_URL" => option_env!("WEBSITE_URL"),
                "OAUTH_PROVIDER" => option_env!("OAUTH_PROVIDER"),
                "AI_SUMMARY_API_KEY" => option_env!("AI_SUMMARY_API_KEY"),
                "AI_SUMMARY_BASE_URL" => option_env!("AI_SUMMARY_BASE_URL"),
                "AI_SUMMARY_MODEL" => option_env!("AI_SUMMARY_MODEL"),
                _ => None,
            };
            value.map(str::to_string)
        })
    }

    pub fn from_getter(mut getter: impl FnMut(&str) -> Option<String>) -> Self {
        let supabase_url = clean_url(getter("SUPABASE_URL"), DEFAULT_SUPABASE_URL);
        let supabase_anon_key = clean(getter("SUPABASE_ANON_KEY")).unwrap_or_default();
        let website_url = clean_url(getter("WEBSITE_URL"), DEFAULT_WEBSITE_URL);
        let oauth_provider =
            clean(getter("OAUTH_PROVIDER")).unwrap_or_else(|| DEFAULT_OAUTH_PROVIDER.to_string());
        let summary_api_key = clean(getter("AI_SUMMARY_API_KEY"));
        let summary_base_url = clean_url(getter("AI_SUMMARY_BASE_URL"), DEFAULT_SUMMARY_BASE_URL);
        let summary_model =
            clean(getter("AI_SUMMARY_MODEL")).unwrap_or_else(|| DEFAULT_SUMMARY_MODEL.to_string());

        Config {
            supabase_url,
            supabase_anon_key,
            website_url,
            oauth_provider,
            summary_api_key,
            summary_base_url,
            summary_model,
        }
    }

    pub fn supabase_url(&self) -> &str {
        &self.supabase_url
    }

    pub fn supabase_anon_key(&self) -> &str {
        &self.supabase_anon_key
    }

    pub fn website_url(&self) -> &str {
        &self.website_url
    }

    pub fn oauth_provider(&self) -> &str {
        &self.oauth_provider
    }

    pub fn summary_api_key(&self) -> Option<&str> {
        self.summary_api_key.as_deref()
    }

    pub fn summary_model(&self) -> &str {
        &self.summary_model
    }

    pub fn summary_endpoint(&self) -> String {
        if self.summary_base_url.ends_with(CHAT_COMPLETIONS_PATH) {
            self.summary_base_url.clone()
        } else {
            format!("{}/{}", self.summary_base_url, CHAT_COMPLETIONS_PATH)
        }
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_url(value: Option<String>, default: &str) -> String {
    clean(value)
        .map(|v| v.trim_end_matches('/').to_string())
        .unwrap_or_else(|| default.to_string())
}
