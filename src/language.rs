/// Language detection for pasted code
///
/// Detection runs the patterns of each language in a fixed order and picks the
/// first language with a hit. Patterns are anchored to the start of the whole
/// snippet (no multi-line mode), so the first meaningful line decides.
use regex::Regex;
use std::sync::LazyLock;

/// Language used when nothing matches
pub const DEFAULT_LANGUAGE: &str = "javascript";

struct LanguageInfo {
    name: &'static str,
    extensions: &'static [&'static str],
    patterns: &'static [&'static str],
}

const LANGUAGES: &[LanguageInfo] = &[
    LanguageInfo {
        name: "html",
        extensions: &[".html", ".htm"],
        patterns: &[
            r"(?i)^\s*<!DOCTYPE\s+html>",
            r"(?i)<(?:html|head|body|script|div|span)[>\s]",
        ],
    },
    LanguageInfo {
        name: "css",
        extensions: &[".css", ".scss", ".less"],
        patterns: &[
            r"^\s*[.#][\w-]+\s*\{",
            r"@media\s+",
            r"^[\s\w.#-]+\{[\s\w:;-]+\}",
        ],
    },
    LanguageInfo {
        name: "javascript",
        extensions: &[".js", ".jsx", ".mjs"],
        patterns: &[
            r"^\s*import\s+.*from\s+",
            r"^\s*export\s+",
            r"^\s*function\s+\w+\s*\(",
            r"^\s*const\s+\w+\s*=",
            r"^\s*let\s+\w+\s*=",
            r"^\s*var\s+\w+\s*=",
        ],
    },
    LanguageInfo {
        name: "typescript",
        extensions: &[".ts", ".tsx"],
        patterns: &[
            r"^\s*interface\s+\w+",
            r"^\s*type\s+\w+",
            r":\s*(?:string|number|boolean|any|void)\s*[,=)]",
        ],
    },
    LanguageInfo {
        name: "python",
        extensions: &[".py"],
        patterns: &[
            r"^\s*def\s+\w+\s*\(",
            r"^\s*class\s+\w+[:\s]",
            r"^\s*import\s+\w+",
            r"^\s*from\s+\w+\s+import\s+",
        ],
    },
    LanguageInfo {
        name: "java",
        extensions: &[".java"],
        patterns: &[
            r"^\s*public\s+class\s+",
            r"^\s*private\s+\w+",
            r"^\s*protected\s+\w+",
            r"^\s*package\s+[\w.]+;",
        ],
    },
    LanguageInfo {
        name: "json",
        extensions: &[".json"],
        patterns: &[r"^\s*[{\[]"],
    },
    LanguageInfo {
        name: "markdown",
        extensions: &[".md", ".markdown"],
        patterns: &[r"^\s*#{1,6}\s+", r"^\s*[-*+]\s+", r"^\s*\d+\.\s+"],
    },
    LanguageInfo {
        name: "yaml",
        extensions: &[".yml", ".yaml"],
        patterns: &[r"^\s*[\w-]+:\s+"],
    },
    LanguageInfo {
        name: "shell",
        extensions: &[".sh", ".bash"],
        patterns: &[r"^\s*#!", r#"^\s*\w+=["'].*["']"#, r"^\s*(?:if|for|while)\s+"],
    },
];

static COMPILED: LazyLock<Vec<(&'static str, Vec<Regex>)>> = LazyLock::new(|| {
    LANGUAGES
        .iter()
        .map(|lang| {
            let patterns = lang
                .patterns
                .iter()
                .filter_map(|p| match Regex::new(p) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        log::error!("Bad pattern for {}: {}", lang.name, e);
                        None
                    }
                })
                .collect();
            (lang.name, patterns)
        })
        .collect()
});

static BLOCK_COMMENT: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").ok());
static LINE_COMMENT: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"//.*").ok());

/// A language the form offers
#[derive(Debug, Clone, PartialEq)]
pub struct SupportedLanguage {
    pub name: String,
    pub display_name: String,
}

/// Guess the language of a snippet, falling back to JavaScript
pub fn detect_language(code: &str) -> &'static str {
    let cleaned = strip_comments(code);

    COMPILED
        .iter()
        .find(|(_, patterns)| patterns.iter().any(|re| re.is_match(&cleaned)))
        .map(|(name, _)| *name)
        .unwrap_or(DEFAULT_LANGUAGE)
}

/// Remove C-style comments so commented-out code doesn't vote
fn strip_comments(code: &str) -> String {
    let without_blocks = match BLOCK_COMMENT.as_ref() {
        Some(re) => re.replace_all(code, "").into_owned(),
        None => code.to_string(),
    };
    match LINE_COMMENT.as_ref() {
        Some(re) => re.replace_all(&without_blocks, "").into_owned(),
        None => without_blocks,
    }
}

/// Primary file extension (without the dot); unknown languages map to themselves
pub fn file_extension(language: &str) -> String {
    LANGUAGES
        .iter()
        .find(|lang| lang.name == language)
        .and_then(|lang| lang.extensions.first())
        .map(|ext| ext.trim_start_matches('.').to_string())
        .unwrap_or_else(|| language.to_string())
}

pub fn supported_languages() -> Vec<SupportedLanguage> {
    LANGUAGES
        .iter()
        .map(|lang| SupportedLanguage {
            name: lang.name.to_string(),
            display_name: capitalize(lang.name),
        })
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
