//! Markup stripping for dream content
//!
//! Dream bodies are persisted as plain text only. Script and style elements
//! are removed together with their contents; all other tags and HTML
//! comments are removed while their inner text is kept.

use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>").unwrap());
static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Strip all markup from `input`, keeping plain text only
pub fn strip_markup(input: &str) -> String {
    let without_scripts = SCRIPT_STYLE.replace_all(input, "");
    let without_comments = COMMENT.replace_all(&without_scripts, "");
    TAG.replace_all(&without_comments, "").into_owned()
}
