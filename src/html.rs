//! HTML-to-text reduction for messages that only carry markup bodies.

use std::sync::LazyLock;

use regex::Regex;

// The lazy body plus the `\z` alternate keeps block matching bounded on
// malformed input: a block ends at the nearest closing tag, or at end of
// string when none exists.
static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script[^>]*>.*?(</script\s*>|\z)").unwrap()
});
static STYLE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<style[^>]*>.*?(</style\s*>|\z)").unwrap()
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>?").unwrap());
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NUMERIC_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(?:x([0-9a-fA-F]+)|(\d+));").unwrap());

/// Reduce an HTML body to plain text.
///
/// Script and style blocks vanish with their content; every other tag
/// becomes a single space; entities are decoded; whitespace runs
/// (including newlines) collapse to one space; the result is trimmed.
/// Plain input with no markup passes through unchanged.
pub fn reduce(html: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(html, "");
    let text = STYLE_BLOCK.replace_all(&text, "");
    let text = TAG.replace_all(&text, " ");
    let text = decode_entities(&text);
    let text = WHITESPACE_RUN.replace_all(&text, " ");
    text.trim().to_string()
}

/// Decode HTML character entities: the common named set plus decimal and
/// hex numeric forms. Unrecognized entities are left as-is.
fn decode_entities(input: &str) -> String {
    let decoded = NUMERIC_ENTITY.replace_all(input, |caps: &regex::Captures| {
        let codepoint = if let Some(hex) = caps.get(1) {
            u32::from_str_radix(hex.as_str(), 16).ok()
        } else {
            caps.get(2).and_then(|dec| dec.as_str().parse().ok())
        };
        match codepoint.and_then(char::from_u32) {
            Some(c) => c.to_string(),
            None => caps.get(0).unwrap().as_str().to_string(),
        }
    });

    decoded
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
