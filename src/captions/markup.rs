use once_cell::sync::Lazy;
use regex::Regex;

/// Inline styling spans such as `<i>`, `<c.colorE5E5E5>` or `<00:00:01.500>`
static ANGLE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+?>").expect("valid angle tag regex"));

/// Positioning directives such as `{\an8}` or `{\pos(10,20)}`
static BRACE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\\[^}]*\}").expect("valid brace tag regex"));

/// Remove inline markup from one line of cue text.
///
/// Only tags are removed; surrounding whitespace and all other characters are kept
/// as they are. Never call this on a timing line.
pub fn strip(line: &str) -> String {
    let without_tags = ANGLE_TAG.replace_all(line, "");
    BRACE_TAG.replace_all(&without_tags, "").into_owned()
}
