//! Cue-to-prose flattening.
//!
//! Captioning systems, auto-generated ones in particular, stutter: the same glyph or
//! short word is emitted over and over as the caption scrolls. A unit repeated
//! [`REPEAT_THRESHOLD`] times or more in a row is kept once; shorter runs are left alone.

use super::Cue;

/// Consecutive repeats at which a run is collapsed
pub const REPEAT_THRESHOLD: usize = 3;

/// Longest word, in characters, that counts as a stutter unit
pub const SHORT_TOKEN_MAX_CHARS: usize = 3;

/// Flatten cues into a single line of clean prose
pub fn normalize(cues: &[Cue]) -> String {
    let joined = cues
        .iter()
        .map(Cue::text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    normalize_text(&joined)
}

/// Collapse whitespace and stutters in free text.
///
/// `normalize_text(&normalize_text(s)) == normalize_text(s)` for every `s`.
pub fn normalize_text(text: &str) -> String {
    collapse_repeats(text).trim().to_string()
}

/// Split on whitespace runs, collapse character runs inside each word, then collapse
/// runs of short words. Words are rejoined with single spaces.
fn collapse_repeats(text: &str) -> String {
    let words: Vec<String> = text.split_whitespace().map(collapse_char_runs).collect();

    let mut kept: Vec<&str> = Vec::with_capacity(words.len());
    let mut i = 0;
    while i < words.len() {
        let word = words[i].as_str();
        let run = words[i..].iter().take_while(|other| other.as_str() == word).count();

        if run >= REPEAT_THRESHOLD && word.chars().count() <= SHORT_TOKEN_MAX_CHARS {
            kept.push(word);
        } else {
            kept.extend(std::iter::repeat(word).take(run));
        }
        i += run;
    }

    kept.join(" ")
}

/// `Hmmmm` becomes `Hm`, `...` becomes `.`. Digit runs are left intact so numbers
/// such as `1000` survive.
fn collapse_char_runs(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    let mut out = String::with_capacity(word.len());

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let run = chars[i..].iter().take_while(|&&other| other == c).count();

        if run >= REPEAT_THRESHOLD && !c.is_ascii_digit() {
            out.push(c);
        } else {
            out.extend(std::iter::repeat(c).take(run));
        }
        i += run;
    }

    out
}
