use regex::Regex;
use tracing::debug;

use super::{CaptionTrack, TrackMap};
use crate::CaptionError;

/// One entry of a language preference list.
///
/// An entry is a comma separated list of alternatives. Each alternative is an exact
/// tag (`fr`), a regex (`en.*`), a glob (`en*`) or a wildcard (`*`, `all`). An
/// alternative prefixed with `-` excludes what it matches, so `all,-live_chat`
/// matches every language but `live_chat`.
#[derive(Debug, Clone)]
pub struct LanguagePattern {
    source: String,
    include: Vec<Matcher>,
    exclude: Vec<Matcher>,
}

#[derive(Debug, Clone)]
enum Matcher {
    Any,
    Exact(String),
    Pattern(Regex),
}

impl Matcher {
    fn new(alternative: &str) -> Self {
        if alternative == "*" || alternative.eq_ignore_ascii_case("all") {
            return Matcher::Any;
        }

        if !alternative.chars().any(is_regex_meta) {
            return Matcher::Exact(alternative.to_lowercase());
        }

        match Regex::new(&format!("^(?i:{})$", glob_to_regex(alternative))) {
            Ok(regex) => Matcher::Pattern(regex),
            Err(_) => Matcher::Exact(alternative.to_lowercase()),
        }
    }

    fn matches(&self, language: &str) -> bool {
        match self {
            Matcher::Any => true,
            Matcher::Exact(tag) => tag.eq_ignore_ascii_case(language),
            Matcher::Pattern(regex) => regex.is_match(language),
        }
    }
}

impl LanguagePattern {
    pub fn new(pattern: &str) -> Self {
        let mut include = Vec::new();
        let mut exclude = Vec::new();

        for alternative in pattern.split(',').map(str::trim).filter(|a| !a.is_empty()) {
            match alternative.strip_prefix('-') {
                Some(excluded) if !excluded.is_empty() => exclude.push(Matcher::new(excluded)),
                _ => include.push(Matcher::new(alternative)),
            }
        }

        if include.is_empty() && !exclude.is_empty() {
            include.push(Matcher::Any);
        }

        Self {
            source: pattern.to_string(),
            include,
            exclude,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, language: &str) -> bool {
        self.include.iter().any(|m| m.matches(language)) && !self.exclude.iter().any(|m| m.matches(language))
    }
}

fn is_regex_meta(c: char) -> bool {
    matches!(c, '.' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '^' | '$' | '\\')
}

/// Turn a bare `*` into `.*`, leaving `.*` alone
fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 4);
    let mut previous = None;
    for c in pattern.chars() {
        if c == '*' && previous != Some('.') {
            out.push_str(".*");
        } else {
            out.push(c);
        }
        previous = Some(c);
    }
    out
}

/// Pick the caption track to use.
///
/// Preferences are tried in order; the first one matching a language with at least one
/// track wins, and among that language's variants SRT beats VTT beats anything else
/// (first declared wins a tie). Without any match the first language in the map is
/// used, so this only fails when there is no track at all.
pub fn select<'a, S: AsRef<str>>(tracks: &'a TrackMap, preferred_languages: &[S]) -> Result<&'a CaptionTrack, CaptionError> {
    let available = || tracks.iter().filter(|(_, variants)| !variants.is_empty());

    for preference in preferred_languages {
        let pattern = LanguagePattern::new(preference.as_ref());

        if let Some((language, variants)) = available().find(|(language, _)| pattern.matches(language)) {
            debug!("Language preference {:?} matched {}", pattern.as_str(), language);
            return best_variant(variants);
        }
    }

    match available().next() {
        Some((language, variants)) => {
            debug!("No language preference matched, falling back to {}", language);
            best_variant(variants)
        }
        None => Err(CaptionError::NoTrackAvailable),
    }
}

fn best_variant(variants: &[CaptionTrack]) -> Result<&CaptionTrack, CaptionError> {
    variants
        .iter()
        .min_by_key(|track| track.dialect.priority())
        .ok_or(CaptionError::NoTrackAvailable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captions::Dialect;

    fn track(language: &str, dialect: Dialect) -> CaptionTrack {
        CaptionTrack::new(language, dialect, format!("{} {}", language, dialect))
    }

    fn map(entries: &[(&str, &[Dialect])]) -> TrackMap {
        entries
            .iter()
            .map(|(language, dialects)| {
                (language.to_string(), dialects.iter().map(|d| track(language, *d)).collect())
            })
            .collect()
    }

    #[test]
    fn test_select_prefers_srt_within_language() {
        let tracks = map(&[("en", &[Dialect::Srt]), ("fr", &[Dialect::Vtt, Dialect::Srt])]);
        let selected = select(&tracks, &["fr", "en"]).unwrap();

        assert_eq!(selected.language, "fr");
        assert_eq!(selected.dialect, Dialect::Srt);
    }

    #[test]
    fn test_select_follows_preference_order() {
        let tracks = map(&[("de", &[Dialect::Vtt]), ("en-US", &[Dialect::Vtt])]);

        assert_eq!(select(&tracks, &["es", "en.*", "de"]).unwrap().language, "en-US");
        assert_eq!(select(&tracks, &["de", "en.*"]).unwrap().language, "de");
    }

    #[test]
    fn test_select_wildcards_and_exclusions() {
        let tracks = map(&[("en-GB", &[Dialect::Vtt]), ("live_chat", &[Dialect::Unknown])]);

        assert_eq!(select(&tracks, &["fr.*,live_chat"]).unwrap().language, "live_chat");
        assert_eq!(select(&tracks, &["all,-en.*"]).unwrap().language, "live_chat");
        assert_eq!(select(&tracks, &["en*"]).unwrap().language, "en-GB");
        assert_eq!(select(&tracks, &["*"]).unwrap().language, "en-GB");
    }

    #[test]
    fn test_select_falls_back_to_first_language() {
        let tracks = map(&[("ja", &[Dialect::Vtt]), ("ko", &[Dialect::Srt])]);
        let selected = select(&tracks, &["fr", "en"]).unwrap();

        assert_eq!(selected.language, "ja");
        assert_eq!(select::<&str>(&tracks, &[]).unwrap().language, "ja");
    }

    #[test]
    fn test_select_skips_languages_without_variants() {
        let tracks = map(&[("en", &[]), ("fr", &[Dialect::Vtt])]);
        assert_eq!(select(&tracks, &["en"]).unwrap().language, "fr");
    }

    #[test]
    fn test_select_without_tracks() {
        assert_eq!(select(&TrackMap::new(), &["fr"]), Err(CaptionError::NoTrackAvailable));
        assert_eq!(select(&map(&[("fr", &[])]), &["fr"]), Err(CaptionError::NoTrackAvailable));
    }

    #[test]
    fn test_select_ignores_insertion_order() {
        let forward = map(&[("en", &[Dialect::Vtt]), ("fr", &[Dialect::Srt]), ("de", &[Dialect::Srt])]);
        let backward = map(&[("de", &[Dialect::Srt]), ("fr", &[Dialect::Srt]), ("en", &[Dialect::Vtt])]);

        for preferences in [vec!["es"], vec!["fr"], vec!["e.*"], vec![]] {
            assert_eq!(
                select(&forward, preferences.as_slice()),
                select(&backward, preferences.as_slice())
            );
        }
    }

    #[test]
    fn test_language_pattern_matching() {
        assert!(LanguagePattern::new("EN").matches("en"));
        assert!(!LanguagePattern::new("en").matches("en-US"));
        assert!(LanguagePattern::new("en.*").matches("en"));
        assert!(LanguagePattern::new("en.*").matches("en-US"));
        assert!(!LanguagePattern::new("en.*").matches("fr"));
        assert!(LanguagePattern::new("fr.*, live_chat").matches("live_chat"));
        assert!(!LanguagePattern::new("all,-live_chat").matches("live_chat"));
        assert!(LanguagePattern::new("-live_chat").matches("fr"));
        assert!(LanguagePattern::new("en[").matches("en["));
    }
}
