//! Pricing/currency resolution from request locale signals.
//!
//! Precedence: explicit query override, then the session's stored preference,
//! then a header heuristic. The resolved pair becomes the session's new
//! preference. The heuristic only looks at request headers; there is no
//! geolocation lookup.

use crate::domain::value_objects::{Currency, Language};
use axum::http::header::{ACCEPT_LANGUAGE, USER_AGENT};
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalePreference {
    pub language: Language,
    pub currency: Currency,
}

impl LocalePreference {
    pub fn new(language: Language, currency: Currency) -> Self {
        Self { language, currency }
    }
}

const INDONESIAN_UA_KEYWORDS: &[&str] = &["indonesia", "jakarta", "id-"];

/// Infers a locale from Accept-Language and User-Agent. An Indonesian signal
/// in either selects Indonesian/IDR; everything else defaults to English/USD.
pub fn detect(headers: &HeaderMap) -> LocalePreference {
    let accept_language = header_str(headers, ACCEPT_LANGUAGE.as_str()).to_lowercase();
    if accept_language.contains("id") || accept_language.contains("indonesia") {
        return LocalePreference::new(Language::Id, Currency::Idr);
    }

    let user_agent = header_str(headers, USER_AGENT.as_str()).to_lowercase();
    if INDONESIAN_UA_KEYWORDS.iter().any(|k| user_agent.contains(k)) {
        return LocalePreference::new(Language::Id, Currency::Idr);
    }

    LocalePreference::new(Language::En, Currency::Usd)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// Resolves the effective `(language, currency)` pair for a request. The
/// header heuristic only runs when neither an explicit override nor a stored
/// preference exists for a signal.
pub fn resolve(
    explicit_language: Option<&str>,
    explicit_currency: Option<&str>,
    stored: Option<LocalePreference>,
    headers: &HeaderMap,
) -> LocalePreference {
    let base = stored.unwrap_or_else(|| detect(headers));
    let language = explicit_language
        .and_then(Language::parse)
        .unwrap_or(base.language);
    let currency = explicit_currency
        .map(Currency::from_code)
        .unwrap_or(base.currency);
    LocalePreference::new(language, currency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(accept_language: &str, user_agent: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        if !accept_language.is_empty() {
            map.insert(ACCEPT_LANGUAGE, HeaderValue::from_str(accept_language).unwrap());
        }
        if !user_agent.is_empty() {
            map.insert(USER_AGENT, HeaderValue::from_str(user_agent).unwrap());
        }
        map
    }

    #[test]
    fn test_detects_indonesian_language_tag() {
        let pref = detect(&headers("id-ID,id;q=0.9", ""));
        assert_eq!(pref, LocalePreference::new(Language::Id, Currency::Idr));
    }

    #[test]
    fn test_detects_indonesian_user_agent() {
        let pref = detect(&headers("fr-FR", "Mozilla/5.0 (Linux; U; id-ID) Jakarta"));
        assert_eq!(pref.currency, Currency::Idr);
    }

    #[test]
    fn test_defaults_to_english_usd() {
        let pref = detect(&headers("en-US,en;q=0.5", "Mozilla/5.0"));
        assert_eq!(pref, LocalePreference::new(Language::En, Currency::Usd));
    }

    #[test]
    fn test_explicit_override_wins() {
        let stored = Some(LocalePreference::new(Language::En, Currency::Usd));
        let pref = resolve(Some("id"), Some("IDR"), stored, &headers("en-US", ""));
        assert_eq!(pref, LocalePreference::new(Language::Id, Currency::Idr));
    }

    #[test]
    fn test_stored_preference_beats_headers() {
        let stored = Some(LocalePreference::new(Language::Id, Currency::Idr));
        let pref = resolve(None, None, stored, &headers("en-US", "Mozilla/5.0"));
        assert_eq!(pref, LocalePreference::new(Language::Id, Currency::Idr));
    }

    #[test]
    fn test_unknown_explicit_currency_falls_back_to_usd() {
        let pref = resolve(None, Some("XYZ"), None, &headers("en-US", ""));
        assert_eq!(pref.currency, Currency::Usd);
    }
}
