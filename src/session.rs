//! In-process session state: the cart and the stored locale preference.
//!
//! Sessions are deliberately transient. Nothing here survives a restart and
//! that is accepted behavior, not a defect.

use crate::domain::aggregates::Cart;
use crate::locale::LocalePreference;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Clone, Debug, Default)]
pub struct Session {
    pub cart: Cart,
    pub locale: Option<LocalePreference>,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` against the session, creating it if absent.
    pub fn with_session<T>(&self, id: &str, f: impl FnOnce(&mut Session) -> T) -> T {
        let mut sessions = self.inner.write().expect("session lock poisoned");
        f(sessions.entry(id.to_string()).or_default())
    }

    pub fn cart(&self, id: &str) -> Cart {
        self.with_session(id, |s| s.cart.clone())
    }

    pub fn locale(&self, id: &str) -> Option<LocalePreference> {
        let sessions = self.inner.read().expect("session lock poisoned");
        sessions.get(id).and_then(|s| s.locale)
    }

    pub fn set_locale(&self, id: &str, pref: LocalePreference) {
        self.with_session(id, |s| s.locale = Some(pref));
    }

    pub fn clear_cart(&self, id: &str) {
        self.with_session(id, |s| s.cart.clear());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{Currency, Language};
    use uuid::Uuid;

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        let product = Uuid::new_v4();
        store.with_session("a", |s| s.cart.add(product, 2));
        assert_eq!(store.cart("a").entries().len(), 1);
        assert!(store.cart("b").is_empty());
    }

    #[test]
    fn test_locale_roundtrip() {
        let store = SessionStore::new();
        assert_eq!(store.locale("a"), None);
        let pref = LocalePreference::new(Language::Id, Currency::Idr);
        store.set_locale("a", pref);
        assert_eq!(store.locale("a"), Some(pref));
    }
}
