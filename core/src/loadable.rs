//! Lifecycle wrapper for remotely fetched data.
//!
//! A `Loadable` is in exactly one of four states. Entering `Loading` or
//! `Error` drops whatever payload was there before; code that needs the old
//! value back (the store's optimistic edits) keeps its own copy.

/// Discriminant of a `Loadable`, for comparisons that ignore the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Uninitialized,
    Loading,
    Loaded,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Loadable<T> {
    #[default]
    Uninitialized,
    Loading,
    Loaded(T),
    Error(String),
}

impl<T> Loadable<T> {
    pub fn uninitialized() -> Self {
        Loadable::Uninitialized
    }

    pub fn loading() -> Self {
        Loadable::Loading
    }

    pub fn loaded(data: T) -> Self {
        Loadable::Loaded(data)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Loadable::Error(message.into())
    }

    pub fn state(&self) -> LoadState {
        match self {
            Loadable::Uninitialized => LoadState::Uninitialized,
            Loadable::Loading => LoadState::Loading,
            Loadable::Loaded(_) => LoadState::Loaded,
            Loadable::Error(_) => LoadState::Error,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Loadable::Loaded(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Loadable::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Loadable::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Loadable<U> {
        match self {
            Loadable::Uninitialized => Loadable::Uninitialized,
            Loadable::Loading => Loadable::Loading,
            Loadable::Loaded(data) => Loadable::Loaded(f(data)),
            Loadable::Error(message) => Loadable::Error(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_uninitialized() {
        let l: Loadable<u32> = Loadable::default();
        assert_eq!(l.state(), LoadState::Uninitialized);
    }

    #[test]
    fn accessors_only_match_their_variant() {
        let loaded = Loadable::loaded(7);
        assert!(loaded.is_loaded());
        assert_eq!(loaded.data(), Some(&7));
        assert_eq!(loaded.error_message(), None);

        let failed: Loadable<u32> = Loadable::error("nope");
        assert!(!failed.is_loaded());
        assert_eq!(failed.data(), None);
        assert_eq!(failed.error_message(), Some("nope"));

        let loading: Loadable<u32> = Loadable::loading();
        assert!(loading.is_loading());
        assert_eq!(loading.data(), None);
    }

    #[test]
    fn map_preserves_state() {
        assert_eq!(Loadable::loaded(2).map(|n| n * 10), Loadable::Loaded(20));
        assert_eq!(
            Loadable::<u32>::error("x").map(|n| n + 1),
            Loadable::Error("x".to_string())
        );
        assert_eq!(Loadable::<u32>::loading().map(|n| n + 1).state(), LoadState::Loading);
    }
}
