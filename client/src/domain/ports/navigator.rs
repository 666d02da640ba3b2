//! Driving-side port for page navigation.
//!
//! The HTTP client never navigates on its own; callers interpret the
//! signals it returns and drive a [`Navigator`].

/// Port exposing the caller's current location and a way to change it.
#[cfg_attr(test, mockall::automock)]
pub trait Navigator {
    /// Path of the current location, e.g. `/dashboard`.
    fn current_path(&self) -> String;

    /// Move to `path`.
    fn navigate_to(&self, path: &str);
}
