//! Caller-side handling of signals returned by the API client.
//!
//! The client reports an unauthorized response as [`ClientSignal::Unauthorized`]
//! instead of navigating itself; callers pass the signal to [`handle_signal`]
//! with their [`Navigator`].

use tracing::info;

use crate::domain::ports::Navigator;

/// Path users are sent to after losing their session.
pub const LOGIN_PATH: &str = "/";

/// Out-of-band instruction returned alongside a request failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientSignal {
    /// The credential was rejected and has been cleared.
    Unauthorized,
}

/// Where the caller should navigate for `signal`, given its current path.
///
/// # Examples
/// ```
/// use admin_client::session::{ClientSignal, redirect_target};
///
/// assert_eq!(redirect_target(ClientSignal::Unauthorized, "/dashboard"), Some("/"));
/// assert_eq!(redirect_target(ClientSignal::Unauthorized, "/"), None);
/// ```
pub fn redirect_target(signal: ClientSignal, current_path: &str) -> Option<&'static str> {
    match signal {
        ClientSignal::Unauthorized => (current_path != LOGIN_PATH).then_some(LOGIN_PATH),
    }
}

/// Apply `signal` through `navigator`. Returns whether navigation happened.
pub fn handle_signal(signal: ClientSignal, navigator: &dyn Navigator) -> bool {
    let current = navigator.current_path();
    match redirect_target(signal, &current) {
        Some(target) => {
            info!(from = %current, to = target, "session ended; redirecting to login");
            navigator.navigate_to(target);
            true
        }
        None => false,
    }
}
