//! Request authentication
//!
//! The acting account is named by the `Authentication: username <name>`
//! request header. Handlers that need it take a [`CurrentUser`].

mod middleware;

pub use middleware::{AUTHENTICATION_HEADER, CurrentUser};
