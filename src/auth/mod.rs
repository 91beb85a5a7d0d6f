//! Signing users in and out, keeping the backend session in a cookie, and
//! guarding the pages that need a signed-in user.

mod cookie;
mod events;
mod forms;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod sign_up;

pub(crate) use cookie::DEFAULT_COOKIE_DURATION;
pub use events::{SessionEvent, SessionEvents, SessionListener};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_hx};
pub use password::ValidatedPassword;
pub use sign_up::post_sign_up;
