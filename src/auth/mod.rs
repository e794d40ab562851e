//! Identity resolution for API requests.
//!
//! tickerdeck is auth-lite: the client mints an anonymous UUID on first load
//! and sends it on every request in the `x-user-id` header. There are no
//! sessions or passwords; upgrading to a named account just fills in the
//! username/email columns on the same row.

mod identity;

pub use identity::{Identity, USER_ID_HEADER, require_admin_key};
