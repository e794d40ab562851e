//! Database record structures matching table schemas.
//!
//! Each submodule mirrors one table (or a tight group of tables) and defines
//! the request/response structs the corresponding repository works with.
//! API-facing wire models live in [`crate::api::models`] and convert from
//! these.

pub mod invites;
pub mod notification_settings;
pub mod predictions;
pub mod push_subscriptions;
pub mod stocks;
pub mod users;
pub mod watchlist;
