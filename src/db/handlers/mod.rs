//! Repository implementations for CRUD operations.
//!
//! Each repository wraps a `&mut PgConnection` and encapsulates all database
//! access for one entity type. See [`repository::Repository`] for the shared
//! CRUD trait; relationship- and time-series-shaped tables expose bespoke
//! methods instead.

pub mod invites;
pub mod notification_settings;
pub mod predictions;
pub mod push_subscriptions;
pub mod repository;
pub mod stocks;
pub mod users;
pub mod watchlist;

pub use invites::Invites;
pub use notification_settings::NotificationSettings;
pub use predictions::Predictions;
pub use push_subscriptions::PushSubscriptions;
pub use repository::Repository;
pub use stocks::Stocks;
pub use users::Users;
pub use watchlist::Watchlist;
