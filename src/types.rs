//! Common type definitions.
//!
//! All entity IDs are UUIDs wrapped in type aliases for better type safety.
//! Stock symbols are plain uppercase strings and are passed around as `&str`
//! rather than a newtype, matching how they arrive on the wire.

use uuid::Uuid;

// Type aliases for IDs
pub type UserId = Uuid;
pub type PushSubscriptionId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

/// Normalize a stock symbol as received from the client: trimmed, uppercased.
pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}
