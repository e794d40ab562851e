//! API models and default merge logic for notification settings.
//!
//! The stored blob is opaque JSON replaced wholesale on save. On read, stored
//! keys are laid over the server defaults so clients always see a complete
//! settings object even when they have only ever saved a subset.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationSettingsResponse {
    #[schema(value_type = Object)]
    pub settings: Value,
}

/// Server-side defaults for a user who has never saved settings.
pub fn default_settings() -> Value {
    json!({
        "signals_enabled": true,
        "signal_types": ["buy", "sell"],
        "min_confidence": 0.6,
        "quiet_hours": { "enabled": false, "start": "22:00", "end": "07:00" },
    })
}

/// Lay `stored` over `defaults`, key by key. Stored keys win; keys the client
/// never saved fall through to the default. One level deep is all the blob
/// has.
pub fn merge_with_defaults(stored: &Value) -> Value {
    let mut merged = default_settings();
    if let (Some(merged_map), Some(stored_map)) = (merged.as_object_mut(), stored.as_object()) {
        for (key, value) in stored_map {
            merged_map.insert(key.clone(), value.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_blob_reads_as_defaults() {
        let merged = merge_with_defaults(&json!({}));
        assert_eq!(merged, default_settings());
    }

    #[test]
    fn stored_keys_win_over_defaults() {
        let merged = merge_with_defaults(&json!({ "signals_enabled": false }));
        assert_eq!(merged["signals_enabled"], json!(false));
        // untouched keys fall through
        assert_eq!(merged["min_confidence"], json!(0.6));
    }

    #[test]
    fn unknown_keys_are_preserved() {
        let merged = merge_with_defaults(&json!({ "experimental_digest": true }));
        assert_eq!(merged["experimental_digest"], json!(true));
    }

    #[test]
    fn non_object_blob_is_ignored() {
        let merged = merge_with_defaults(&json!("garbage"));
        assert_eq!(merged, default_settings());
    }
}
