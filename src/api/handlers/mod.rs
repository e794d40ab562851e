//! HTTP request handlers for all API endpoints.
//!
//! This module contains Axum route handlers organized by resource type.
//! Each handler is responsible for:
//! - Request validation and deserialization
//! - Identity resolution via the `x-user-id` header
//! - Business logic execution via database repositories
//! - Response serialization
//!
//! # Handler Modules
//!
//! - [`users`]: Registration, profile management, referral info
//! - [`watchlist`]: Watchlist listing, add, remove
//! - [`stocks`]: Stock listing, search, detail, prices, onboarding picks
//! - [`predictions`]: Watchlist signals and prediction history
//! - [`push`]: Push subscription management and test sends
//! - [`notification_settings`]: Settings blob read/replace
//! - [`payments`]: Checkout, billing portal, provider webhooks
//! - [`sync`]: Admin trigger for the external data-sync workflow
//! - [`config`]: Public client bootstrap configuration
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`] which automatically converts to
//! appropriate HTTP status codes with generic client-facing messages.

pub mod config;
pub mod notification_settings;
pub mod payments;
pub mod predictions;
pub mod push;
pub mod stocks;
pub mod sync;
pub mod users;
pub mod watchlist;
