//! OpenAPI document assembled from the handler annotations.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api::models::{
    billing::{BillingPortalResponse, BillingStatusResponse, CheckoutSessionResponse},
    config::ClientConfigResponse,
    notification_settings::NotificationSettingsResponse,
    predictions::{PredictionOutcomeResponse, PredictionResponse, Signal, SignalResponse},
    push::{PushKeys, PushSubscribe, PushSubscriptionResponse, PushUnsubscribe, VapidKeyResponse},
    stocks::{DailyPriceResponse, OnboardingStockResponse, StockDetailResponse, StockResponse, StockWithPriceResponse},
    users::{ReferralResponse, RegisterResponse, RegistrationType, Tier, UserRegister, UserResponse, UserUpdate},
    watchlist::{WatchlistAdd, WatchlistEntryResponse},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "AdminKey",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "tickerdeck API",
        description = "Stock-monitoring dashboard backend: watchlists, AI buy/sell signals, and web-push alerts."
    ),
    paths(
        crate::api::handlers::users::register,
        crate::api::handlers::users::get_me,
        crate::api::handlers::users::update_me,
        crate::api::handlers::users::get_referral,
        crate::api::handlers::watchlist::list_watchlist,
        crate::api::handlers::watchlist::add_to_watchlist,
        crate::api::handlers::watchlist::remove_from_watchlist,
        crate::api::handlers::stocks::list_stocks,
        crate::api::handlers::stocks::search_stocks,
        crate::api::handlers::stocks::get_stock,
        crate::api::handlers::stocks::get_prices,
        crate::api::handlers::stocks::onboarding_stocks,
        crate::api::handlers::predictions::get_signals,
        crate::api::handlers::predictions::get_prediction_history,
        crate::api::handlers::push::vapid_key,
        crate::api::handlers::push::subscribe,
        crate::api::handlers::push::unsubscribe,
        crate::api::handlers::push::send_test,
        crate::api::handlers::notification_settings::get_settings,
        crate::api::handlers::notification_settings::put_settings,
        crate::api::handlers::payments::billing_status,
        crate::api::handlers::payments::create_checkout,
        crate::api::handlers::payments::create_portal,
        crate::api::handlers::payments::webhook_handler,
        crate::api::handlers::sync::trigger_sync,
        crate::api::handlers::config::get_config,
    ),
    components(schemas(
        UserRegister,
        UserUpdate,
        UserResponse,
        RegisterResponse,
        ReferralResponse,
        RegistrationType,
        Tier,
        WatchlistAdd,
        WatchlistEntryResponse,
        StockResponse,
        StockWithPriceResponse,
        StockDetailResponse,
        DailyPriceResponse,
        OnboardingStockResponse,
        Signal,
        PredictionResponse,
        PredictionOutcomeResponse,
        SignalResponse,
        PushKeys,
        PushSubscribe,
        PushUnsubscribe,
        PushSubscriptionResponse,
        VapidKeyResponse,
        NotificationSettingsResponse,
        BillingStatusResponse,
        CheckoutSessionResponse,
        BillingPortalResponse,
        ClientConfigResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "users", description = "Registration and profiles"),
        (name = "watchlist", description = "Per-user watchlists"),
        (name = "stocks", description = "Market data"),
        (name = "signals", description = "Model signals and prediction history"),
        (name = "push", description = "Web-push subscriptions and settings"),
        (name = "billing", description = "Subscription billing"),
        (name = "admin", description = "Operational endpoints"),
        (name = "config", description = "Client bootstrap"),
    )
)]
pub struct ApiDoc;
