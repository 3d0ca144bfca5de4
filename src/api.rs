use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use http::{HeaderName, HeaderValue, header};
use tower_http::{
    compression::CompressionLayer,
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{auth::Authenticator, core::Strategy, db::Db, limiter::Limiter};

mod auth;
mod error;
mod models;
mod overlaps;
mod rates;
mod suppliers;

pub struct AppState {
    pub db: Db,
    pub authenticator: Authenticator,
    pub strategy: Strategy,

    /// Serve the configured user table, only ever meant for local demos.
    pub expose_demo_credentials: bool,
}

/// Request limiters of the respective route groups.
pub struct Limiters {
    pub global: Arc<Limiter>,
    pub api: Arc<Limiter>,
    pub auth: Arc<Limiter>,
}

const CONTENT_SECURITY_POLICY: &str = "default-src 'none'; frame-ancestors 'none'";

const STRICT_TRANSPORT_SECURITY: &str = "max-age=31536000; includeSubDomains; preload";

pub fn router(state: AppState, limiters: Limiters, hsts: bool) -> Router {
    let auth_routes = {
        let routes = Router::new()
            .route("/login", post(auth::login))
            .route("/token", post(auth::login));
        let mut unversioned_routes = routes.clone();
        if state.expose_demo_credentials {
            unversioned_routes =
                unversioned_routes.route("/demo-credentials", get(auth::demo_credentials));
        }
        Router::new()
            .nest("/api/auth", unversioned_routes)
            .nest("/api/v1/auth", routes)
            .layer(from_fn_with_state(limiters.auth, crate::limiter::enforce))
    };

    let api_routes = Router::new()
        .route("/api/v1/suppliers", get(suppliers::list).post(suppliers::create))
        .route("/api/v1/suppliers/overlaps", get(overlaps::get))
        .route(
            "/api/v1/suppliers/{id}",
            get(suppliers::get).put(suppliers::update).delete(suppliers::delete),
        )
        .route("/api/v1/rates", get(rates::list).post(rates::create))
        .route("/api/v1/rates/{id}", get(rates::get).put(rates::update).delete(rates::delete))
        .layer(from_fn_with_state(limiters.api, crate::limiter::enforce));

    let router = Router::new()
        .merge(auth_routes)
        .merge(api_routes)
        .with_state(Arc::new(state))
        .layer(from_fn_with_state(limiters.global, crate::limiter::enforce))
        .layer((
            security_header(header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
            security_header(header::X_FRAME_OPTIONS, "DENY"),
            security_header(header::X_XSS_PROTECTION, "1; mode=block"),
            security_header(header::REFERRER_POLICY, "strict-origin-when-cross-origin"),
            security_header(header::CONTENT_SECURITY_POLICY, CONTENT_SECURITY_POLICY),
        ));
    let router = if hsts {
        router.layer(security_header(header::STRICT_TRANSPORT_SECURITY, STRICT_TRANSPORT_SECURITY))
    } else {
        router
    };
    router.layer((
        TraceLayer::new_for_http(),
        TimeoutLayer::new(Duration::from_secs(10)),
        CompressionLayer::new(),
    ))
}

fn security_header(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
}
