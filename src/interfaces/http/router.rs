//! Router assembly

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::guards::{anonymous_required, login_required, owner_required};
use super::modules::accounts;
use super::modules::health::{health_check, HealthState};
use super::modules::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use super::modules::request_id::request_id_middleware;
use super::routes::{HOME, SIGN_IN, SIGN_OUT, SIGN_UP, USER_DELETE, USER_PAGE, USER_UPDATE};
use super::session::session_middleware;
use super::state::AppState;

/// Account pages behind the session middleware.
pub fn create_router(state: AppState) -> Router {
    let anonymous = Router::new()
        .route(SIGN_UP, get(accounts::sign_up_page).post(accounts::sign_up))
        .route(SIGN_IN, get(accounts::sign_in_page).post(accounts::sign_in))
        .route_layer(middleware::from_fn(anonymous_required));

    let members = Router::new()
        .route(SIGN_OUT, get(accounts::sign_out))
        .route(USER_PAGE, get(accounts::user_page))
        .route_layer(middleware::from_fn(login_required));

    // Layers added later run first: login is checked before ownership.
    let owners = Router::new()
        .route(USER_UPDATE, get(accounts::update_page).post(accounts::update))
        .route(USER_DELETE, get(accounts::delete_page).post(accounts::delete))
        .route_layer(middleware::from_fn_with_state(state.clone(), owner_required))
        .route_layer(middleware::from_fn(login_required));

    Router::new()
        .route(HOME, get(accounts::home))
        .merge(anonymous)
        .merge(members)
        .merge(owners)
        .layer(middleware::from_fn_with_state(state.clone(), session_middleware))
        .with_state(state)
}

/// Full application: account pages, `/health`, optional `/metrics`,
/// request ids, HTTP metrics and tracing.
pub fn create_app(state: AppState, health: HealthState, metrics: Option<MetricsState>) -> Router {
    let mut app = create_router(state).merge(
        Router::new()
            .route("/health", get(health_check))
            .with_state(health),
    );

    if let Some(metrics) = metrics {
        app = app.merge(
            Router::new()
                .route("/metrics", get(prometheus_metrics))
                .with_state(metrics),
        );
    }

    app.layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}
