//! Axum router wiring for the console API and ops endpoints.

use axum::{routing::get, Router};

use crate::{api, app_state::AppState, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/catalog/teams", get(api::catalog::teams))
        .route("/v1/catalog/models", get(api::catalog::models))
        .route(
            "/v1/policies",
            get(api::policies::list).post(api::policies::create),
        )
        .route(
            "/v1/policies/:id",
            get(api::policies::get)
                .put(api::policies::update)
                .delete(api::policies::delete),
        )
        .route("/v1/policies/:id/available", get(api::policies::available))
        .route("/v1/evaluate", axum::routing::post(api::evaluate::evaluate))
        .route(
            "/v1/simulations",
            get(api::simulations::list)
                .post(api::simulations::run)
                .delete(api::simulations::clear),
        )
        .route(
            "/v1/requests",
            get(api::requests::list).delete(api::requests::clear),
        )
        .route("/v1/live", get(api::live::get).put(api::live::put))
        .route("/healthz", get(ops::healthz))
        .route("/metrics", get(ops::metrics))
        .with_state(state)
}
