mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};

use crate::server::handlers::session;
use crate::{
    api::{DynAPI, SessionAPI},
    error::{unexpected_error, Error},
};

pub fn router(api: DynAPI) -> Router {
    Router::new()
        .route("/session", get(session::find))
        .route("/session/state", get(session::state))
        .route("/session/events", get(session::events))
        .route("/session/taps", post(session::tap))
        .route("/session/reset", post(session::reset))
        .route(
            "/session/directions/:index/select",
            post(session::select_direction),
        )
        .layer(Extension(api))
}

pub async fn serve<T: SessionAPI + Sync + Send + 'static>(
    api: T,
    addr: SocketAddr,
) -> Result<(), Error> {
    let api = Arc::new(api) as DynAPI;

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(router(api).into_make_service())
        .await
        .map_err(|err| {
            tracing::error!("server error: {}", err);
            unexpected_error()
        })
}
