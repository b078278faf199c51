use axum::extract::{Extension, Json, Path};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::api::DynAPI;
use crate::engine::{SessionState, Snapshot, EVENT_BUFFER};
use crate::entities::Coordinates;
use crate::error::Error;

#[derive(Serialize, Deserialize)]
pub struct TapParams {
    latitude: f64,
    longitude: f64,
    wkid: Option<u32>,
}

pub async fn tap(Extension(api): Extension<DynAPI>, Json(params): Json<TapParams>) -> StatusCode {
    let mut location = Coordinates::new(params.latitude, params.longitude);
    if let Some(wkid) = params.wkid {
        location = location.with_spatial_reference(wkid);
    }

    api.handle_tap(location).await;

    StatusCode::ACCEPTED
}

pub async fn reset(Extension(api): Extension<DynAPI>) -> StatusCode {
    api.reset().await;

    StatusCode::ACCEPTED
}

pub async fn select_direction(
    Extension(api): Extension<DynAPI>,
    Path(index): Path<usize>,
) -> StatusCode {
    api.select_direction(index).await;

    StatusCode::ACCEPTED
}

pub async fn find(Extension(api): Extension<DynAPI>) -> Result<Json<Snapshot>, Error> {
    let snapshot = api.snapshot().await?;

    Ok(snapshot.into())
}

pub async fn state(Extension(api): Extension<DynAPI>) -> Result<Json<SessionState>, Error> {
    let state = api.current_state().await?;

    Ok(state.into())
}

pub async fn events(
    Extension(api): Extension<DynAPI>,
) -> Result<Sse<impl Stream<Item = Result<Event, serde_json::Error>>>, Error> {
    let (tx, rx) = async_channel::bounded(EVENT_BUFFER);
    api.subscribe(Box::new(tx)).await?;

    let stream = rx.map(|event| Event::default().event(event.name()).json_data(event));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RouteSolver;
    use crate::engine::{Engine, Settings, Status};
    use crate::entities::{SolvedRoute, Stop};
    use async_trait::async_trait;
    use axum::body::HttpBody;
    use axum::response::IntoResponse;
    use std::sync::Arc;

    struct FixedSolver;

    #[async_trait]
    impl RouteSolver for FixedSolver {
        async fn solve(&self, _stops: Vec<Stop>) -> Result<SolvedRoute, Error> {
            Ok(SolvedRoute::new("Route1".into(), 12.0, 4500.0))
        }
    }

    fn api() -> DynAPI {
        Arc::new(Engine::new(Arc::new(FixedSolver), Settings::default()))
    }

    fn tap_params(latitude: f64, longitude: f64) -> Json<TapParams> {
        Json(TapParams {
            latitude,
            longitude,
            wkid: None,
        })
    }

    #[tokio::test]
    async fn taps_drive_the_session() {
        let api = api();
        let events = api.clone();

        let (tx, rx) = async_channel::unbounded();
        events.subscribe(Box::new(tx)).await.unwrap();

        let status = tap(Extension(api.clone()), tap_params(32.0, -117.0)).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        tap(Extension(api.clone()), tap_params(32.1, -117.2)).await;

        for _ in 0..3 {
            rx.recv().await.unwrap();
        }

        let Json(snapshot) = find(Extension(api.clone())).await.unwrap();
        assert!(matches!(snapshot.status, Status::Inspecting { .. }));
        assert_eq!(snapshot.stops.len(), 2);

        reset(Extension(api.clone())).await;
        let Json(current) = state(Extension(api)).await.unwrap();
        assert_eq!(current, SessionState::AwaitingOrigin);
    }

    #[tokio::test]
    async fn streams_events_as_server_sent_events() {
        let api = api();

        let mut body = events(Extension(api.clone()))
            .await
            .unwrap()
            .into_response()
            .into_body();

        tap(Extension(api), tap_params(32.0, -117.0)).await;

        let chunk = body.data().await.unwrap().unwrap();
        let text = String::from_utf8(chunk.to_vec()).unwrap();

        assert!(text.starts_with("event: origin_placed\n"));
        assert!(text.contains(r#""name":"origin_placed""#));
    }
}
