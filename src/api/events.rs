//! Push notifications relayed to the browser as Server-Sent Events

use std::convert::Infallible;

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use serde::Deserialize;
use tokio_stream::{Stream, StreamExt};
use utoipa::IntoParams;

use crate::{
    error::{AppError, AppResult},
    realtime::{HubConnection, HubEvent},
    session::SessionAccessor,
    AppState,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventFilter {
    /// Only relay invocations of this hub target (case-insensitive)
    pub target: Option<String>,
}

impl EventFilter {
    fn accepts(&self, event: &HubEvent) -> bool {
        self.target
            .as_deref()
            .map_or(true, |target| event.target.eq_ignore_ascii_case(target))
    }
}

fn to_sse(event: &HubEvent) -> Option<Event> {
    match Event::default().event(event.target.as_str()).json_data(&event.arguments) {
        Ok(sse) => Some(sse),
        Err(e) => {
            tracing::warn!(hub_target = %event.target, "Dropping unencodable hub event: {}", e);
            None
        }
    }
}

/// Stream the caller's hub notifications
///
/// Each SSE event is named after the hub target and carries the invocation
/// arguments as a JSON array. The hub connection lives as long as the
/// stream.
#[utoipa::path(
    get,
    path = "/events",
    tag = "events",
    params(EventFilter),
    responses(
        (status = 200, description = "text/event-stream of hub invocations"),
        (status = 303, description = "Not signed in")
    )
)]
pub async fn stream(
    State(state): State<AppState>,
    session: SessionAccessor,
    Query(filter): Query<EventFilter>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let token = session.access_token();
    if token.is_empty() {
        return Err(AppError::Unauthenticated {
            redirect: state.config.session.login_path.clone(),
        });
    }

    tracing::debug!(hub_target = ?filter.target, "Opening hub event stream");

    let events = HubConnection::connect(&state.config.realtime, Some(token))
        .into_events()
        .filter(move |event| filter.accepts(event))
        .filter_map(|event| to_sse(&event))
        .map(Ok::<Event, Infallible>);

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(target: &str) -> HubEvent {
        HubEvent {
            target: target.to_string(),
            arguments: vec![json!({ "id": "n-1" })],
        }
    }

    #[test]
    fn test_filter_matches_target_case_insensitively() {
        let filter = EventFilter {
            target: Some("receivenotification".to_string()),
        };
        assert!(filter.accepts(&event("ReceiveNotification")));
        assert!(!filter.accepts(&event("TrainingProgress")));
        assert!(EventFilter::default().accepts(&event("Anything")));
    }

    #[test]
    fn test_event_encoding() {
        assert!(to_sse(&event("ReceiveNotification")).is_some());
    }
}
