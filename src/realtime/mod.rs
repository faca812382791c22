//! Push-notification hub connection
//!
//! One supervisor task per connection keeps a websocket to the hub open,
//! reconnecting with jittered exponential backoff. Invocations are fanned
//! out on a broadcast channel: delivery is at-most-once and a subscriber
//! that falls behind loses events.

pub mod protocol;

use std::{
    pin::Pin,
    task::{ready, Context, Poll},
    time::Duration,
};

use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use serde_json::Value;
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
    time::{interval_at, Instant},
};
use tokio_stream::{
    wrappers::{errors::BroadcastStreamRecvError, BroadcastStream},
    Stream,
};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        client::IntoClientRequest,
        http::{header::AUTHORIZATION, HeaderValue},
        Message,
    },
};

use crate::config::RealtimeConfig;

pub use protocol::{HubError, HubEvent, HubMessage};

const EVENT_BUFFER: usize = 256;

/// Jittered exponential backoff between reconnect attempts
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    attempt: u32,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max: max.max(initial),
            attempt: 0,
        }
    }

    /// Delay before the next attempt; grows until it reaches the cap
    pub fn next_delay(&mut self) -> Duration {
        let factor = 1u32.checked_shl(self.attempt.min(16)).unwrap_or(u32::MAX);
        let base = self.initial.saturating_mul(factor).min(self.max);
        self.attempt = self.attempt.saturating_add(1);

        let half = base / 2;
        let jitter_ms = rand::thread_rng().gen_range(0..=half.as_millis() as u64);
        half + Duration::from_millis(jitter_ms)
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

/// Handle on a hub connection. Dropping it stops the connection.
pub struct HubConnection {
    events: broadcast::Sender<HubEvent>,
    task: JoinHandle<()>,
}

impl HubConnection {
    /// Start connecting in the background; never fails up front
    pub fn connect(config: &RealtimeConfig, token: Option<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let backoff = Backoff::new(
            Duration::from_millis(config.reconnect_initial_ms),
            Duration::from_millis(config.reconnect_max_ms),
        );
        let keep_alive = Duration::from_secs(config.keep_alive_seconds.max(1));

        let task = tokio::spawn(supervise(
            config.hub_url.clone(),
            token,
            backoff,
            keep_alive,
            events.clone(),
        ));

        Self { events, task }
    }

    /// Run `callback` for every invocation of `target` (case-insensitive)
    pub fn on<F>(&self, target: impl Into<String>, mut callback: F) -> JoinHandle<()>
    where
        F: FnMut(&[Value]) + Send + 'static,
    {
        let target = target.into();
        let mut events = self.events.subscribe();

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) if event.target.eq_ignore_ascii_case(&target) => callback(&event.arguments),
                    Ok(_) => {}
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, hub_target = %target, "Hub subscriber lagged, events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    /// Turn the connection into a stream of events; the connection lives as
    /// long as the stream
    pub fn into_events(self) -> HubEvents {
        HubEvents {
            inner: BroadcastStream::new(self.events.subscribe()),
            _connection: self,
        }
    }
}

impl Drop for HubConnection {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Event stream owning its hub connection
pub struct HubEvents {
    inner: BroadcastStream<HubEvent>,
    _connection: HubConnection,
}

impl Stream for HubEvents {
    type Item = HubEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<HubEvent>> {
        loop {
            match ready!(Pin::new(&mut self.inner).poll_next(cx)) {
                Some(Ok(event)) => return Poll::Ready(Some(event)),
                Some(Err(BroadcastStreamRecvError::Lagged(missed))) => {
                    tracing::warn!(missed, "Event stream lagged, events dropped");
                }
                None => return Poll::Ready(None),
            }
        }
    }
}

async fn supervise(
    url: String,
    token: Option<String>,
    mut backoff: Backoff,
    keep_alive: Duration,
    events: broadcast::Sender<HubEvent>,
) {
    loop {
        match run_session(&url, token.as_deref(), keep_alive, &events, &mut backoff).await {
            Ok(()) => tracing::info!(url = %url, "Hub connection closed"),
            Err(e) => tracing::warn!(url = %url, "Hub connection lost: {}", e),
        }

        let delay = backoff.next_delay();
        tracing::debug!(delay_ms = delay.as_millis() as u64, "Reconnecting to hub");
        tokio::time::sleep(delay).await;
    }
}

/// Fan one frame out. Only a close frame ends the session; frames that
/// cannot be read are skipped.
fn dispatch(frame: &str, events: &broadcast::Sender<HubEvent>) -> Result<(), HubError> {
    let message = match protocol::parse_message(frame) {
        Ok(message) => message,
        Err(e @ (HubError::Json(_) | HubError::Protocol(_))) => {
            tracing::warn!(frame, "Skipping unreadable hub frame: {}", e);
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    match message {
        HubMessage::Invocation(event) => {
            // No receivers is fine: nobody is listening right now
            let _ = events.send(event);
            Ok(())
        }
        HubMessage::Ping => Ok(()),
        HubMessage::Close { error } => Err(HubError::Closed(error)),
        HubMessage::Ignored(kind) => {
            tracing::debug!(kind, "Ignoring hub message");
            Ok(())
        }
    }
}

async fn run_session(
    url: &str,
    token: Option<&str>,
    keep_alive: Duration,
    events: &broadcast::Sender<HubEvent>,
    backoff: &mut Backoff,
) -> Result<(), HubError> {
    let mut request = url.into_client_request()?;
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| HubError::Protocol(format!("invalid token: {}", e)))?;
        request.headers_mut().insert(AUTHORIZATION, value);
    }

    let (socket, _) = connect_async(request).await?;
    let (mut sink, mut stream) = socket.split();

    sink.send(Message::Text(protocol::handshake_request())).await?;

    let mut handshaken = false;
    let mut ticker = interval_at(Instant::now() + keep_alive, keep_alive);

    loop {
        tokio::select! {
            message = stream.next() => {
                let text = match message {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => return Ok(()),
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Err(e.into()),
                };

                for frame in protocol::split_frames(&text) {
                    if !handshaken {
                        protocol::parse_handshake_response(frame)?;
                        handshaken = true;
                        backoff.reset();
                        tracing::info!(url = %url, "Connected to hub");
                        continue;
                    }
                    dispatch(frame, events)?;
                }
            }
            _ = ticker.tick() => {
                sink.send(Message::Text(protocol::ping())).await?;
            }
        }
    }
}
