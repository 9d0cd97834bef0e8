//! HTTP API for the queue announcer.
//!
//! Runs on port 2004 by default. CORS-permissive so a counter display page
//! can call it from another origin.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use antrian_core::counter::{CounterError, TicketCounter};
use antrian_core::sequence::PlaybackSegment;
use antrian_core::types::{AnnouncerConfig, CounterStatus, PlayerStatus, TicketConfig};
use antrian_core::{AnnounceError, plan_announcement, plan_identifier};

use crate::assets::AssetDirectory;
use crate::player::{Playback, PlayerError};

/// Shared server state.
pub struct AppState {
    pub player: Box<dyn Playback>,
    pub assets: AssetDirectory,
    pub announcer: AnnouncerConfig,
    pub counter: Mutex<TicketCounter>,
}

impl AppState {
    /// Tickets are never printed past what the announcer will speak.
    pub fn new(
        player: impl Playback + 'static,
        assets: AssetDirectory,
        announcer: AnnouncerConfig,
        mut tickets: TicketConfig,
    ) -> Result<Self, CounterError> {
        tickets.max_number = match (tickets.max_number, announcer.max_number) {
            (Some(t), Some(a)) => Some(t.min(a)),
            (t, a) => t.or(a),
        };
        Ok(Self {
            player: Box::new(player),
            assets,
            announcer,
            counter: Mutex::new(TicketCounter::new(tickets)?),
        })
    }

    fn counter(&self) -> std::sync::MutexGuard<'_, TicketCounter> {
        self.counter.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn play(&self, segments: &[PlaybackSegment]) -> Result<(), ApiError> {
        self.player.announce(segments, &self.assets)?;
        Ok(())
    }
}

/// Build the axum router with shared [`AppState`].
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/announce", post(announce))
        .route("/print", post(print))
        .route("/call", post(call))
        .route("/recall", post(recall))
        .route("/reset", post(reset))
        .route("/stop", post(stop))
        .route("/status", get(status))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run `f` on the blocking pool. Planning stats clip files on disk.
async fn blocking<T, F>(state: &Arc<AppState>, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> Result<T, ApiError> + Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| ApiError::Unavailable(format!("planning task failed: {e}")))?
}

// ─── Errors ────────────────────────────────────────────────────────────────

enum ApiError {
    BadRequest(String),
    Conflict(String),
    Unavailable(String),
}

impl From<AnnounceError> for ApiError {
    fn from(e: AnnounceError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<CounterError> for ApiError {
    fn from(e: CounterError) -> Self {
        ApiError::Conflict(e.to_string())
    }
}

impl From<PlayerError> for ApiError {
    fn from(e: PlayerError) -> Self {
        ApiError::Unavailable(e.to_string())
    }
}

#[derive(serde::Serialize)]
struct ErrorResponse {
    ok: bool,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(e) => (StatusCode::BAD_REQUEST, e),
            ApiError::Conflict(e) => (StatusCode::CONFLICT, e),
            ApiError::Unavailable(e) => (StatusCode::SERVICE_UNAVAILABLE, e),
        };
        warn!("api: {error}");
        (status, Json(ErrorResponse { ok: false, error })).into_response()
    }
}

// ─── Handlers ──────────────────────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct AnnounceRequest {
    queue: String,
}

#[derive(serde::Serialize)]
struct AnnounceResponse {
    ok: bool,
    queue: String,
    segments: Vec<PlaybackSegment>,
}

#[derive(serde::Serialize)]
struct TicketResponse {
    ok: bool,
    ticket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    segments: Option<Vec<PlaybackSegment>>,
}

#[derive(serde::Serialize)]
struct OkResponse {
    ok: bool,
}

#[derive(serde::Serialize)]
struct StatusResponse {
    counter: CounterStatus,
    player: PlayerStatus,
}

async fn announce(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnnounceRequest>,
) -> Result<Json<AnnounceResponse>, ApiError> {
    let plan = blocking(&state, move |s| {
        Ok(plan_announcement(&req.queue, &s.announcer, &s.assets)?)
    })
    .await?;
    state.play(&plan.segments)?;
    info!("announce: {} ({} segments)", plan.identifier, plan.segments.len());
    Ok(Json(AnnounceResponse {
        ok: true,
        queue: plan.identifier.to_string(),
        segments: plan.segments,
    }))
}

async fn print(State(state): State<Arc<AppState>>) -> Result<Json<TicketResponse>, ApiError> {
    let ticket = {
        let mut counter = state.counter();
        let t = counter.print()?;
        counter.format(&t)
    };
    info!("print: {ticket}");
    Ok(Json(TicketResponse {
        ok: true,
        ticket: Some(ticket),
        segments: None,
    }))
}

/// The counter only moves once the ticket has been planned and queued.
async fn call(State(state): State<Arc<AppState>>) -> Result<Json<TicketResponse>, ApiError> {
    let (label, segments) = blocking(&state, |s| {
        let mut counter = s.counter();
        let ticket = counter.next_call();
        let plan = plan_identifier(ticket, &s.announcer, &s.assets)?;
        s.play(&plan.segments)?;
        counter.call();
        Ok((counter.format(&ticket), plan.segments))
    })
    .await?;
    info!("call: {label}");
    Ok(Json(TicketResponse {
        ok: true,
        ticket: Some(label),
        segments: Some(segments),
    }))
}

async fn recall(State(state): State<Arc<AppState>>) -> Result<Json<TicketResponse>, ApiError> {
    let recalled = blocking(&state, |s| {
        let Some((ticket, label)) = ({
            let counter = s.counter();
            counter.recall().map(|t| (t, counter.format(&t)))
        }) else {
            return Ok(None);
        };
        let plan = plan_identifier(ticket, &s.announcer, &s.assets)?;
        s.play(&plan.segments)?;
        Ok(Some((label, plan.segments)))
    })
    .await?;

    match recalled {
        Some((label, segments)) => {
            info!("recall: {label}");
            Ok(Json(TicketResponse {
                ok: true,
                ticket: Some(label),
                segments: Some(segments),
            }))
        }
        None => {
            info!("recall: nothing called yet");
            Ok(Json(TicketResponse {
                ok: true,
                ticket: None,
                segments: None,
            }))
        }
    }
}

async fn reset(State(state): State<Arc<AppState>>) -> Json<OkResponse> {
    state.counter().reset();
    info!("reset: counter cleared");
    Json(OkResponse { ok: true })
}

async fn stop(State(state): State<Arc<AppState>>) -> Json<OkResponse> {
    state.player.stop();
    Json(OkResponse { ok: true })
}

async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        counter: state.counter().status(),
        player: state.player.status(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use antrian_core::types::{AssetConfig, PlayerState};
    use serde_json::{Value, json};

    /// Records every announcement instead of playing it.
    #[derive(Clone, Default)]
    struct RecordingPlayer {
        played: Arc<Mutex<Vec<Vec<String>>>>,
        closed: bool,
    }

    impl RecordingPlayer {
        fn played(&self) -> Vec<Vec<String>> {
            self.played.lock().unwrap().clone()
        }
    }

    impl Playback for RecordingPlayer {
        fn announce(
            &self,
            segments: &[PlaybackSegment],
            _assets: &AssetDirectory,
        ) -> Result<usize, PlayerError> {
            if self.closed {
                return Err(PlayerError::Closed);
            }
            let ids = segments.iter().map(|s| s.segment_id.to_string()).collect();
            self.played.lock().unwrap().push(ids);
            Ok(segments.len())
        }

        fn stop(&self) {}

        fn status(&self) -> PlayerStatus {
            PlayerStatus {
                state: PlayerState::Idle,
                announcements: 0,
            }
        }
    }

    const CLIPS: &[&str] = &[
        "chime.wav",
        "prefix.wav",
        "letter_A.wav",
        "1.wav",
        "2.wav",
        "20.wav",
        "suffix.wav",
    ];

    struct TestServer {
        base: String,
        player: RecordingPlayer,
        _audio: tempfile::TempDir,
    }

    async fn serve(player: RecordingPlayer, announcer: AnnouncerConfig) -> TestServer {
        let audio = tempfile::tempdir().unwrap();
        for f in CLIPS {
            std::fs::write(audio.path().join(f), b"RIFF").unwrap();
        }
        let assets = AssetDirectory::new(AssetConfig {
            audio_dir: audio.path().to_path_buf(),
            ..Default::default()
        });
        let state =
            AppState::new(player.clone(), assets, announcer, TicketConfig::default()).unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router(Arc::new(state))).await });

        TestServer {
            base: format!("http://{addr}"),
            player,
            _audio: audio,
        }
    }

    impl TestServer {
        async fn post(&self, path: &str, body: Option<Value>) -> (StatusCode, Value) {
            let mut req = reqwest::Client::new().post(format!("{}{path}", self.base));
            if let Some(body) = body {
                req = req.json(&body);
            }
            let resp = req.send().await.unwrap();
            let status = StatusCode::from_u16(resp.status().as_u16()).unwrap();
            (status, resp.json().await.unwrap())
        }

        async fn counter(&self) -> Value {
            let resp = reqwest::get(format!("{}/status", self.base)).await.unwrap();
            let body: Value = resp.json().await.unwrap();
            body["counter"].clone()
        }
    }

    #[tokio::test]
    async fn announce_plays_available_segments() {
        let server = serve(RecordingPlayer::default(), AnnouncerConfig::default()).await;
        let (status, body) = server.post("/announce", Some(json!({"queue": " a22 "}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["queue"], "A22");
        assert_eq!(body["segments"][0], json!({"segmentId": "chime", "pauseAfterMs": 500}));
        assert_eq!(
            server.player.played(),
            vec![vec!["chime", "prefix", "letter_A", "20", "2", "suffix"]]
        );
    }

    #[tokio::test]
    async fn malformed_queue_is_a_bad_request() {
        let server = serve(RecordingPlayer::default(), AnnouncerConfig::default()).await;
        let (status, body) = server.post("/announce", Some(json!({"queue": "AB22"}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
        assert!(body["error"].as_str().unwrap().contains("AB22"));
        assert!(server.player.played().is_empty());
    }

    #[tokio::test]
    async fn out_of_range_is_a_bad_request() {
        let server = serve(RecordingPlayer::default(), AnnouncerConfig::default()).await;
        let (status, body) = server.post("/announce", Some(json!({"queue": "1000"}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
        assert!(server.player.played().is_empty());
    }

    #[tokio::test]
    async fn recall_before_any_call() {
        let server = serve(RecordingPlayer::default(), AnnouncerConfig::default()).await;
        let (status, body) = server.post("/recall", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true, "ticket": null}));
        assert!(server.player.played().is_empty());
    }

    #[tokio::test]
    async fn call_before_any_print_calls_one() {
        let server = serve(RecordingPlayer::default(), AnnouncerConfig::default()).await;
        let (status, body) = server.post("/call", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ticket"], "A001");
        assert_eq!(
            server.counter().await,
            json!({"nextTicket": "A002", "currentTicket": "A001"})
        );

        let (_, body) = server.post("/recall", None).await;
        assert_eq!(body["ticket"], "A001");
        assert_eq!(server.player.played().len(), 2);
    }

    #[tokio::test]
    async fn printing_stops_at_the_announcer_bound() {
        let announcer = AnnouncerConfig {
            max_number: Some(2),
            ..Default::default()
        };
        let server = serve(RecordingPlayer::default(), announcer).await;
        assert_eq!(server.post("/print", None).await.1["ticket"], "A001");
        assert_eq!(server.post("/print", None).await.1["ticket"], "A002");

        let (status, body) = server.post("/print", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["ok"], false);

        let (status, body) = server.post("/call", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ticket"], "A002");
        assert_eq!(
            server.counter().await,
            json!({"nextTicket": null, "currentTicket": "A002"})
        );
    }

    #[tokio::test]
    async fn failed_call_leaves_counter_untouched() {
        let player = RecordingPlayer {
            closed: true,
            ..Default::default()
        };
        let server = serve(player, AnnouncerConfig::default()).await;
        server.post("/print", None).await;

        let (status, body) = server.post("/call", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["ok"], false);
        assert_eq!(
            server.counter().await,
            json!({"nextTicket": "A002", "currentTicket": null})
        );
    }

    #[tokio::test]
    async fn reset_clears_counter() {
        let server = serve(RecordingPlayer::default(), AnnouncerConfig::default()).await;
        server.post("/print", None).await;
        server.post("/call", None).await;

        let (status, body) = server.post("/reset", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true}));
        assert_eq!(
            server.counter().await,
            json!({"nextTicket": "A001", "currentTicket": null})
        );
    }

    #[test]
    fn state_rejects_invalid_ticket_letter() {
        let result = AppState::new(
            RecordingPlayer::default(),
            AssetDirectory::new(AssetConfig::default()),
            AnnouncerConfig::default(),
            TicketConfig {
                letter: Some('#'),
                ..Default::default()
            },
        );
        assert_eq!(result.err(), Some(CounterError::InvalidLetter('#')));
    }
}
