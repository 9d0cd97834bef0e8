//! Announcement player — segment list → rodio playback with real pauses.
//!
//! ```text
//! announce([chime, prefix, 20, 2, suffix]) → [cmd_tx] → playback thread:
//!     decode chime.wav → sink, 500 ms silence → sink, decode prefix.wav → sink, …
//! ```
//!
//! The rodio `OutputStream` is `!Send`, so it lives on a dedicated OS thread
//! that owns the sink. Announcements queue behind each other on the sink and
//! play gaplessly; pauses are explicit silent sources, so timing does not
//! depend on thread scheduling.

use std::collections::VecDeque;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use rodio::source::Zero;
use rodio::{Decoder, OutputStream, Sink, Source};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, warn};

use antrian_core::sequence::{PlaybackSegment, SegmentId};
use antrian_core::types::{PlayerState, PlayerStatus};

use crate::assets::AssetDirectory;

/// How often the playback thread checks the sink for finished announcements.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("failed to open audio output: {0}")]
    Output(String),
    #[error("playback thread is not running")]
    Closed,
}

/// Plays planned announcements. [`AnnouncePlayer`] is the rodio-backed
/// implementation; the HTTP layer only needs this much of it.
pub trait Playback: Send + Sync {
    /// Queue one announcement. Returns the number of segments queued.
    fn announce(
        &self,
        segments: &[PlaybackSegment],
        assets: &AssetDirectory,
    ) -> Result<usize, PlayerError>;

    /// Stop playback and drop everything queued.
    fn stop(&self);

    fn status(&self) -> PlayerStatus;
}

/// Cloneable handle to the playback thread. All methods are non-blocking.
#[derive(Clone)]
pub struct AnnouncePlayer {
    play_cmd_tx: mpsc::Sender<PlayCmd>,
    status_tx: watch::Sender<PlayerStatus>,
    status_rx: watch::Receiver<PlayerStatus>,
}

// ─── Internal types ────────────────────────────────────────────────────────

enum PlayCmd {
    Announce(Vec<ResolvedSegment>),
    Stop,
}

struct ResolvedSegment {
    id: SegmentId,
    path: PathBuf,
    pause: Duration,
}

// ─── Construction ──────────────────────────────────────────────────────────

impl AnnouncePlayer {
    /// Spawn the playback thread on the default output device.
    pub fn new() -> Result<Self, PlayerError> {
        let (status_tx, status_rx) = watch::channel(PlayerStatus {
            state: PlayerState::Idle,
            announcements: 0,
        });

        let (play_cmd_tx, play_cmd_rx) = mpsc::channel::<PlayCmd>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), String>>(1);
        let thread_status_tx = status_tx.clone();
        std::thread::Builder::new()
            .name("antrian-playback".into())
            .spawn(move || playback_thread(play_cmd_rx, thread_status_tx, ready_tx))
            .map_err(|e| PlayerError::Output(format!("failed to spawn playback thread: {e}")))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(PlayerError::Output(e)),
            Err(_) => return Err(PlayerError::Closed),
        }

        Ok(Self {
            play_cmd_tx,
            status_tx,
            status_rx,
        })
    }

    /// Queue one announcement. Returns the number of segments queued.
    ///
    /// Segments are resolved to files here; a file that cannot be decoded
    /// at play time is skipped together with its pause.
    pub fn announce(
        &self,
        segments: &[PlaybackSegment],
        assets: &AssetDirectory,
    ) -> Result<usize, PlayerError> {
        let resolved: Vec<ResolvedSegment> = segments
            .iter()
            .map(|s| ResolvedSegment {
                id: s.segment_id,
                path: assets.path_for(&s.segment_id),
                pause: Duration::from_millis(s.pause_after_ms),
            })
            .collect();
        let n = resolved.len();

        self.status_tx.send_modify(|s| {
            s.announcements += 1;
            s.state = PlayerState::Playing;
        });
        if self.play_cmd_tx.send(PlayCmd::Announce(resolved)).is_err() {
            self.status_tx.send_modify(|s| {
                s.announcements = 0;
                s.state = PlayerState::Idle;
            });
            return Err(PlayerError::Closed);
        }
        Ok(n)
    }

    /// Stop playback and drop everything queued.
    pub fn stop(&self) {
        let _ = self.play_cmd_tx.send(PlayCmd::Stop);
    }

    /// Get current status.
    pub fn status(&self) -> PlayerStatus {
        self.status_rx.borrow().clone()
    }

    /// Subscribe to status changes.
    pub fn subscribe_status(&self) -> watch::Receiver<PlayerStatus> {
        self.status_rx.clone()
    }

    /// Wait until every queued announcement has finished playing.
    pub async fn wait_idle(&self) {
        let mut rx = self.status_rx.clone();
        let _ = rx.wait_for(|s| s.state == PlayerState::Idle).await;
    }
}

impl Playback for AnnouncePlayer {
    fn announce(
        &self,
        segments: &[PlaybackSegment],
        assets: &AssetDirectory,
    ) -> Result<usize, PlayerError> {
        AnnouncePlayer::announce(self, segments, assets)
    }

    fn stop(&self) {
        AnnouncePlayer::stop(self)
    }

    fn status(&self) -> PlayerStatus {
        AnnouncePlayer::status(self)
    }
}

// ─── Playback OS thread ───────────────────────────────────────────────────

fn playback_thread(
    cmd_rx: mpsc::Receiver<PlayCmd>,
    status_tx: watch::Sender<PlayerStatus>,
    ready_tx: mpsc::SyncSender<Result<(), String>>,
) {
    let (_stream, stream_handle) = match OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            error!("playback: failed to open audio output: {e}");
            let _ = ready_tx.send(Err(e.to_string()));
            return;
        }
    };
    let mut sink = match Sink::try_new(&stream_handle) {
        Ok(sink) => sink,
        Err(e) => {
            error!("playback: failed to create sink: {e}");
            let _ = ready_tx.send(Err(e.to_string()));
            return;
        }
    };
    let _ = ready_tx.send(Ok(()));

    // Sources appended per announcement, oldest first.
    let mut pending: VecDeque<usize> = VecDeque::new();

    loop {
        match cmd_rx.recv_timeout(POLL_INTERVAL) {
            Ok(PlayCmd::Announce(segments)) => {
                let appended = append_announcement(&sink, segments);
                debug!("playback: announcement queued ({appended} sources)");
                pending.push_back(appended);
            }
            Ok(PlayCmd::Stop) => {
                sink.stop();
                let dropped = pending.len();
                pending.clear();
                mark_finished(&status_tx, dropped);
                match Sink::try_new(&stream_handle) {
                    Ok(fresh) => sink = fresh,
                    Err(e) => {
                        error!("playback: failed to recreate sink: {e}");
                        break;
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                sink.stop();
                break;
            }
        }

        let finished = settle_finished(&mut pending, sink.len());
        mark_finished(&status_tx, finished);
    }

    status_tx.send_modify(|s| {
        s.announcements = 0;
        s.state = PlayerState::Idle;
    });
}

/// Count `finished` announcements as done. The handle counts an announcement
/// before this thread receives it, so the total never drops below what is
/// still in the channel.
fn mark_finished(status_tx: &watch::Sender<PlayerStatus>, finished: usize) {
    if finished == 0 {
        return;
    }
    status_tx.send_modify(|s| {
        s.announcements = s.announcements.saturating_sub(finished);
        if s.announcements == 0 {
            s.state = PlayerState::Idle;
        }
    });
}

/// Decode each segment and append it, followed by its pause, to the sink.
/// Returns the number of sources appended.
fn append_announcement(sink: &Sink, segments: Vec<ResolvedSegment>) -> usize {
    let mut appended = 0;
    for seg in segments {
        let source = match File::open(&seg.path)
            .map_err(|e| e.to_string())
            .and_then(|f| Decoder::new(BufReader::new(f)).map_err(|e| e.to_string()))
        {
            Ok(source) => source,
            Err(e) => {
                warn!("playback: skipping {} ({}): {e}", seg.id, seg.path.display());
                continue;
            }
        };

        let (channels, sample_rate) = (source.channels(), source.sample_rate());
        sink.append(source);
        appended += 1;

        if !seg.pause.is_zero() {
            sink.append(Zero::<f32>::new(channels, sample_rate).take_duration(seg.pause));
            appended += 1;
        }
    }
    appended
}

/// Drop announcements whose sources have all left the sink. `remaining` is
/// the sink's current queue length. Returns how many were dropped.
fn settle_finished(pending: &mut VecDeque<usize>, remaining: usize) -> usize {
    let mut queued: usize = pending.iter().sum();
    let mut finished = 0;
    while let Some(&front) = pending.front() {
        if queued - front < remaining {
            break;
        }
        pending.pop_front();
        queued -= front;
        finished += 1;
    }
    finished
}
