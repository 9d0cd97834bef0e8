//! Segment clip generation via an OpenAI-compatible speech endpoint
//! (Kokoro-FastAPI and friends), with progress reporting via callback.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, error, info};

use antrian_core::phrases::phrase;
use antrian_core::sequence::SegmentId;
use antrian_core::types::{GenerateProgress, GeneratorConfig};
use antrian_core::wav::append_silence;

use crate::assets::AssetDirectory;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("failed to create audio dir {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("TTS request for '{segment}' failed: {source}")]
    Request {
        segment: SegmentId,
        source: reqwest::Error,
    },
    #[error("TTS server returned {status} for '{segment}': {body}")]
    Status {
        segment: SegmentId,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("TTS server sent invalid WAV for '{segment}': {reason}")]
    Wav {
        segment: SegmentId,
        reason: &'static str,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Outcome counts of a generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateSummary {
    pub created: usize,
    pub existing: usize,
    /// Segments without a phrase (the chime).
    pub skipped: usize,
    pub failed: usize,
}

/// Synthesize a clip for every id in `ids` that has a phrase.
///
/// Existing clips are kept unless `config.overwrite`. A failed segment is
/// logged and counted; only failing to create the audio dir aborts the run.
pub async fn generate_segments(
    assets: &AssetDirectory,
    config: &GeneratorConfig,
    ids: &[SegmentId],
    on_progress: impl Fn(GenerateProgress),
) -> Result<GenerateSummary, GenerateError> {
    tokio::fs::create_dir_all(assets.dir())
        .await
        .map_err(|source| GenerateError::CreateDir {
            path: assets.dir().to_path_buf(),
            source,
        })?;

    let client = reqwest::Client::new();
    let total = ids.len();
    let mut summary = GenerateSummary::default();

    for (i, id) in ids.iter().enumerate() {
        let report = |status: &str| {
            on_progress(GenerateProgress {
                segment: id.to_string(),
                done: i + 1,
                total,
                status: status.to_string(),
            })
        };

        let Some(text) = phrase(id) else {
            debug!("generate: no phrase for {id}, skipping");
            summary.skipped += 1;
            report("skipped");
            continue;
        };

        if !config.overwrite && assets.exists(id) {
            summary.existing += 1;
            report("exists");
            continue;
        }

        match generate_one(&client, assets, config, id, text).await {
            Ok(path) => {
                debug!("generate: wrote {}", path.display());
                summary.created += 1;
                report("created");
            }
            Err(e) => {
                error!("generate: {e}");
                summary.failed += 1;
                report("error");
            }
        }
    }

    info!(
        "generate: {} created, {} existing, {} skipped, {} failed",
        summary.created, summary.existing, summary.skipped, summary.failed
    );
    Ok(summary)
}

async fn generate_one(
    client: &reqwest::Client,
    assets: &AssetDirectory,
    config: &GeneratorConfig,
    id: &SegmentId,
    text: &str,
) -> Result<PathBuf, GenerateError> {
    let wav = synthesize(client, config, id, text).await?;
    let wav = append_silence(wav, config.trailing_silence_ms)
        .map_err(|reason| GenerateError::Wav { segment: *id, reason })?;

    let dest = assets.path_for(id);
    let partial = dest.with_extension(format!("{}.partial", assets.config().extension));
    tokio::fs::write(&partial, &wav)
        .await
        .map_err(|source| GenerateError::Write {
            path: partial.clone(),
            source,
        })?;
    tokio::fs::rename(&partial, &dest)
        .await
        .map_err(|source| GenerateError::Write {
            path: dest.clone(),
            source,
        })?;

    Ok(dest)
}

async fn synthesize(
    client: &reqwest::Client,
    config: &GeneratorConfig,
    id: &SegmentId,
    text: &str,
) -> Result<Vec<u8>, GenerateError> {
    let body = serde_json::json!({
        "input": text,
        "voice": config.voice,
        "model": "kokoro",
        "response_format": "wav",
        "speed": config.speed,
    });

    debug!("generate: POST {id} ({text:?})");

    let resp = client
        .post(format!("{}/v1/audio/speech", config.tts_url))
        .json(&body)
        .send()
        .await
        .map_err(|source| GenerateError::Request {
            segment: *id,
            source,
        })?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(GenerateError::Status {
            segment: *id,
            status,
            body,
        });
    }

    let bytes = resp.bytes().await.map_err(|source| GenerateError::Request {
        segment: *id,
        source,
    })?;
    Ok(bytes.to_vec())
}
