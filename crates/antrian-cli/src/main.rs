//! antrian CLI — queue number announcer.
//!
//! ```text
//! antrian play A22 [--audio-dir audio] [--no-letter]
//! antrian plan 156              # dry run: parts, segments, missing clips
//! antrian check                 # list missing clips
//! antrian generate [--tts-url http://localhost:8880] [--voice if_sara]
//! antrian serve [--port 2004] [--host 127.0.0.1]
//! antrian print / call / recall / reset / stop / status [--server ...]
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use antrian_lib::antrian_core::phrases::catalog;
use antrian_lib::antrian_core::plan_announcement;
use antrian_lib::antrian_core::sequence::AllSegments;
use antrian_lib::antrian_core::types::{AnnouncerConfig, AssetConfig, GeneratorConfig, TicketConfig};
use antrian_lib::assets::AssetDirectory;
use antrian_lib::player::AnnouncePlayer;

/// antrian — announce queue numbers from recorded clips
#[derive(Parser)]
#[command(name = "antrian", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Where the clips are and how numbers are spoken.
#[derive(Args)]
struct AnnounceArgs {
    /// Directory holding the segment clips
    #[arg(long, default_value = "audio")]
    audio_dir: PathBuf,
    /// Clip file extension
    #[arg(long, default_value = "wav")]
    extension: String,
    /// Do not speak the letter of lettered tickets
    #[arg(long)]
    no_letter: bool,
    /// Highest queue number accepted
    #[arg(long, default_value = "999", conflicts_with = "unbounded")]
    max_number: u32,
    /// Accept any queue number; parts without a clip are skipped
    #[arg(long)]
    unbounded: bool,
}

impl AnnounceArgs {
    fn announcer(&self) -> AnnouncerConfig {
        AnnouncerConfig {
            letter_prefix: !self.no_letter,
            max_number: (!self.unbounded).then_some(self.max_number),
            ..Default::default()
        }
    }

    fn assets(&self) -> AssetDirectory {
        AssetDirectory::new(AssetConfig {
            audio_dir: self.audio_dir.clone(),
            extension: self.extension.clone(),
            ..Default::default()
        })
    }
}

#[derive(Subcommand)]
enum Command {
    /// Announce a queue number on the default audio output
    Play {
        /// Queue number, e.g. 22 or A156
        queue: String,
        #[command(flatten)]
        args: AnnounceArgs,
    },
    /// Show how a queue number would be announced, without playing it
    Plan {
        queue: String,
        #[command(flatten)]
        args: AnnounceArgs,
    },
    /// List clips missing from the audio directory
    Check {
        #[command(flatten)]
        args: AnnounceArgs,
    },
    /// Generate missing clips through a Kokoro-compatible TTS server
    Generate {
        #[command(flatten)]
        args: AnnounceArgs,
        /// TTS server URL
        #[arg(long, default_value = "http://localhost:8880")]
        tts_url: String,
        /// TTS voice
        #[arg(long, default_value = "if_sara")]
        voice: String,
        /// TTS speed
        #[arg(long, default_value = "1.0")]
        speed: f32,
        /// Silence appended to each clip, in milliseconds
        #[arg(long, default_value = "300")]
        trailing_silence_ms: u32,
        /// Regenerate clips that already exist
        #[arg(long)]
        overwrite: bool,
    },
    /// Start the announcer HTTP server
    Serve {
        #[command(flatten)]
        args: AnnounceArgs,
        /// Listen port
        #[arg(long, default_value = "2004")]
        port: u16,
        /// Listen host
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Letter printed on tickets, A-Z
        #[arg(long, default_value = "A", value_parser = parse_ticket_letter)]
        ticket_letter: char,
        /// Print tickets without a letter
        #[arg(long)]
        no_ticket_letter: bool,
        /// Zero-pad ticket numbers to this many digits
        #[arg(long, default_value = "3")]
        ticket_width: usize,
    },
    /// Print a new ticket on the running server
    Print {
        #[arg(long, default_value = "http://localhost:2004")]
        server: String,
    },
    /// Call the latest ticket
    Call {
        #[arg(long, default_value = "http://localhost:2004")]
        server: String,
    },
    /// Announce the current ticket again
    Recall {
        #[arg(long, default_value = "http://localhost:2004")]
        server: String,
    },
    /// Reset the ticket counter
    Reset {
        #[arg(long, default_value = "http://localhost:2004")]
        server: String,
    },
    /// Stop playback on the server
    Stop {
        #[arg(long, default_value = "http://localhost:2004")]
        server: String,
    },
    /// Get server status
    Status {
        #[arg(long, default_value = "http://localhost:2004")]
        server: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "antrian=info,antrian_lib=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command).await {
        eprintln!("antrian: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Play { queue, args } => {
            let assets = args.assets();
            let plan = plan_announcement(&queue, &args.announcer(), &assets)
                .map_err(|e| e.to_string())?;
            if plan.segments.is_empty() {
                return Err(format!("no clips found in {}", assets.dir().display()));
            }

            let player = AnnouncePlayer::new().map_err(|e| e.to_string())?;
            let n = player
                .announce(&plan.segments, &assets)
                .map_err(|e| e.to_string())?;
            info!("playing {} ({n} segments)", plan.identifier);
            player.wait_idle().await;
        }

        Command::Plan { queue, args } => {
            let config = args.announcer();
            let assets = args.assets();
            let plan = plan_announcement(&queue, &config, &AllSegments)
                .map_err(|e| e.to_string())?;

            println!("Queue:    {}", plan.identifier);
            println!("Number:   {}", plan.identifier.number);
            let parts: Vec<String> = plan.parts.parts().iter().map(|p| p.to_string()).collect();
            println!("Parts:    [{}]", parts.join(", "));
            println!("Segments:");
            for seg in &plan.segments {
                let mark = if assets.exists(&seg.segment_id) { ' ' } else { '!' };
                println!(
                    "  {mark} {:<10} pause {:>4} ms   {}",
                    seg.segment_id.to_string(),
                    seg.pause_after_ms,
                    assets.path_for(&seg.segment_id).display()
                );
            }
            let missing = plan.missing_segments(&config, &assets);
            if !missing.is_empty() {
                let names: Vec<String> = missing.iter().map(|m| m.to_string()).collect();
                println!("Missing:  {} (skipped on play)", names.join(", "));
            }
        }

        Command::Check { args } => {
            let assets = args.assets();
            let missing = assets.missing(catalog(!args.no_letter));
            if missing.is_empty() {
                println!("all clips present in {}", assets.dir().display());
            } else {
                for id in &missing {
                    println!("{}", assets.path_for(id).display());
                }
                println!("{} clip(s) missing", missing.len());
            }
        }

        Command::Generate {
            args,
            tts_url,
            voice,
            speed,
            trailing_silence_ms,
            overwrite,
        } => {
            let assets = args.assets();
            let config = GeneratorConfig {
                tts_url,
                voice,
                speed,
                trailing_silence_ms,
                overwrite,
            };
            let ids = catalog(!args.no_letter);
            let summary = antrian_lib::generate::generate_segments(&assets, &config, &ids, |p| {
                println!("[{:>2}/{}] {:<8} {}", p.done, p.total, p.status, p.segment);
            })
            .await
            .map_err(|e| e.to_string())?;

            println!(
                "{} created, {} existing, {} skipped, {} failed",
                summary.created, summary.existing, summary.skipped, summary.failed
            );
            if summary.failed > 0 {
                return Err(format!("{} clip(s) failed", summary.failed));
            }
        }

        Command::Serve {
            args,
            port,
            host,
            ticket_letter,
            no_ticket_letter,
            ticket_width,
        } => {
            let tickets = TicketConfig {
                letter: (!no_ticket_letter).then_some(ticket_letter),
                width: ticket_width,
                ..Default::default()
            };
            let player = AnnouncePlayer::new().map_err(|e| e.to_string())?;
            let state = antrian_lib::server::AppState::new(
                player,
                args.assets(),
                args.announcer(),
                tickets,
            )
            .map_err(|e| e.to_string())?;
            let app = antrian_lib::server::router(Arc::new(state));

            let addr = format!("{host}:{port}");
            eprintln!("antrian listening on {addr}");

            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .map_err(|e| format!("failed to bind {addr}: {e}"))?;

            axum::serve(listener, app)
                .await
                .map_err(|e| format!("server error: {e}"))?;
        }

        Command::Print { server } => post_simple(&server, "print").await?,
        Command::Call { server } => post_simple(&server, "call").await?,
        Command::Recall { server } => post_simple(&server, "recall").await?,
        Command::Reset { server } => post_simple(&server, "reset").await?,
        Command::Stop { server } => post_simple(&server, "stop").await?,

        Command::Status { server } => {
            let resp = reqwest::Client::new()
                .get(format!("{server}/status"))
                .send()
                .await
                .map_err(|e| format!("request failed: {e}"))?;
            println!("{}", resp.text().await.unwrap_or_default());
        }
    }

    Ok(())
}

fn parse_ticket_letter(s: &str) -> Result<char, String> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Ok(c.to_ascii_uppercase()),
        _ => Err(format!("expected a single letter A-Z, got '{s}'")),
    }
}

async fn post_simple(server: &str, endpoint: &str) -> Result<(), String> {
    let resp = reqwest::Client::new()
        .post(format!("{server}/{endpoint}"))
        .send()
        .await
        .map_err(|e| format!("request failed: {e}"))?;
    println!("{}", resp.text().await.unwrap_or_default());
    Ok(())
}
