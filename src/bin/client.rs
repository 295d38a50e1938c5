//! Submit a description and an image, then wait for the generated media.
//!
//! Usage:
//!   cargo run --bin media-client -- --image shoe.png "Red sneakers on a beach"
//!
//! Relay location and polling cadence come from `CLIENT_*` variables.

use clap::Parser;
use media_relay::client::api::HttpRelayClient;
use media_relay::client::controller::{format_elapsed, ControllerError, PollingController};
use media_relay::client::session::PollState;
use media_relay::client::submission::{ImageAttachment, SubmissionDraft};
use media_relay::config::ClientConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "media-client", about = "Generate an image and a video from a description and a photo")]
struct Args {
    /// Product description sent to the workflow
    description: String,

    /// Image to attach (PNG, JPEG, WebP, ...; at most 10MB)
    #[arg(short, long)]
    image: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid CLIENT_* configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let image = match args.image.as_deref().map(ImageAttachment::from_path).transpose() {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Could not read image: {e}");
            return ExitCode::FAILURE;
        }
    };

    let relay = match HttpRelayClient::from_config(&config) {
        Ok(relay) => relay,
        Err(e) => {
            eprintln!("Could not build HTTP client: {e}");
            return ExitCode::FAILURE;
        }
    };
    let controller = PollingController::from_config(relay, &config);

    let (progress, mut updates) = watch::channel(PollState::Idle);
    let reporter = tokio::spawn(async move {
        let started = tokio::time::Instant::now();
        while updates.changed().await.is_ok() {
            let state = *updates.borrow_and_update();
            tracing::info!(state = %state, elapsed = %format_elapsed(started.elapsed()), "Progress");
            if state.is_terminal() {
                break;
            }
        }
    });

    let draft = SubmissionDraft::new(&args.description, image);
    let result = controller.run_with_progress(draft, &progress).await;
    drop(progress);
    let _ = reporter.await;

    match result {
        Ok(completion) => {
            println!("Content generated successfully");
            println!("  Image: {}", completion.image_link());
            println!("  Video: {}", completion.video_link());
            ExitCode::SUCCESS
        }
        Err(ControllerError::Timeout { request_id, elapsed }) => {
            eprintln!();
            eprintln!("==============================================");
            eprintln!("  TIMED OUT after {}", format_elapsed(elapsed));
            eprintln!("  No result for request {request_id}.");
            eprintln!("  Polling has stopped; check the run in n8n");
            eprintln!("  or try again.");
            eprintln!("==============================================");
            ExitCode::from(2)
        }
        Err(ControllerError::Validation(e)) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
        Err(e @ ControllerError::Network(_)) => {
            tracing::error!(error = %e, "Submission failed");
            eprintln!("Could not connect to the server.");
            ExitCode::FAILURE
        }
    }
}
