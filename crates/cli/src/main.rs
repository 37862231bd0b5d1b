use std::collections::HashMap;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use subway_core::{
    classify, EventRequest, EventSession, IntentPayload, PlatformEvent, SlotValue,
    TRAIN_LINE_SLOT,
};
use subway_observability::{init_tracing, SkillMetrics};
use subway_skill::{
    SkillConfig, TrainStatusSkill, DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_INVOCATION_DEADLINE_MS,
    GET_TRAIN_STATUS_INTENT,
};
use subway_status::{HttpStatusClient, StatusClientConfig, DEFAULT_CONTAINER_ID, DEFAULT_STATUS_ENDPOINT};
use url::Url;

#[derive(Debug, Parser)]
#[command(name = "subway")]
#[command(about = "Subway service status skill CLI")]
struct Cli {
    #[arg(long, env = "SUBWAY_STATUS_ENDPOINT", default_value = DEFAULT_STATUS_ENDPOINT)]
    endpoint: Url,

    #[arg(long, env = "SUBWAY_STATUS_CONTAINER_ID", default_value = DEFAULT_CONTAINER_ID)]
    container_id: String,

    #[arg(long, env = "SUBWAY_FETCH_TIMEOUT_MS", default_value_t = DEFAULT_FETCH_TIMEOUT_MS)]
    fetch_timeout_ms: u64,

    #[arg(long, env = "SUBWAY_INVOCATION_DEADLINE_MS", default_value_t = DEFAULT_INVOCATION_DEADLINE_MS)]
    deadline_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show how a spoken token maps to a line group.
    Classify { token: String },
    /// Ask for the status of a line the way a voice user would.
    Status { line: String },
    /// Dispatch a raw platform event; `-` reads it from stdin.
    Event { path: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("subway_cli");
    let cli = Cli::parse();

    match &cli.command {
        Command::Classify { token } => {
            println!("{}", serde_json::to_string_pretty(&classify(token))?);
        }
        Command::Status { line } => {
            let skill = cli.build_skill()?;
            match skill.handle_event(&status_event(line)).await? {
                Some(envelope) => println!("{}", envelope.response.output_speech.text),
                None => println!("acknowledged"),
            }
        }
        Command::Event { path } => {
            let skill = cli.build_skill()?;
            let event = read_event(path)?;

            match skill.handle_event(&event).await? {
                Some(envelope) => println!("{}", serde_json::to_string_pretty(&envelope)?),
                None => println!("acknowledged"),
            }
        }
    }

    Ok(())
}

impl Cli {
    fn build_skill(&self) -> Result<TrainStatusSkill<HttpStatusClient>> {
        let config = SkillConfig::new(
            self.status_config(),
            Duration::from_millis(self.deadline_ms),
        )?;
        TrainStatusSkill::from_config(config, SkillMetrics::shared())
            .context("failed to build status client")
    }

    fn status_config(&self) -> StatusClientConfig {
        StatusClientConfig {
            endpoint: self.endpoint.clone(),
            container_id: self.container_id.clone(),
            timeout: Duration::from_millis(self.fetch_timeout_ms),
        }
    }
}

/// A one-shot `GetTrainStatus` event, as the platform would send for "status of the <line>".
fn status_event(line: &str) -> PlatformEvent {
    let mut slots = HashMap::new();
    slots.insert(
        TRAIN_LINE_SLOT.to_string(),
        SlotValue {
            name: TRAIN_LINE_SLOT.to_string(),
            value: Some(line.to_string()),
        },
    );

    PlatformEvent {
        version: Some("1.0".to_string()),
        session: EventSession {
            new: true,
            session_id: "subway-cli".to_string(),
            application: None,
            attributes: None,
        },
        request: EventRequest {
            request_type: "IntentRequest".to_string(),
            request_id: "subway-cli-status".to_string(),
            timestamp: None,
            reason: None,
            intent: Some(IntentPayload {
                name: GET_TRAIN_STATUS_INTENT.to_string(),
                slots,
            }),
        },
    }
}

fn read_event(path: &PathBuf) -> Result<PlatformEvent> {
    let raw = if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed reading event from {}", path.display()))?
    };

    serde_json::from_str(&raw).context("event is not a valid platform event")
}
