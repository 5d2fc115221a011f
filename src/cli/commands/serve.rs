//! Serve command - Line-oriented JSON service over stdin/stdout
//!
//! Each input line is one request:
//!
//! ```text
//! {"type":"action","body":{"state":["-","-","-","-","X","-","-","-","-"],"agent_is_x":false}}
//! {"type":"submit","body":{"initial_state":[...],"action":[...],"resultant_state":[...],"reward":0.0}}
//! {"type":"stats"}
//! {"type":"train"}
//! ```
//!
//! and produces exactly one JSON line in reply. Training runs in the
//! background on the configured interval unless disabled.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    app::App,
    cli::config::ServiceArgs,
    coordinator::{CoordinatorStats, CycleOutcome, Phase, TrainingCoordinator},
    inference::{ActionRequest, PlaydataSubmission, StatusResponse},
};

#[derive(Parser, Debug)]
#[command(about = "Serve inference and collect play data over stdin/stdout")]
pub struct ServeArgs {
    #[command(flatten)]
    pub service: ServiceArgs,

    /// Seconds between training cycles
    #[arg(long)]
    pub interval: Option<u64>,

    /// Serve the loaded agent without training
    #[arg(long)]
    pub no_training: bool,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "body", rename_all = "snake_case")]
enum ServeRequest {
    Action(ActionRequest),
    Submit(PlaydataSubmission),
    Stats,
    Train,
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    phase: Phase,
    #[serde(flatten)]
    stats: CoordinatorStats,
    states: usize,
}

pub fn execute(args: ServeArgs) -> Result<()> {
    let mut config = args.service.resolve()?;
    if let Some(secs) = args.interval {
        config = config.with_training_interval_secs(secs);
    }
    if args.no_training {
        config = config.with_training_enabled(false);
    }
    config.validate().context("invalid configuration")?;

    let app = App::new(config);
    let coordinator = app.coordinator()?;
    coordinator.start()?;
    info!(
        "serving {} (training {})",
        app.config().snapshot_path.display(),
        if app.config().training_enabled { "enabled" } else { "disabled" }
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read request")?;
        if line.trim().is_empty() {
            continue;
        }
        let reply = handle_line(&coordinator, &line);
        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }

    info!("input closed, shutting down");
    coordinator.shutdown();
    Ok(())
}

/// Answer one request line with one JSON reply
fn handle_line(coordinator: &TrainingCoordinator, line: &str) -> String {
    let request = match serde_json::from_str::<ServeRequest>(line) {
        Ok(request) => request,
        Err(e) => {
            debug!("rejected request: {e}");
            return to_json(&StatusResponse::error(&e));
        }
    };

    match request {
        ServeRequest::Action(request) => match coordinator.respond(&request) {
            Ok(response) => to_json(&response),
            Err(e) => to_json(&StatusResponse::error(&e)),
        },
        ServeRequest::Submit(submission) => match coordinator.submit(submission) {
            Ok(()) => to_json(&StatusResponse::success()),
            Err(e) => {
                if !e.is_validation() {
                    warn!("submission failed: {e}");
                }
                to_json(&StatusResponse::error(&e))
            }
        },
        ServeRequest::Stats => to_json(&StatsResponse {
            phase: coordinator.phase(),
            stats: coordinator.stats(),
            states: coordinator.snapshot().table().state_count(),
        }),
        ServeRequest::Train => {
            let message = match coordinator.run_cycle() {
                CycleOutcome::NoData => "no data".to_string(),
                CycleOutcome::QueueUnavailable => "queue unavailable".to_string(),
                CycleOutcome::Discarded(report) => {
                    format!("discarded {} transitions", report.dropped)
                }
                CycleOutcome::Promoted { generation, .. } => {
                    format!("promoted generation {generation}")
                }
            };
            to_json(&StatusResponse { message })
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|e| format!(r#"{{"message":"failed to encode reply: {e}"}}"#))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        adapters::{InMemoryQueue, InMemorySnapshotRepository},
        app::ServiceConfig,
        inference::ActionResponse,
    };

    fn coordinator() -> TrainingCoordinator {
        TrainingCoordinator::new(
            ServiceConfig::default(),
            Arc::new(InMemoryQueue::new()),
            Arc::new(InMemorySnapshotRepository::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_action_request_round_trip() {
        let coordinator = coordinator();
        let reply = handle_line(
            &coordinator,
            r#"{"type":"action","body":{"state":["X","-","-","-","-","-","-","-","-"],"agent_is_x":false}}"#,
        );
        let response: ActionResponse = serde_json::from_str(&reply).unwrap();
        assert_eq!(response.message, "success");
        let pos = response.position().unwrap();
        assert_ne!(pos, 0);
        assert_eq!(response.action[pos], "O");
    }

    #[test]
    fn test_submit_then_train() {
        let coordinator = coordinator();
        let reply = handle_line(
            &coordinator,
            r#"{"type":"submit","body":{"initial_state":["-","-","-","-","-","-","-","-","-"],"action":["-","-","-","-","X","-","-","-","-"],"resultant_state":["-","-","-","-","X","-","-","-","-"],"reward":0.5}}"#,
        );
        assert_eq!(reply, r#"{"message":"success"}"#);

        let reply = handle_line(&coordinator, r#"{"type":"train"}"#);
        assert_eq!(reply, r#"{"message":"promoted generation 1"}"#);

        let stats: serde_json::Value =
            serde_json::from_str(&handle_line(&coordinator, r#"{"type":"stats"}"#)).unwrap();
        assert_eq!(stats["phase"], "idle");
        assert_eq!(stats["generation"], 1);
        assert_eq!(stats["states"], 1);
    }

    #[test]
    fn test_malformed_requests_get_messages() {
        let coordinator = coordinator();
        for line in [
            "not json",
            r#"{"type":"unknown"}"#,
            r#"{"type":"action","body":{"state":["X"]}}"#,
            r#"{"type":"action","body":{"state":["X","O","X","O","X","O","O","X","O"]}}"#,
        ] {
            let reply: StatusResponse = serde_json::from_str(&handle_line(&coordinator, line))
                .unwrap_or_else(|e| panic!("{line}: {e}"));
            assert_ne!(reply.message, "success", "{line}");
        }
    }
}
