use std::time::Instant;

use tracing::debug;

use crate::engine::{Engine, EngineError, Outcome};
use crate::model::Ms;
use crate::observability;

/// One variant per verb. The dispatcher matches exhaustively, so a new
/// verb cannot be added without handling it everywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start {
        equipment: String,
        caller: String,
        minutes: i64,
    },
    Finish {
        equipment: String,
        caller: String,
    },
    Wait {
        equipment: String,
        caller: String,
    },
    Reserve {
        equipment: String,
        caller: String,
        time: String,
        minutes: i64,
    },
    Cancel {
        equipment: String,
        caller: String,
        time: Option<String>,
    },
    Status,
}

/// Duration arguments: a bare integer or an integer with a minutes
/// suffix ("30", "30m", "30min", "30mins"). Anything else is rejected;
/// positivity is checked by the engine.
pub fn parse_duration(text: &str) -> Result<i64, EngineError> {
    let lowered = text.trim().to_lowercase();
    let digits = lowered
        .strip_suffix("mins")
        .or_else(|| lowered.strip_suffix("min"))
        .or_else(|| lowered.strip_suffix("m"))
        .unwrap_or(&lowered);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EngineError::InvalidDuration(text.to_string()));
    }
    digits
        .parse()
        .map_err(|_| EngineError::InvalidDuration(text.to_string()))
}

/// Route a command to the engine, recording per-command metrics.
pub async fn dispatch(engine: &Engine, command: Command, now: Ms) -> Result<Outcome, EngineError> {
    let label = observability::command_label(&command);
    debug!(command = label, "dispatch");
    let started = Instant::now();

    let result = match command {
        Command::Start {
            equipment,
            caller,
            minutes,
        } => engine.start(&equipment, &caller, minutes, now).await,
        Command::Finish { equipment, caller } => engine.finish(&equipment, &caller, now).await,
        Command::Wait { equipment, caller } => engine.wait(&equipment, &caller).await,
        Command::Reserve {
            equipment,
            caller,
            time,
            minutes,
        } => {
            engine
                .reserve(&equipment, &caller, &time, minutes, now)
                .await
        }
        Command::Cancel {
            equipment,
            caller,
            time,
        } => {
            engine
                .cancel(&equipment, &caller, time.as_deref(), now)
                .await
        }
        Command::Status => {
            let report = engine.status_snapshot(now).await;
            Ok(Outcome {
                reply: report.render(engine.config().timezone),
                broadcasts: Vec::new(),
            })
        }
    };

    metrics::histogram!(observability::OP_DURATION_SECONDS, "command" => label)
        .record(started.elapsed().as_secs_f64());
    let status = if result.is_ok() { "ok" } else { "rejected" };
    metrics::counter!(observability::OPS_TOTAL, "command" => label, "status" => status)
        .increment(1);

    result
}
