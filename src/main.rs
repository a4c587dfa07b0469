use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use gymrack::command::{self, Command};
use gymrack::config::EngineConfig;
use gymrack::engine::{self, Engine};
use gymrack::notify::NotifyHub;

const USAGE: &str = "commands:
  status
  start <equipment> <user> <minutes>
  finish <equipment> <user>
  wait <equipment> <user>
  reserve <equipment> <user> <minutes> <time, e.g. 4pm or tomorrow 8:30am>
  cancel <equipment> <user> [time]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let metrics_port: Option<u16> = std::env::var("GYMRACK_METRICS_PORT")
        .ok()
        .and_then(|s| s.parse().ok());
    gymrack::observability::init(metrics_port);

    let config = match std::env::var("GYMRACK_CONFIG") {
        Ok(path) => EngineConfig::load(path)?,
        Err(_) => EngineConfig::default(),
    };
    info!("equipment pool: {}", config.equipment.join(", "));
    info!(
        "timezone: {}, horizon: {}h, auto-start: {} min",
        config.timezone, config.horizon_hours, config.auto_start_minutes
    );

    let notify = Arc::new(NotifyHub::new());
    let engine = Arc::new(Engine::new(config, notify.clone()));

    // Stand-in for the shared status channel: print broadcasts as they land.
    let mut rx = notify.subscribe();
    tokio::spawn(async move {
        while let Ok(text) = rx.recv().await {
            println!("* {text}");
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }
        match parse_line(line) {
            Ok(cmd) => match command::dispatch(&engine, cmd, engine::now_ms()).await {
                Ok(outcome) => println!("{}", outcome.reply.trim_end()),
                Err(e) => println!("! {e}"),
            },
            Err(usage) => println!("! {usage}"),
        }
    }

    info!("gymrack stopped");
    Ok(())
}

/// Split a line into a Command. Word order keeps the free-form time
/// expression at the tail so it may contain spaces.
fn parse_line(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let verb = words.next().unwrap_or("").to_lowercase();
    let rest: Vec<&str> = words.collect();

    match (verb.as_str(), rest.as_slice()) {
        ("status", []) => Ok(Command::Status),
        ("start", [equipment, caller, minutes]) => Ok(Command::Start {
            equipment: equipment.to_string(),
            caller: caller.to_string(),
            minutes: command::parse_duration(minutes).map_err(|e| e.to_string())?,
        }),
        ("finish", [equipment, caller]) => Ok(Command::Finish {
            equipment: equipment.to_string(),
            caller: caller.to_string(),
        }),
        ("wait", [equipment, caller]) => Ok(Command::Wait {
            equipment: equipment.to_string(),
            caller: caller.to_string(),
        }),
        ("reserve", [equipment, caller, minutes, time @ ..]) if !time.is_empty() => {
            Ok(Command::Reserve {
                equipment: equipment.to_string(),
                caller: caller.to_string(),
                time: time.join(" "),
                minutes: command::parse_duration(minutes).map_err(|e| e.to_string())?,
            })
        }
        ("cancel", [equipment, caller, time @ ..]) => Ok(Command::Cancel {
            equipment: equipment.to_string(),
            caller: caller.to_string(),
            time: if time.is_empty() {
                None
            } else {
                Some(time.join(" "))
            },
        }),
        _ => Err(USAGE.to_string()),
    }
}
