use anyhow::{Context, bail};
use chrono::{Local, Utc}; // timestamp in log lines
use env_logger::{Env, Target};
use serde::Deserialize;
use std::io::Write; // for env_logger custom formatter

use paddle_race_engine::{
    AppError,
    config::Config,
    models::{Entry, NewRace, NewSession, Race, Session, SourceActivity},
    services::{ImportService, SettlementService},
};

/// Input for `settle`: the race, its entries and the sessions they link to.
#[derive(Debug, Deserialize)]
struct SettlementInput {
    race: NewRace,
    entries: Vec<Entry>,
    #[serde(default)]
    sessions: Vec<NewSession>,
}

fn usage() -> ! {
    eprintln!("Usage: race-engine <settle|import> <input.json>");
    std::process::exit(2);
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stderr)
        .init();

    run().inspect_err(|err| match err.downcast_ref::<AppError>() {
        Some(app_err) => app_err.report(),
        None => log::error!("{err:#}"),
    })
}

fn run() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let (Some(command), Some(path)) = (args.get(1), args.get(2)) else {
        usage();
    };

    let config = Config::from_toml().context("Failed to load configuration")?;
    let input = std::fs::read_to_string(path).with_context(|| format!("Cannot read {path}"))?;

    match command.as_str() {
        "settle" => {
            let input: SettlementInput = serde_json::from_str(&input)?;
            let race = Race::new(input.race)?;
            let sessions = input
                .sessions
                .into_iter()
                .map(Session::new)
                .collect::<Result<Vec<_>, _>>()?;

            let service = SettlementService::from_config(&config);
            let result = service.settle_with_sessions(&race, &input.entries, &sessions, Utc::now());
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        "import" => {
            let activity: SourceActivity = serde_json::from_str(&input)?;
            let session = ImportService::from_config(&config).import(&activity)?;
            println!("{}", serde_json::to_string_pretty(&session)?);
        }
        other => bail!("Unknown command: {other}"),
    }

    Ok(())
}
