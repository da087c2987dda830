// PSI ENGINE
// Pipe newline-delimited JSON tick inputs in, get one JSON report per tick out.
// `psi-engine meditate N` runs N quiet ticks and prints the final state.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use serde::Serialize;
use tracing::{error, info};

use psi_engine::session::{SessionSnapshot, StepReport};
use psi_engine::telemetry::init_tracing;
use psi_engine::{EngineConfig, EngineError, Session, TickInputs};

#[derive(Serialize)]
struct TickLine<'a> {
    step: &'a StepReport,
    snapshot: &'a SessionSnapshot,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("stdio failed: {0}")]
    Io(#[from] io::Error),
    #[error("encoding output failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("usage: psi-engine [meditate <ticks>]")]
    Usage,
}

fn main() -> ExitCode {
    if let Err(err) = init_tracing() {
        eprintln!("warning: {err}");
    }

    // Stderr only; stdout is the data pipe.
    eprintln!("PSI ENGINE v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("Status: reading tick inputs as JSON lines on stdin");
    eprintln!("─────────────────────────────────────────────────────");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), CliError> {
    let config = EngineConfig::discover()?;
    info!(seed = config.seed, "session started");
    let mut session = Session::new(&config);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => pipe(&mut session),
        [cmd, ticks] if cmd == "meditate" => {
            let ticks: usize = ticks.parse().map_err(|_| CliError::Usage)?;
            meditate(&mut session, ticks)
        }
        _ => Err(CliError::Usage),
    }
}

fn pipe(session: &mut Session) -> Result<(), CliError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (number, line) in stdin.lock().lines().enumerate() {
        let line = line?;
        let text = line.trim();
        let inputs = if text.is_empty() {
            TickInputs::default()
        } else {
            match serde_json::from_str::<TickInputs>(text) {
                Ok(inputs) => inputs,
                Err(err) => {
                    // A bad line is skipped, not fatal.
                    error!(line = number + 1, "{}", EngineError::from(err));
                    continue;
                }
            }
        };

        let step = session.step(&inputs);
        let snapshot = session.snapshot();
        serde_json::to_writer(&mut out, &TickLine { step: &step, snapshot: &snapshot })?;
        writeln!(out)?;
        out.flush()?;
    }
    Ok(())
}

fn meditate(session: &mut Session, ticks: usize) -> Result<(), CliError> {
    let reports = session.meditate(ticks);
    if let Some(last) = reports.last() {
        info!(
            ticks,
            distance = last.distance_from_fixed_point,
            fixed_point = last.fixed_point_type.label(),
            "meditation finished"
        );
    }
    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &session.snapshot())?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
