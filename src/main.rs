use std::{io, path::PathBuf, process::ExitCode};

use clap::{Args, Parser, Subcommand};
use log::error;
use serde::Serialize;
use trackline::{
    AnalysisConfig, Baseline, CircuitCharacteristics, Lap, LapStatistics, PlanarPoint,
    TrackAnalyzer, TrackCorner, TracklineError, telemetry::loader::load_session,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct SessionArgs {
    /// Session file, one JSON record per line
    #[arg(short, long)]
    input: PathBuf,

    /// Analysis configuration; defaults to the saved user config
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Lap boundaries and lap-time statistics
    Laps {
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Reference track geometry
    Baseline {
        #[command(flatten)]
        session: SessionArgs,

        /// Build from this lap instead of the fastest one
        #[arg(short, long)]
        lap: Option<u32>,
    },
    /// Per-lap features around a point of the track
    Corner {
        #[command(flatten)]
        session: SessionArgs,

        #[arg(short, long, allow_hyphen_values = true)]
        x: f64,

        #[arg(short, long, allow_hyphen_values = true)]
        y: f64,

        /// Search radius along each lap, meters
        #[arg(short, long)]
        radius: Option<f64>,
    },
    /// Features of every corner of the fastest lap
    Reference {
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Whole-session circuit descriptors
    Circuit {
        #[command(flatten)]
        session: SessionArgs,
    },
}

#[derive(Serialize)]
struct LapReport {
    laps: Vec<Lap>,
    statistics: LapStatistics,
}

#[derive(Serialize)]
struct BaselineReport<'a> {
    total_length_m: f64,
    corner_length_m: f64,
    straight_length_m: f64,
    corners: Vec<TrackCorner>,
    baseline: &'a Baseline,
}

#[derive(Serialize)]
struct CircuitReport {
    characteristics: CircuitCharacteristics,
    outline: Vec<PlanarPoint>,
}

fn analyzer(config: Option<&PathBuf>) -> Result<TrackAnalyzer, TracklineError> {
    let config = match config {
        Some(path) => AnalysisConfig::from_path(path)?,
        None => AnalysisConfig::from_local_file()?.unwrap_or_default(),
    };
    TrackAnalyzer::new(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), TracklineError> {
    serde_json::to_writer_pretty(io::stdout().lock(), value)
        .map_err(|e| TracklineError::OutputError { source: e })?;
    println!();
    Ok(())
}

fn run(command: &Commands) -> Result<(), TracklineError> {
    match command {
        Commands::Laps { session } => {
            let analyzer = analyzer(session.config.as_ref())?;
            let telemetry = load_session(&session.input)?;
            let laps = analyzer.segment_laps(&telemetry)?;
            print_json(&LapReport {
                statistics: LapStatistics::from_laps(&laps),
                laps,
            })
        }
        Commands::Baseline { session, lap } => {
            let analyzer = analyzer(session.config.as_ref())?;
            let telemetry = load_session(&session.input)?;
            let baseline = match lap {
                Some(lap_number) => analyzer.build_baseline_for_lap(&telemetry, *lap_number)?,
                None => analyzer.build_baseline(&telemetry)?,
            };
            print_json(&BaselineReport {
                total_length_m: baseline.total_length_m(),
                corner_length_m: baseline.corner_length_m(),
                straight_length_m: baseline.straight_length_m(),
                corners: baseline.corners(),
                baseline: &baseline,
            })
        }
        Commands::Corner {
            session,
            x,
            y,
            radius,
        } => {
            let analyzer = analyzer(session.config.as_ref())?;
            let telemetry = load_session(&session.input)?;
            let baseline = analyzer.build_baseline(&telemetry)?;
            let features = analyzer.query_corner(&telemetry, &baseline, *x, *y, *radius)?;
            print_json(&features)
        }
        Commands::Reference { session } => {
            let analyzer = analyzer(session.config.as_ref())?;
            let telemetry = load_session(&session.input)?;
            print_json(&analyzer.reference_corners(&telemetry)?)
        }
        Commands::Circuit { session } => {
            let analyzer = analyzer(session.config.as_ref())?;
            let telemetry = load_session(&session.input)?;
            print_json(&CircuitReport {
                characteristics: analyzer.compute_circuit_characteristics(&telemetry),
                outline: analyzer.track_outline(&telemetry),
            })
        }
    }
}

fn main() -> ExitCode {
    colog::init();

    let cli = Cli::parse();
    match run(&cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
