use clap::Parser;
use miette::{IntoDiagnostic, Result};
use paysheet::config::SheetConfig;
use paysheet::error::PaymentSheetError;
use paysheet::interfaces::csv::event_reader::EventReader;
use paysheet::interfaces::csv::instrument_reader::InstrumentReader;
use paysheet::interfaces::json::line_writer::JsonLineWriter;
use paysheet::interfaces::replay::ReplaySession;
use std::fs::File;
use std::io;
use std::path::PathBuf;

/// Replays a payment sheet scenario and prints the resulting UI state as JSON lines.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Scenario CSV file with `event,arg` rows
    events: PathBuf,

    /// Saved instruments CSV file (`id,type,brand,last4,networks,preferred`)
    #[arg(long)]
    instruments: Option<PathBuf>,

    /// Sheet configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match cli.config {
        Some(path) => {
            let file = File::open(path).into_diagnostic()?;
            SheetConfig::from_reader(file).into_diagnostic()?
        }
        None => SheetConfig::default(),
    };

    let mut instruments = Vec::new();
    if let Some(path) = cli.instruments {
        let file = File::open(path).into_diagnostic()?;
        for result in InstrumentReader::new(file).instruments() {
            match result {
                Ok(instrument) => instruments.push(instrument),
                Err(e) => eprintln!("Error reading instrument: {}", e),
            }
        }
    }

    let events = File::open(cli.events).into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = JsonLineWriter::new(stdout.lock());

    let mut session = ReplaySession::new(config, instruments);
    let start = session.start().await.into_diagnostic()?;
    writer.write(&start).into_diagnostic()?;

    for event_result in EventReader::new(events).events() {
        let event = match event_result {
            Ok(event) => event,
            Err(e) => {
                eprintln!("Error reading event: {}", e);
                continue;
            }
        };
        match session.apply(event).await {
            Ok(record) => writer.write(&record).into_diagnostic()?,
            Err(e @ PaymentSheetError::InvalidEvent(_)) => {
                eprintln!("Error applying event: {}", e);
            }
            Err(e) => return Err(e).into_diagnostic(),
        }
    }

    session.close();
    writer.flush().into_diagnostic()?;
    Ok(())
}
