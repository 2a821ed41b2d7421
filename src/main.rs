use clap::{Parser, Subcommand};
use notesy::{MatchOutcome, NotesyError, Trainer, TrainerOptions};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "notesy", about = "Sight-reading passages and performance scoring")]
#[command(version)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// YAML options file (range, keys, durations, voices)
    #[arg(short, long, global = true)]
    options: Option<PathBuf>,

    /// Seed for a reproducible passage
    #[arg(short, long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a fresh passage as ABC notation
    Generate,

    /// Play recorded MIDI messages against a passage and print the result
    Replay {
        /// Text file with one message per line: `status pitch velocity timestamp_ms`.
        /// Use `-` for stdin.
        events: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::Level::Info,
        1 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    if let Err(e) = simple_logger::init_with_level(level) {
        eprintln!("Could not start logger: {}", e);
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let options = match &cli.options {
        Some(path) => TrainerOptions::from_yaml(&fs::read_to_string(path)?)?,
        None => TrainerOptions::default(),
    };
    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut trainer = Trainer::new(options, rng, 0.0)?;

    match cli.command {
        Command::Generate => {
            println!("{}", trainer.session().notation()?);
        }
        Command::Replay { events } => {
            let source = read_events(&events)?;
            replay(&mut trainer, &source)?;
        }
    }
    Ok(())
}

fn read_events(path: &Path) -> io::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(path)
    }
}

/// Parse `status pitch velocity timestamp` into raw bytes and a timestamp.
fn parse_line(line: &str, number: usize) -> Result<(Vec<u8>, f64), NotesyError> {
    let bad = |what: &str| NotesyError::ConfigError(format!("line {}: {}", number, what));
    let fields: Vec<&str> = line.split_whitespace().collect();
    let (timestamp, bytes) = fields.split_last().ok_or_else(|| bad("empty message"))?;
    let timestamp: f64 = timestamp.parse().map_err(|_| bad("timestamp is not a number"))?;
    let bytes = bytes
        .iter()
        .map(|b| b.parse::<u8>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| bad("MIDI bytes must be 0-255"))?;
    Ok((bytes, timestamp))
}

fn replay(trainer: &mut Trainer<StdRng>, source: &str) -> Result<(), NotesyError> {
    let session = trainer.session_mut();
    let total = session.sequence().len();

    for (i, line) in source.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (bytes, timestamp) = parse_line(line, i + 1)?;
        match session.handle_raw(&bytes, timestamp) {
            Some(MatchOutcome::Advanced) => {
                println!("{:>8} ms  cluster {}/{}", timestamp, session.matcher().cursor(), total)
            }
            Some(MatchOutcome::Completed) => println!("{:>8} ms  passage complete", timestamp),
            Some(MatchOutcome::Pending) | Some(MatchOutcome::Ignored) | None => {}
        }
    }

    match session.summary() {
        Some(summary) => println!("{}", summary),
        None => println!(
            "Passage not finished: {}/{} clusters played",
            session.matcher().cursor(),
            total
        ),
    }
    Ok(())
}
