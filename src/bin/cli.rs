//! sqrbeep CLI: WAV/SQR conversion over stdin/stdout and PC speaker playback.
//!
//! Usage:
//!   sb-cli wav2sqr [--right] < in.wav > out.sqr
//!   sb-cli sqr2wav < in.sqr > out.wav
//!   sb-cli play [--backend native|driver] [--wait counter-threshold] < in.sqr
//!   sb-cli beep --freq 440 --millis 250

use std::io::{self, BufReader, BufWriter, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use sb_master::{
    BackendKind, Channel, CycleWait, PlaybackSession, PlayerConfig, SessionError, DEFAULT_DRIVER,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sb-cli")]
#[command(about = "1-bit SQR audio conversion and PC speaker playback", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a WAV on stdin to SQR on stdout
    Wav2sqr {
        /// Keep the right channel of multi-channel input instead of the left
        #[arg(long)]
        right: bool,
    },

    /// Convert an SQR on stdin to an 8-bit mono WAV on stdout
    Sqr2wav,

    /// Play an SQR on stdin through the PC speaker
    Play {
        #[command(flatten)]
        ports: PortArgs,

        /// How to detect the end of each timer cycle
        #[arg(long, default_value = "status-bit")]
        wait: CycleWait,

        /// Simulate the ports and report how many accesses playback made
        #[arg(long)]
        dry_run: bool,
    },

    /// Sound a fixed tone
    Beep {
        #[command(flatten)]
        ports: PortArgs,

        /// Tone frequency in Hz
        #[arg(short, long, default_value = "440", value_parser = clap::value_parser!(u32).range(1..))]
        freq: u32,

        /// Tone length in milliseconds
        #[arg(short, long, default_value = "200")]
        millis: u64,

        /// Simulate the ports instead of touching hardware
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Args)]
struct PortArgs {
    /// Port access backend: auto, native or driver
    #[arg(long, env = "SQRBEEP_BACKEND", default_value = "auto")]
    backend: BackendKind,

    /// InpOut-compatible driver library for the driver backend
    #[arg(long, env = "SQRBEEP_DRIVER", default_value = DEFAULT_DRIVER)]
    driver: PathBuf,
}

impl PortArgs {
    fn config(self, wait: CycleWait) -> PlayerConfig {
        PlayerConfig {
            backend: self.backend,
            driver_path: self.driver,
            wait,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("sb-cli: {}", e);
        std::process::exit(e.exit_code());
    }
}

/// Logs go to stderr; stdout carries audio data.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn open_session(config: PlayerConfig, dry_run: bool) -> Result<PlaybackSession, SessionError> {
    if dry_run {
        Ok(PlaybackSession::dry_run(config))
    } else {
        PlaybackSession::open(config)
    }
}

fn run(command: Commands) -> Result<(), SessionError> {
    let mut input = BufReader::new(io::stdin().lock());
    match command {
        Commands::Wav2sqr { right } => {
            let channel = if right { Channel::Right } else { Channel::Left };
            let mut output = BufWriter::new(io::stdout().lock());
            sb_master::wav_to_sqr(&mut input, &mut output, channel)?;
        }
        Commands::Sqr2wav => {
            let mut output = BufWriter::new(io::stdout().lock());
            sb_master::sqr_to_wav(&mut input, &mut output)?;
        }
        Commands::Play { ports, wait, dry_run } => {
            let session = open_session(ports.config(wait), dry_run)?;
            let stats = session.play(input)?;
            if let Some(accesses) = session.port_accesses() {
                println!(
                    "Dry run: {} bytes ({} bits), {} port accesses",
                    stats.bytes_played,
                    stats.bits_played(),
                    accesses
                );
            }
        }
        Commands::Beep { ports, freq, millis, dry_run } => {
            let session = open_session(ports.config(CycleWait::default()), dry_run)?;
            session.beep(freq as f64, Duration::from_millis(millis))?;
            if let Some(accesses) = session.port_accesses() {
                println!("Dry run: {} Hz for {} ms, {} port accesses", freq, millis, accesses);
            }
        }
    }
    Ok(())
}
