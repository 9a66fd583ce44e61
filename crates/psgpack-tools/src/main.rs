use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use psgpack::codec::EncoderConfig;
use psgpack::event::TickRate;

mod cui;
mod input;

/// psgpack command line tools
#[derive(Parser)]
#[command(
    name = "psgpack",
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Tick rate selection shared by every subcommand.
#[derive(Args, Debug, Clone, Copy)]
struct Timing {
    /// Play back at 50 Hz instead of 60 Hz
    #[arg(long)]
    pal: bool,

    /// Source samples per tick (overrides --pal)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    samples_per_tick: Option<u32>,
}

impl Timing {
    fn config(self) -> EncoderConfig {
        let rate = if self.pal { TickRate::Pal } else { TickRate::Ntsc };
        let mut config = EncoderConfig::new(rate);
        if let Some(samples) = self.samples_per_tick {
            config.samples_per_tick = samples;
        }
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a VGM file into a C header (accepts .vgm or .vgz; use '-' for stdin)
    Convert {
        /// Input file to read (use '-' for stdin)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output header path (defaults to stdout)
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,

        #[command(flatten)]
        timing: Timing,
    },
    /// Show encoding statistics and the loop point
    Info {
        /// Input file to read (use '-' for stdin)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        timing: Timing,
    },
    /// Run the player and print the register writes of each tick
    Play {
        /// Input file to read (use '-' for stdin)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Number of ticks to run (defaults to one pass plus one loop)
        #[arg(long, value_name = "N")]
        ticks: Option<u64>,

        /// Print SN76489 port bytes instead of logical register writes
        #[arg(long)]
        port: bool,

        #[command(flatten)]
        timing: Timing,
    },
    /// Check that the compressed stream and the player reproduce the input
    Verify {
        /// Input file to read (use '-' for stdin)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        timing: Timing,
    },
}

fn main() -> Result<()> {
    // stdout carries the converted header; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            file,
            output,
            timing,
        } => {
            let bytes = input::read_vgm_as_vec(&file)?;
            cui::convert::convert(&file, bytes, timing.config(), output.as_deref())?;
        }
        Commands::Info { file, timing } => {
            let bytes = input::read_vgm_as_vec(&file)?;
            cui::info::info(&file, bytes, timing.config())?;
        }
        Commands::Play {
            file,
            ticks,
            port,
            timing,
        } => {
            let bytes = input::read_vgm_as_vec(&file)?;
            cui::play::play(&file, bytes, timing.config(), ticks, port)?;
        }
        Commands::Verify { file, timing } => {
            let bytes = input::read_vgm_as_vec(&file)?;
            cui::verify::verify(&file, bytes, timing.config())?;
        }
    }

    Ok(())
}
