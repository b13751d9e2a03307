use crate::error::Result;
use crate::policy::PolicyKind;
use crate::sequence::ReferenceSequence;
use crate::table::validate_capacity;
use crate::DEFAULT_FRAMES;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::env;
use std::process;

const DEFAULT_SEQUENCE: &str = "7,0,1,2,0,3,0,4,2,3,0,3,2,1,2,0,1,7,0,1";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Comma separated page references.
    #[arg(long, default_value_t = env_or_default_str("SIM_SEQUENCE", DEFAULT_SEQUENCE))]
    pub sequence: String,

    /// Read the page references from this file instead of `--sequence`.
    #[arg(long, default_value_t = env_or_default_str("SIM_FILE_SEQUENCE", ""))]
    pub file_sequence: String,

    /// Generate a random reference sequence instead of reading one.
    #[arg(long)]
    pub random: bool,

    /// Seed for `--random`, for reproducible runs.
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = env_or_default_u32("SIM_FRAMES", DEFAULT_FRAMES as u32))]
    pub frames: u32,

    #[arg(long, value_enum, default_value_t = env_or_default_policy("SIM_ALGORITHM", PolicyKind::Fifo))]
    pub algorithm: PolicyKind,

    /// Run every policy over the sequence and print a comparison table.
    #[arg(long)]
    pub compare: bool,

    /// Pause between steps, in milliseconds.
    #[arg(long, default_value_t = env_or_default_u32("SIM_DELAY_MS", 0))]
    pub delay_ms: u32,

    #[arg(long, default_value_t = env_or_default_str("SIM_FILE_STORE", "simulation_store.json"))]
    pub file_store: String,

    /// Store the finished run in `--file-store`.
    #[arg(long)]
    pub save: bool,

    /// Resume the run kept in `--file-store` instead of starting a new one.
    #[arg(long)]
    pub load: bool,
}

impl Config {
    /// Reject values no simulation could be built from.
    pub fn validate(&self) -> Result<()> {
        validate_capacity(self.capacity())
    }

    pub fn display(&self) {
        println!("simulation configuration values: ");
        println!("{:#?}", self);
    }

    pub fn capacity(&self) -> usize {
        self.frames as usize
    }

    /// The configured reference sequence: a random one if requested, otherwise the sequence file
    /// if one is named, otherwise the `sequence` string.
    pub fn reference_sequence(&self) -> Result<ReferenceSequence> {
        if self.random {
            let mut rng = match self.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            return Ok(ReferenceSequence::random(&mut rng));
        }
        match self.file_sequence.is_empty() {
            true => ReferenceSequence::parse(&self.sequence),
            false => ReferenceSequence::from_file(&self.file_sequence),
        }
    }
}

fn env_or_default_str(varname: &str, default: &str) -> String {
    match env::var(varname) {
        Ok(val) => val,
        _ => String::from(default),
    }
}

fn env_or_default_u32(varname: &str, default: u32) -> u32 {
    match env::var(varname) {
        Ok(val) => val.parse().unwrap_or_else(|_| {
            eprintln!("expected unsigned int for env var: '{}'", varname);
            process::exit(1);
        }),
        _ => default,
    }
}

fn env_or_default_policy(varname: &str, default: PolicyKind) -> PolicyKind {
    match env::var(varname) {
        Ok(val) => val.parse().unwrap_or_else(|err| {
            eprintln!("{} (env var: '{}')", err, varname);
            process::exit(1);
        }),
        _ => default,
    }
}
