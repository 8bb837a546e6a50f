use std::fs::File;
use std::io;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use eyre::{bail, Context};
use tracing::warn;

use linecrypt::crypter::Crypter;
use linecrypt::encrypt::cipher::PaddingMode;
use linecrypt::pipeline::{self, Direction};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Encrypt,
    Decrypt,
}

/// Encrypts or decrypts newline-delimited records with AES-256-ECB under a
/// key derived from the secret. Ciphertext records are base64 lines.
#[derive(Debug, Parser)]
#[command(version, about)]
struct AppArguments {
    /// Transformation applied to every input line
    #[arg(long, value_enum)]
    mode: Mode,

    /// Input file, defaults to stdin
    #[arg(long)]
    infile: Option<PathBuf>,

    /// Output file, defaults to stdout
    #[arg(long)]
    outfile: Option<PathBuf>,

    /// Secret the cipher key is derived from
    #[arg(long)]
    secret: String,

    /// Strip padding by its trailing length byte without validating it
    #[arg(long)]
    lenient_padding: bool,
}

fn main() -> Result<(), eyre::Error> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = AppArguments::parse();

    let padding = if args.lenient_padding {
        PaddingMode::Lenient
    } else {
        PaddingMode::Strict
    };
    let crypter = Crypter::new(&args.secret)
        .wrap_err("cipher setup failed")?
        .with_padding(padding);

    let records = match &args.infile {
        Some(path) => {
            let file =
                File::open(path).wrap_err_with(|| format!("cannot open {}", path.display()))?;
            pipeline::read_records(file)?
        }
        None => pipeline::read_records(io::stdin().lock())?,
    };

    let direction = match args.mode {
        Mode::Encrypt => Direction::Encrypt,
        Mode::Decrypt => Direction::Decrypt,
    };
    let results = pipeline::process(&crypter, direction, &records);

    let total = results.len();
    let mut lines = Vec::with_capacity(total);
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(line) => lines.push(line),
            Err(err) => warn!(index, %err, "record skipped"),
        }
    }
    if total > 0 && lines.is_empty() {
        bail!("all {total} records failed");
    }

    match &args.outfile {
        Some(path) => {
            let file =
                File::create(path).wrap_err_with(|| format!("cannot create {}", path.display()))?;
            pipeline::write_records(file, &lines)?
        }
        None => pipeline::write_records(io::stdout().lock(), &lines)?,
    }

    Ok(())
}
