//! kyber-filecrypt CLI.
//! Encrypts a file under an ML-KEM-derived AES-256 key, decrypts it again,
//! and checks the round trip.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::LevelFilter;

use kyber_filecrypt::{KemSuite, Pipeline};

#[derive(Parser)]
#[command(
    name = "kyber-filecrypt",
    author,
    version,
    about = "Encrypt and decrypt a file with an ML-KEM derived AES-256 key"
)]
struct Cli {
    /// File to encrypt and decrypt; prompted for when omitted.
    path: Option<PathBuf>,
    #[arg(long, value_enum, default_value = "ml-kem-512")]
    suite: SuiteArg,
    #[arg(long)]
    debug: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SuiteArg {
    #[value(name = "ml-kem-512")]
    MlKem512,
    #[value(name = "ml-kem-768")]
    MlKem768,
    #[value(name = "ml-kem-1024")]
    MlKem1024,
}

impl From<SuiteArg> for KemSuite {
    fn from(arg: SuiteArg) -> Self {
        match arg {
            SuiteArg::MlKem512 => KemSuite::MlKem512,
            SuiteArg::MlKem768 => KemSuite::MlKem768,
            SuiteArg::MlKem1024 => KemSuite::MlKem1024,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let path = match cli.path {
        Some(path) => path,
        None => prompt_path()?,
    };

    let suite: KemSuite = cli.suite.into();
    let pipeline = Pipeline::new(suite.provider());
    let report = pipeline
        .run(&path)
        .with_context(|| format!("{suite} pipeline aborted for {}", path.display()))?;

    println!("AES-256 encryption key (SHA-256 hash): {}", report.key_fingerprint);
    println!(
        "Encrypted file: {} ({} bytes)",
        report.encrypted.display(),
        report.container_len
    );
    println!(
        "Decrypted file: {} ({} bytes)",
        report.decrypted.display(),
        report.plaintext_len
    );
    println!("Verification successful: the decrypted file matches the original.");
    Ok(())
}

fn prompt_path() -> Result<PathBuf> {
    print!("Enter the file path to encrypt & decrypt: ");
    io::stdout().flush().context("flushing prompt")?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading file path from stdin")?;
    let trimmed = line.trim();
    if trimmed.is_empty() {
        bail!("no file path given");
    }
    Ok(PathBuf::from(trimmed))
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(default));
    builder.format_timestamp(None);
    if debug {
        builder.filter_level(LevelFilter::Debug);
    }
    let _ = builder.try_init();
}
