//! CryptKit CLI - Command line interface for password hashing and encryption.
//!
//! This tool hashes and verifies passwords, derives raw PBKDF2 keys, and
//! exposes the digest, HMAC and AES helpers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;
use zeroize::Zeroizing;

use cryptkit_common::codec::{bytes_to_hex, hex_to_bytes};
use cryptkit_crypto::random::{generate_base64_key, generate_hex_key};
use cryptkit_crypto::symmetric::{custom_decrypt, custom_encrypt};
use cryptkit_crypto::{
    compute_hash, compute_hmac, decrypt, derive_key, encrypt, AesKeySize, BlockSize,
    DigestEncoding, HashAlgorithm, PasswordHasher, PasswordHashingConfig, PasswordHashingData,
};

#[derive(Parser)]
#[command(name = "cryptkit")]
#[command(about = "CryptKit - Password hashing and text encryption")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Password hashing configuration (JSON).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash a password into a storable record.
    Hash {
        /// Password (prompted for when omitted).
        #[arg(short, long)]
        password: Option<String>,

        /// Write the record to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify a password against a stored record.
    Verify {
        /// Record file produced by `hash`.
        #[arg(short, long)]
        record: PathBuf,

        /// Password (prompted for when omitted).
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Derive a raw PBKDF2-HMAC-SHA512 key.
    Derive {
        /// Password (prompted for when omitted).
        #[arg(short, long)]
        password: Option<String>,

        /// Salt as hex (at least 8 bytes).
        #[arg(short, long)]
        salt: String,

        /// Iteration count (at least 1000).
        #[arg(short, long, default_value_t = 10000)]
        iterations: u32,

        /// Key length in bytes.
        #[arg(short, long, default_value_t = 64)]
        length: usize,
    },

    /// Hash text with a plain digest.
    Digest {
        /// md5, sha1, sha256, sha384 or sha512.
        #[arg(short, long, default_value = "sha512")]
        algorithm: HashAlgorithm,

        /// Text to hash.
        text: String,

        /// Salt appended to the text.
        #[arg(short, long, default_value = "")]
        salt: String,
    },

    /// Compute an HMAC.
    Hmac {
        /// md5, sha1, sha256, sha384 or sha512.
        #[arg(short, long, default_value = "sha256")]
        algorithm: HashAlgorithm,

        /// Text to authenticate.
        text: String,

        /// Key (UTF-8).
        #[arg(short, long)]
        key: String,

        /// Print Base64 instead of hex.
        #[arg(long)]
        base64: bool,
    },

    /// Encrypt text with AES-CBC.
    Encrypt {
        /// Text to encrypt.
        text: String,

        /// Key as hex.
        #[arg(short, long)]
        key: String,

        /// Key size in bits: 128, 192 or 256.
        #[arg(short = 's', long, default_value_t = 256)]
        key_size: usize,

        /// Use the legacy ISO 10126 padded variant.
        #[arg(long)]
        legacy: bool,
    },

    /// Decrypt text produced by `encrypt`.
    Decrypt {
        /// Cipher text in IV_CIPHER hex form.
        text: String,

        /// Key as hex.
        #[arg(short, long)]
        key: String,

        /// Key size in bits: 128, 192 or 256.
        #[arg(short = 's', long, default_value_t = 256)]
        key_size: usize,

        /// Use the legacy ISO 10126 padded variant.
        #[arg(long)]
        legacy: bool,
    },

    /// Generate a random key.
    Keygen {
        /// Key size in bits (multiple of 8).
        #[arg(short, long, default_value_t = 256)]
        bits: usize,

        /// Print Base64 instead of hex.
        #[arg(long)]
        base64: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Hash { password, output } => cmd_hash(config, password, output.as_deref()).await,

        Commands::Verify { record, password } => cmd_verify(config, &record, password).await,

        Commands::Derive {
            password,
            salt,
            iterations,
            length,
        } => cmd_derive(password, &salt, iterations, length).await,

        Commands::Digest {
            algorithm,
            text,
            salt,
        } => cmd_digest(algorithm, &text, &salt),

        Commands::Hmac {
            algorithm,
            text,
            key,
            base64,
        } => cmd_hmac(algorithm, &text, &key, base64),

        Commands::Encrypt {
            text,
            key,
            key_size,
            legacy,
        } => cmd_encrypt(&text, &key, key_size, legacy),

        Commands::Decrypt {
            text,
            key,
            key_size,
            legacy,
        } => cmd_decrypt(&text, &key, key_size, legacy),

        Commands::Keygen { bits, base64 } => cmd_keygen(bits, base64),
    }
}

/// Prompt for password securely.
fn prompt_password(prompt: &str) -> Result<Zeroizing<String>> {
    let password = rpassword::prompt_password(prompt).context("Failed to read password")?;
    Ok(Zeroizing::new(password))
}

/// Use the given password or prompt for one, optionally twice.
fn password_or_prompt(password: Option<String>, confirm: bool) -> Result<Zeroizing<String>> {
    if let Some(password) = password {
        return Ok(Zeroizing::new(password));
    }

    let password = prompt_password("Enter password: ")?;
    if confirm {
        let again = prompt_password("Confirm password: ")?;
        if *password != *again {
            anyhow::bail!("Passwords do not match");
        }
    }

    if password.trim().is_empty() {
        anyhow::bail!("Password cannot be empty");
    }
    Ok(password)
}

/// Build the hasher from an optional configuration file.
async fn load_hasher(config: Option<&Path>) -> Result<PasswordHasher> {
    let config = match config {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            let json = tokio::fs::read_to_string(path)
                .await
                .context("Failed to read configuration file")?;
            PasswordHashingConfig::from_json(&json).context("Invalid configuration")?
        }
        None => PasswordHashingConfig::default(),
    };

    PasswordHasher::new(config).context("Invalid configuration")
}

async fn read_record(path: &Path) -> Result<PasswordHashingData> {
    let json = tokio::fs::read_to_string(path)
        .await
        .context("Failed to read record file")?;
    PasswordHashingData::from_json(&json).context("Invalid record file")
}

async fn write_record(path: &Path, record: &PasswordHashingData) -> Result<()> {
    let json = record.to_json()?;
    tokio::fs::write(path, json)
        .await
        .context("Failed to write record file")
}

/// Hash a password.
async fn cmd_hash(
    config: Option<&Path>,
    password: Option<String>,
    output: Option<&Path>,
) -> Result<()> {
    let hasher = load_hasher(config).await?;
    let password = password_or_prompt(password, true)?;

    let record = tokio::task::spawn_blocking(move || hasher.hash_password(&password))
        .await
        .context("Hashing task failed")?
        .into_result()
        .context("Failed to hash password")?;

    info!(
        iterations = record.iterations,
        salt_size = record.salt_size,
        "Password hashed"
    );

    match output {
        Some(path) => {
            write_record(path, &record).await?;
            println!("Record written to {}", path.display());
        }
        None => println!("{}", record.to_json()?),
    }

    Ok(())
}

/// Verify a password against a record.
async fn cmd_verify(config: Option<&Path>, record: &Path, password: Option<String>) -> Result<()> {
    let hasher = load_hasher(config).await?;
    let record = read_record(record).await?;
    let password = password_or_prompt(password, false)?;

    tokio::task::spawn_blocking(move || hasher.compare_passwords(&password, &record))
        .await
        .context("Verification task failed")?
        .into_result()
        .context("Password verification failed")?;

    println!("Password verified.");

    Ok(())
}

/// Derive a raw key.
async fn cmd_derive(
    password: Option<String>,
    salt: &str,
    iterations: u32,
    length: usize,
) -> Result<()> {
    let salt = hex_to_bytes(salt).context("Salt must be hex")?;
    let password = password_or_prompt(password, false)?;

    let key = tokio::task::spawn_blocking(move || {
        derive_key(password.as_bytes(), &salt, iterations, length).map(Zeroizing::new)
    })
    .await
    .context("Derivation task failed")?
    .context("Failed to derive key")?;

    println!("{}", bytes_to_hex(&key));

    Ok(())
}

fn cmd_digest(algorithm: HashAlgorithm, text: &str, salt: &str) -> Result<()> {
    let digest = compute_hash(algorithm, text, salt).context("Nothing to hash")?;
    println!("{}", digest);
    Ok(())
}

fn cmd_hmac(algorithm: HashAlgorithm, text: &str, key: &str, base64: bool) -> Result<()> {
    let encoding = if base64 {
        DigestEncoding::Base64
    } else {
        DigestEncoding::Hex
    };
    let tag = compute_hmac(algorithm, text, key, encoding)?
        .context("Text and key are required")?;
    println!("{}", tag);
    Ok(())
}

fn cmd_encrypt(text: &str, key: &str, key_size: usize, legacy: bool) -> Result<()> {
    let key_size = AesKeySize::from_bits(key_size)?;
    let outcome = if legacy {
        custom_encrypt(text, key, key_size, BlockSize::Size128)
    } else {
        encrypt(text, key, key_size)
    };

    let cipher_text = outcome.into_result().context("Encryption failed")?;
    println!("{}", cipher_text);
    Ok(())
}

fn cmd_decrypt(text: &str, key: &str, key_size: usize, legacy: bool) -> Result<()> {
    let key_size = AesKeySize::from_bits(key_size)?;
    let outcome = if legacy {
        custom_decrypt(text, key, key_size, BlockSize::Size128)
    } else {
        decrypt(text, key, key_size)
    };

    let plaintext = outcome.into_result().context("Decryption failed")?;
    println!("{}", plaintext);
    Ok(())
}

fn cmd_keygen(bits: usize, base64: bool) -> Result<()> {
    if bits == 0 || bits % 8 != 0 {
        anyhow::bail!("Key size must be a positive multiple of 8 bits");
    }

    let key = if base64 {
        generate_base64_key(bits / 8)
    } else {
        generate_hex_key(bits / 8)
    };
    println!("{}", key);
    Ok(())
}
