// ABOUTME: CLI entry point for uploading to snips.sh.
// ABOUTME: Dispatches upload, sign, and key subcommands onto snips-client.

mod config;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use config::{ConnectionArgs, FileConfig, Settings};
use snips_client::{sanitize, ConnectionConfig, Snip, SnipsClient, UploadOptions};
use snips_ssh::RsaKeyGenerator;
use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "snips")]
#[command(about = "Upload to snips.sh over SSH")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Config file (defaults to ~/.config/snips/config.toml)
    #[arg(long, global = true, env = "SNIPS_CONFIG")]
    config: Option<PathBuf>,

    /// Use a throwaway in-memory identity instead of the identity file
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file, or stdin when no file is given
    Upload {
        /// File to upload
        file: Option<PathBuf>,

        /// Keep the snip off the public web view
        #[arg(long)]
        private: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Also request a signed link after uploading
        #[arg(long)]
        sign: bool,
    },

    /// Request a short-lived signed link for an existing snip
    Sign {
        /// Snip id
        id: String,
    },

    /// Show the identity used to authenticate
    Key {
        /// Print the public key instead of the fingerprint
        #[arg(long)]
        public: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.verbose {
        0 => snips_log::init(),
        1 => snips_log::init_for("snips", Level::INFO),
        _ => snips_log::init_for("snips", Level::DEBUG),
    }

    let file = FileConfig::load(cli.config.as_deref())?;
    let settings = Settings::resolve(file, cli.connection);
    let client = SnipsClient::new(with_identity(&settings, cli.ephemeral).await?);

    match cli.command {
        Commands::Upload {
            file,
            private,
            json,
            sign,
        } => run_upload(&client, file, UploadOptions { private }, json, sign).await,
        Commands::Sign { id } => run_sign(&client, &id).await,
        Commands::Key { public } => run_key(&client, &settings, cli.ephemeral, public).await,
    }
}

/// Attach the persisted identity to the connection config.
///
/// With `ephemeral` the config is left keyless and the client generates a
/// key in memory on first use.
async fn with_identity(settings: &Settings, ephemeral: bool) -> Result<ConnectionConfig> {
    let config = settings.connection.clone();
    if ephemeral {
        return Ok(config);
    }

    let path = settings
        .identity_path
        .clone()
        .context("Could not determine identity path; pass --identity or --ephemeral")?;

    let display = path.display().to_string();
    // Blocking file I/O and a possible 4096-bit generation go to the blocking
    // pool; network I/O stays on the async task.
    let pem = tokio::task::spawn_blocking(move || {
        snips_ssh::load_or_generate_key(&path, &RsaKeyGenerator::new())
    })
    .await?
    .with_context(|| format!("Failed to load identity from {display}"))?;

    Ok(config.with_private_key(pem))
}

/// Read the upload payload from a file or stdin.
fn read_content(file: Option<PathBuf>) -> Result<Vec<u8>> {
    let content = match file {
        Some(path) => std::fs::read(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    if content.is_empty() {
        bail!("Nothing to upload: input is empty");
    }
    Ok(content)
}

async fn run_upload(
    client: &SnipsClient,
    file: Option<PathBuf>,
    options: UploadOptions,
    json: bool,
    sign: bool,
) -> Result<()> {
    let content = read_content(file)?;
    let snip = client.upload(&content, options).await.context("Upload failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snip)?);
    } else {
        print_snip(&snip);
    }

    if sign {
        let signed = snip.sign().await.context("Signing failed")?;
        print_transcript(&signed);
    }
    Ok(())
}

async fn run_sign(client: &SnipsClient, id: &str) -> Result<()> {
    let signed = client.sign(id).await.context("Signing failed")?;
    print_transcript(&signed);
    Ok(())
}

async fn run_key(
    client: &SnipsClient,
    settings: &Settings,
    ephemeral: bool,
    public: bool,
) -> Result<()> {
    let identity = client.identity().await?;
    let pem = identity
        .private_key
        .as_deref()
        .context("No identity available")?;

    if public {
        println!("{}", snips_ssh::public_key_openssh(pem)?);
        return Ok(());
    }

    println!("Fingerprint: {}", snips_ssh::fingerprint(pem)?);
    match (&settings.identity_path, ephemeral) {
        (Some(path), false) => println!("Identity:    {}", path.display()),
        _ => println!("Identity:    (ephemeral)"),
    }
    Ok(())
}

fn print_snip(snip: &Snip) {
    println!("id:         {}", snip.id);
    println!("size:       {}", snip.size);
    println!("type:       {}", snip.content_type);
    println!("visibility: {}", snip.visibility);
    if !snip.remote_shell_command.is_empty() {
        println!("ssh:        ssh {}", snip.remote_shell_command);
    }
    if let Some(url) = &snip.url {
        println!("url:        {}", url);
    }
}

/// Print a service transcript, keeping its colours only on a terminal.
fn print_transcript(text: &str) {
    if std::io::stdout().is_terminal() {
        print!("{}", text);
    } else {
        print!("{}", sanitize(text));
    }
}
