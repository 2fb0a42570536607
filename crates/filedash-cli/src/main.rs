//! Filedash CLI — tenant dashboard for the file-storage service.
//!
//! Set FILEDASH_API_URL to point at the backend. Session state persists in
//! FILEDASH_SESSION_FILE (defaults to the platform config directory), so
//! `filedash login` once and subsequent commands reuse the session.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use uuid::Uuid;

use filedash_cli::{format_size, init_tracing};
use filedash_client::session::SessionManager;
use filedash_client::store::FileSessionStore;
use filedash_client::upload::{UploadItemStatus, UploadObserver, UploadPipeline, UploadSummary};
use filedash_client::ApiClient;
use filedash_core::constants::MAX_UPLOAD_FILES;
use filedash_core::models::UploadDestination;
use filedash_core::validation::{validate_password, validate_password_confirmation};
use filedash_core::ClientConfig;

#[derive(Parser)]
#[command(name = "filedash", about = "Tenant file-storage dashboard CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in as a tenant user
    Login {
        /// Account email
        #[arg(long)]
        email: String,
        /// Account password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Log out and clear the stored session
    Logout,
    /// Show the tenant account profile
    Profile,
    /// Change the account password (prompts for current and new)
    Password,
    /// File operations
    Files {
        #[command(subcommand)]
        sub: FileCommands,
    },
    /// Sync token operations
    Tokens {
        #[command(subcommand)]
        sub: TokenCommands,
    },
}

#[derive(Subcommand)]
enum FileCommands {
    /// List files
    List {
        /// Output format: json or table
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Upload files via presigned URLs (at most 3 per run)
    Upload {
        /// Paths of the files to upload
        paths: Vec<PathBuf>,
        /// Destination folder: root, uploads, assets, or schedules
        #[arg(long, default_value = "root")]
        to: String,
    },
    /// Fetch a file through its presigned download URL
    Download {
        /// File UUID
        id: Uuid,
        /// Output path (defaults to the file id)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Print the presigned URL instead of downloading
        #[arg(long)]
        url_only: bool,
    },
    /// Delete a file
    Delete {
        /// File UUID
        id: Uuid,
    },
}

#[derive(Subcommand)]
enum TokenCommands {
    /// List sync tokens
    List,
    /// Show one sync token
    Get {
        /// Token UUID
        id: Uuid,
    },
    /// Show usage statistics for a sync token
    Stats {
        /// Token UUID
        id: Uuid,
    },
}

/// Prints per-item status and the shared progress percentage to stderr.
struct ConsoleUploadObserver;

impl UploadObserver for ConsoleUploadObserver {
    fn on_item_status(&self, item_id: Uuid, status: UploadItemStatus) {
        tracing::debug!(%item_id, ?status, "upload item status");
    }

    fn on_progress(&self, percent: u8) {
        eprint!("\r  {:>3}%", percent);
        let _ = std::io::stderr().flush();
    }

    fn on_summary(&self, summary: &UploadSummary) {
        eprintln!("\n{}", summary.message());
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn prompt_password(prompt: &str) -> anyhow::Result<String> {
    dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .context("Failed to read password from terminal")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let config = ClientConfig::from_env().context("Failed to load configuration")?;
    let store = Arc::new(FileSessionStore::new(config.session_file.clone()));
    let client = ApiClient::new(&config, store)
        .context("Failed to create API client. Check FILEDASH_API_URL")?;
    let manager = SessionManager::new(client.clone());
    manager.initialize();

    let cli = Cli::parse();

    match cli.command {
        Commands::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt_password("Password")?,
            };
            let user = manager.login(&email, &password).await?;
            print_json(&user)?;
        }
        Commands::Logout => {
            manager.logout().await;
            println!("Logged out");
        }
        Commands::Profile => {
            let profile = client.tenant_profile().await?;
            print_json(&profile)?;
        }
        Commands::Password => {
            let current = prompt_password("Current password")?;
            let new = prompt_password("New password")?;
            let confirmation = prompt_password("Confirm new password")?;
            validate_password_confirmation(&new, &confirmation)?;
            validate_password(&new)?;
            client.change_password(&current, &new).await?;
            println!("Password changed");
        }
        Commands::Files { sub } => match sub {
            FileCommands::List { format } => {
                let files = client.list_files().await?;
                if format == "json" {
                    print_json(&files)?;
                } else {
                    for file in &files {
                        println!(
                            "{}  {:>10}  {:<9}  {}",
                            file.id,
                            format_size(file.file_size.max(0) as u64),
                            file.upload_status.to_string(),
                            file.original_filename
                        );
                    }
                }
            }
            FileCommands::Upload { paths, to } => {
                let destination: UploadDestination = to.parse()?;
                let mut pipeline = UploadPipeline::new(client.clone(), destination);
                let outcome = pipeline.select_files(&paths)?;
                if outcome.truncated > 0 {
                    eprintln!(
                        "Only the first {} files were queued; {} dropped",
                        MAX_UPLOAD_FILES, outcome.truncated
                    );
                }
                if pipeline.is_empty() {
                    println!("Nothing to upload");
                    return Ok(());
                }
                pipeline.run(Arc::new(ConsoleUploadObserver)).await;
                // Re-fetch the authoritative list now that the run settled.
                let files = client.list_files().await?;
                print_json(&files)?;
            }
            FileCommands::Download {
                id,
                output,
                url_only,
            } => {
                let target = client.download_url(id).await?;
                if url_only {
                    println!("{}", target.download_url);
                } else {
                    let output = output.unwrap_or_else(|| PathBuf::from(id.to_string()));
                    let bytes = client
                        .http()
                        .get(&target.download_url)
                        .send()
                        .await
                        .context("Failed to fetch object")?
                        .error_for_status()
                        .context("Object storage rejected the download")?
                        .bytes()
                        .await
                        .context("Failed to read object body")?;
                    tokio::fs::write(&output, &bytes)
                        .await
                        .with_context(|| format!("Failed to write {}", output.display()))?;
                    println!("Downloaded to {}", output.display());
                }
            }
            FileCommands::Delete { id } => {
                client.delete_file(id).await?;
                print_json(&serde_json::json!({
                    "success": true,
                    "message": format!("File {} deleted", id)
                }))?;
            }
        },
        Commands::Tokens { sub } => match sub {
            TokenCommands::List => {
                let tokens = client.list_sync_tokens().await?;
                print_json(&tokens)?;
            }
            TokenCommands::Get { id } => {
                let token = client.get_sync_token(id).await?;
                print_json(&token)?;
            }
            TokenCommands::Stats { id } => {
                let stats = client.sync_token_stats(id).await?;
                print_json(&stats)?;
            }
        },
    }

    Ok(())
}
