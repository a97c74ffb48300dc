// Command definitions and handlers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

use crate::api::{ApiClient, NodeResources};
use crate::auth::AuthFlow;
use crate::cli::render::{render_activity, render_files, render_snapshot};
use crate::config::Config;
use crate::dashboard::{ActivityLog, PendingCommands, Reconciler};
use crate::files::FileTransferManager;
use crate::nodes::NodeLifecycleController;
use crate::session::SessionStore;

#[derive(Parser)]
#[command(name = "nodedeck", version, about = "Dashboard client for a distributed chunked storage cluster")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log in; the backend mails a 6-digit OTP code
    Login {
        #[arg(long)]
        email: String,
    },
    /// Create an account; the backend mails a 6-digit OTP code
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Submit the OTP code to finish logging in
    Verify { code: String },
    /// Drop the session
    Logout,
    /// One reconciliation pass, then print the snapshot
    Status,
    /// Poll continuously and print each new snapshot (Ctrl-C to exit)
    Watch,
    /// Node lifecycle commands
    #[command(subcommand)]
    Node(NodeCommand),
    /// File commands
    #[command(subcommand)]
    File(FileCommand),
}

#[derive(Subcommand)]
pub enum NodeCommand {
    /// Start a new node (id is generated)
    Start {
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        storage_gb: Option<u32>,
        #[arg(long)]
        ram_gb: Option<u32>,
    },
    Stop {
        node_id: String,
    },
    Restart {
        node_id: String,
    },
    Delete {
        node_id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Delete every node in the roster
    DeleteAll {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum FileCommand {
    /// List stored files
    Ls,
    Upload {
        path: PathBuf,
    },
    Download {
        file_id: i64,
    },
    Rm {
        file_id: i64,
        #[arg(long)]
        yes: bool,
    },
}

pub async fn handle_command(config: &Config, command: Command) -> Result<()> {
    match command {
        Command::Login { email } => login(config, &email).await,
        Command::Register { name, email } => register(config, &name, &email).await,
        Command::Verify { code } => verify(config, &code).await,
        Command::Logout => logout(config),
        Command::Status => status(config).await,
        Command::Watch => watch(config).await,
        Command::Node(cmd) => node_command(config, cmd).await,
        Command::File(cmd) => file_command(config, cmd).await,
    }
}

// ---- auth ------------------------------------------------------------

async fn login(config: &Config, email: &str) -> Result<()> {
    let password = prompt("Password: ")?;
    let mut flow = auth_flow(config)?;
    flow.submit_login(email, &password).await?;
    println!("OTP sent to {email}. Finish with: nodedeck verify <code>");
    Ok(())
}

async fn register(config: &Config, name: &str, email: &str) -> Result<()> {
    let password = prompt("Password: ")?;
    let mut flow = auth_flow(config)?;
    flow.submit_register(name, email, &password).await?;
    println!("Registration accepted; OTP sent to {email}. Finish with: nodedeck verify <code>");
    Ok(())
}

async fn verify(config: &Config, code: &str) -> Result<()> {
    let mut flow = auth_flow(config)?;
    flow.submit_otp(code).await?;
    println!("Logged in.");
    Ok(())
}

fn logout(config: &Config) -> Result<()> {
    let mut flow = auth_flow(config)?;
    flow.logout()?;
    println!("Logged out.");
    Ok(())
}

fn auth_flow(config: &Config) -> Result<AuthFlow> {
    let client = ApiClient::new(&config.api_base_url)?;
    AuthFlow::resume(client, SessionStore::new()?)
}

// ---- dashboard -------------------------------------------------------

/// Everything an authenticated command needs: the client plus a
/// reconciler wired to a fresh pending map and activity log.
fn session_context(config: &Config) -> Result<(ApiClient, String, Reconciler)> {
    let client = ApiClient::new(&config.api_base_url)?;
    let token = SessionStore::new()?.require_token()?;
    let reconciler = Reconciler::new(
        client.clone(),
        token.clone(),
        config.poll_interval(),
        PendingCommands::new(),
        ActivityLog::new(),
    );
    Ok((client, token, reconciler))
}

async fn status(config: &Config) -> Result<()> {
    let (_, _, reconciler) = session_context(config)?;
    reconciler.reconcile_now().await;
    let snapshot = reconciler.current();
    print!("{}", render_snapshot(&snapshot, reconciler.pending()));
    print!("{}", render_activity(reconciler.activity(), 5));
    Ok(())
}

async fn watch(config: &Config) -> Result<()> {
    let (_, _, reconciler) = session_context(config)?;
    let mut rx = reconciler.subscribe();

    let loop_handle = {
        let reconciler = reconciler.clone();
        tokio::spawn(async move { reconciler.run().await })
    };

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                // Whole-snapshot replacement: what gets printed is one
                // consistent cycle, never a mix of two.
                print!("\x1b[2J\x1b[H");
                print!("{}", render_snapshot(&snapshot, reconciler.pending()));
                println!();
                print!("{}", render_activity(reconciler.activity(), 8));
            }
            _ = tokio::signal::ctrl_c() => {
                reconciler.stop();
                break;
            }
        }
    }

    loop_handle.abort();
    Ok(())
}

// ---- nodes -----------------------------------------------------------

async fn node_command(config: &Config, cmd: NodeCommand) -> Result<()> {
    let (client, token, reconciler) = session_context(config)?;
    // Commands are guarded against the cached roster; populate it.
    reconciler.reconcile_now().await;
    let controller = NodeLifecycleController::new(client, token, reconciler.clone());

    match cmd {
        NodeCommand::Start {
            port,
            storage_gb,
            ram_gb,
        } => {
            let defaults = NodeResources::default();
            let resources = if port.is_some() || storage_gb.is_some() || ram_gb.is_some() {
                Some(NodeResources {
                    port: port.unwrap_or(defaults.port),
                    storage_gb: storage_gb.unwrap_or(defaults.storage_gb),
                    ram_gb: ram_gb.unwrap_or(defaults.ram_gb),
                })
            } else {
                None
            };
            let node_id = controller.start(resources).await?;
            println!("Node {node_id} starting; it will appear in the roster shortly.");
        }
        NodeCommand::Stop { node_id } => {
            controller.stop(&node_id).await?;
            println!("Node {node_id} stopped.");
        }
        NodeCommand::Restart { node_id } => {
            controller.restart(&node_id).await?;
            println!("Node {node_id} restarting.");
        }
        NodeCommand::Delete { node_id, yes } => {
            if !yes && !confirm(&format!("Delete node {node_id}?"))? {
                println!("Cancelled.");
                return Ok(());
            }
            controller.delete(&node_id).await?;
            println!("Node {node_id} deleted.");
        }
        NodeCommand::DeleteAll { yes } => {
            if !yes && !confirm("Stop ALL nodes?")? {
                println!("Cancelled.");
                return Ok(());
            }
            controller.delete_all().await?;
            println!("All nodes stopped.");
        }
    }
    Ok(())
}

// ---- files -----------------------------------------------------------

async fn file_command(config: &Config, cmd: FileCommand) -> Result<()> {
    let (client, token, reconciler) = session_context(config)?;

    // Flat listing needs no snapshot; skip the full reconciliation pass.
    if matches!(cmd, FileCommand::Ls) {
        let files = client.list_files(&token).await?;
        print!("{}", render_files(&files));
        return Ok(());
    }

    reconciler.reconcile_now().await;
    let manager = FileTransferManager::new(client, token, reconciler.clone());

    match cmd {
        FileCommand::Ls => {}
        FileCommand::Upload { path } => {
            let result = manager.upload(&path).await?;
            println!(
                "Uploaded {} ({} chunks).",
                result.file_name.as_deref().unwrap_or("file"),
                result.total_chunks
            );
        }
        FileCommand::Download { file_id } => {
            let snapshot = reconciler.current();
            let entry = snapshot
                .files
                .iter()
                .find(|f| f.id == file_id)
                .with_context(|| format!("No file with id {file_id} in the file list"))?;
            let dest = manager
                .download(file_id, &entry.file_name, &config.download_dir)
                .await?;
            println!("Saved to {}.", dest.display());
        }
        FileCommand::Rm { file_id, yes } => {
            let snapshot = reconciler.current();
            let entry = snapshot
                .files
                .iter()
                .find(|f| f.id == file_id)
                .with_context(|| format!("No file with id {file_id} in the file list"))?;
            let file_name = entry.file_name.clone();
            if !yes && !confirm(&format!("Delete \"{file_name}\"?"))? {
                println!("Cancelled.");
                return Ok(());
            }
            manager.delete(file_id, &file_name).await?;
            println!("Deleted \"{file_name}\".");
        }
    }
    Ok(())
}

// ---- prompts ---------------------------------------------------------

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read input")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn confirm(question: &str) -> Result<bool> {
    let answer = prompt(&format!("{question} [y/N] "))?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "YES"))
}
