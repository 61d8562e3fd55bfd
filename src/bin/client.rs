//! filevault Client Binary
//!
//! Runs backup operations against a filevault server.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use filevault::config::{load_backup_list, ServerInfo};
use filevault::{BackupClient, ClientConfig, Outcome};
use tracing_subscriber::{fmt, EnvFilter};

/// filevault backup client
#[derive(Parser, Debug)]
#[command(name = "filevault")]
#[command(about = "Back up, restore and list files on a filevault server")]
#[command(version)]
struct Args {
    /// File holding the server address (host:port)
    #[arg(long, default_value = "server.info")]
    server_info: PathBuf,

    /// Server address (host:port), overrides --server-info
    #[arg(short, long)]
    server: Option<String>,

    /// File listing the local files to back up, one per line
    #[arg(long, default_value = "backup.info")]
    backup_info: PathBuf,

    /// Directory where retrieved files and listings are written
    #[arg(long, default_value = ".")]
    staging_dir: PathBuf,

    /// Treat payloads shorter than announced as failures
    #[arg(long)]
    reject_truncated: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the standard session over the files in --backup-info
    Session,

    /// List files stored on the server
    List,

    /// Upload a local file
    Save {
        /// The file to upload
        file: String,
    },

    /// Download a file into the staging directory
    Retrieve {
        /// The file to download
        file: String,
    },

    /// Delete a file from the server
    Delete {
        /// The file to delete
        file: String,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,filevault=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("filevault client v{}", filevault::VERSION);

    let server_addr = match resolve_server(args.server.as_deref(), &args.server_info) {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!("Failed to load server address: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server address: {}", server_addr);

    let config = ClientConfig::builder()
        .server_addr(server_addr)
        .staging_dir(&args.staging_dir)
        .reject_truncated(args.reject_truncated)
        .build();

    let client = BackupClient::new(config);
    tracing::debug!("Generated user id {}", client.user_id());

    let outcomes = match args.command.unwrap_or(Commands::Session) {
        Commands::Session => {
            let filenames = match load_backup_list(&args.backup_info) {
                Ok(names) => names,
                Err(e) => {
                    tracing::error!(
                        "Failed to load {}: {}",
                        args.backup_info.display(),
                        e
                    );
                    std::process::exit(1);
                }
            };
            match client.run_session(&filenames) {
                Ok(outcomes) => outcomes,
                Err(e) => {
                    tracing::error!("Cannot run session: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::List => vec![client.list()],
        Commands::Save { file } => vec![client.save(&file)],
        Commands::Retrieve { file } => vec![client.retrieve(&file)],
        Commands::Delete { file } => vec![client.delete(&file)],
    };

    for outcome in &outcomes {
        print_outcome(outcome);
    }
}

fn resolve_server(flag: Option<&str>, info_path: &Path) -> filevault::Result<String> {
    match flag {
        Some(addr) => Ok(ServerInfo::parse(addr)?.addr()),
        None => Ok(ServerInfo::load(info_path)?.addr()),
    }
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Completed { .. } => println!("{}", outcome),
        Outcome::Failed { .. } => eprintln!("{}", outcome),
    }
}
