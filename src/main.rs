use anyhow::{Result, anyhow, bail};
use clap::{Parser, Subcommand};
mod auth;
use habitlock::{BackupEnvelope, Habit, RestoreOutcome, Storage, Vault, default_storage};
use std::fs;
use std::path::PathBuf;

fn resolve_storage(path: Option<PathBuf>) -> Result<Storage> {
    match path {
        Some(p) => Ok(Storage::new(p)),
        None => default_storage(),
    }
}

#[derive(Debug, Parser)]
#[command(name = "habitlock")]
#[command(
    version,
    about = "PIN-locked encrypted local store for habit tracking data."
)]
struct Cli {
    /// Path to the vault file
    #[arg(long, global = true, value_name = "PATH", env = "HABITLOCK_VAULT")]
    vault: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sets up a new vault protected by a PIN
    Init,

    /// Shows whether the vault is configured
    Status,

    /// Prints the decrypted document as JSON
    Show,

    /// Adds a habit
    #[command(arg_required_else_help = true)]
    Add { id: String, name: String },

    /// Records a habit completion (defaults to today)
    #[command(arg_required_else_help = true)]
    Done {
        id: String,
        /// Completion date as YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
    },

    /// Changes the vault PIN
    ChangePin,

    /// Writes a backup envelope to a file
    #[command(arg_required_else_help = true)]
    Export { file: PathBuf },

    /// Restores a backup envelope from a file
    #[command(arg_required_else_help = true)]
    Restore { file: PathBuf },

    /// Erases the vault entirely
    Wipe,
}

fn unlock(vault: &mut Vault) -> Result<()> {
    let pin = auth::read_pin()?;
    if !vault.verify_pin(&pin)? {
        bail!("incorrect PIN");
    }
    Ok(())
}

fn current_document(vault: &mut Vault) -> Result<habitlock::Document> {
    vault
        .document()
        .cloned()
        .ok_or_else(|| anyhow!("vault is locked"))
}

fn main() -> Result<()> {
    let args = Cli::parse();
    let storage = resolve_storage(args.vault)?;
    let mut vault = Vault::new(storage);

    match args.command {
        Commands::Init => {
            let pin = auth::read_new_pin_with_confirmation()?;
            vault.setup_pin(&pin)?;
            println!("vault initialized");
        }
        Commands::Status => {
            if vault.is_configured() {
                match vault.pin_length() {
                    Some(n) => println!("configured ({n}-digit PIN)"),
                    None => println!("configured"),
                }
            } else {
                println!("not configured");
            }
        }
        Commands::Show => {
            unlock(&mut vault)?;
            let doc = current_document(&mut vault)?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        Commands::Add { id, name } => {
            unlock(&mut vault)?;
            let mut doc = current_document(&mut vault)?;
            if doc.habits().iter().any(|h| h.id() == id) {
                bail!("habit '{id}' already exists");
            }
            doc.add_habit(Habit::new(&id, &name));
            vault.save_document(doc)?;
            println!("added habit '{id}'");
        }
        Commands::Done { id, date } => {
            unlock(&mut vault)?;
            let mut doc = current_document(&mut vault)?;
            if !doc.habits().iter().any(|h| h.id() == id) {
                bail!("no habit '{id}'");
            }
            let date =
                date.unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());
            doc.record_completion(&id, &date);
            vault.save_document(doc)?;
            println!("recorded '{id}' on {date}");
        }
        Commands::ChangePin => {
            let old_pin = auth::read_pin()?;
            let new_pin = auth::read_new_pin_with_confirmation()?;
            if !vault.change_pin(&old_pin, &new_pin)? {
                bail!("incorrect PIN");
            }
            println!("PIN changed");
        }
        Commands::Export { file } => {
            let pin = auth::read_pin()?;
            match vault.export_envelope(&pin)? {
                Some(envelope) => {
                    fs::write(&file, envelope.to_json()?)?;
                    println!("backup written to {}", file.display());
                }
                None => bail!("incorrect PIN"),
            }
        }
        Commands::Restore { file } => {
            let pin = auth::read_pin()?;
            let envelope = BackupEnvelope::from_json(&fs::read_to_string(&file)?)?;
            match vault.restore_from_envelope(&envelope, &pin)? {
                RestoreOutcome::Restored => println!("backup restored"),
                RestoreOutcome::IncorrectPin => {
                    bail!("could not restore: wrong PIN or unreadable backup")
                }
            }
        }
        Commands::Wipe => {
            vault.clear_all()?;
            println!("vault erased");
        }
    }

    Ok(())
}
