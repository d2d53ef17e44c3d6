use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use memoir_core::error::MemoirError;
use memoir_core::{paths, KeyStore, MemoryService, PinGate, RecordStore};

#[derive(Parser, Debug)]
#[command(name = "memoir")]
#[command(version, about = "MEMOIR - your time-locked digital diary", long_about = None)]
struct Cli {
    /// Override the data directory (default: per-user app data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add a memory with a future unlock date
    Add {
        /// Unlock date (YYYY-MM-DD)
        #[arg(long)]
        unlock: String,
        /// Memory text; prompted for when omitted
        text: Option<String>,
    },
    /// List memories with their unlock status
    List,
    /// Reveal a memory once its unlock date has arrived
    Reveal {
        /// Index from `memoir list`
        index: usize,
    },
    /// Delete one memory, locked or not
    Delete {
        /// Index from `memoir list`
        index: usize,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Delete every memory
    DeleteAll {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show the data directory, entry count and key fingerprint
    Status,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => paths::data_dir().context("resolve data directory")?,
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();

    let mut gate = PinGate::load(paths::pin_file(&data_dir))?;
    unlock_or_exit(&mut gate, &mut input)?;

    let keys = KeyStore::load_or_create(paths::key_file(&data_dir))?;
    let store = RecordStore::new(paths::data_file(&data_dir));
    let service = MemoryService::new(keys, store);

    match cli.command {
        Some(command) => run_command(&service, &data_dir, command, &mut input),
        None => menu_loop(&service, &mut input),
    }
}

/// First run enrolls the PIN; later runs verify it, with a hard stop
/// after the attempt limit.
fn unlock_or_exit(gate: &mut PinGate, input: &mut impl BufRead) -> Result<()> {
    if !gate.is_enrolled() {
        println!("Set up your MEMOIR master PIN.");
        loop {
            let pin = prompt(input, "Enter a new PIN: ")?;
            let confirm = prompt(input, "Confirm your PIN: ")?;
            match gate.enroll(&pin, &confirm) {
                Ok(()) => {
                    println!("PIN set successfully.");
                    return Ok(());
                }
                Err(err) => println!("{err}. Try again."),
            }
        }
    }
    loop {
        let pin = prompt(input, "Enter your MEMOIR PIN: ")?;
        match gate.verify(&pin) {
            Ok(()) => return Ok(()),
            Err(MemoirError::AttemptsExhausted) => {
                eprintln!("Too many wrong attempts. Exiting.");
                return Err(MemoirError::AttemptsExhausted.into());
            }
            Err(err) => println!("{err}"),
        }
    }
}

fn run_command(
    service: &MemoryService,
    data_dir: &Path,
    command: Commands,
    input: &mut impl BufRead,
) -> Result<()> {
    match command {
        Commands::Add { unlock, text } => {
            let text = match text {
                Some(text) => text,
                None => prompt(input, "Enter your memory: ")?,
            };
            let id = service.add_memory(&text, &unlock)?;
            println!("Memory saved ({id}).");
        }
        Commands::List => {
            print_listing(service)?;
        }
        Commands::Reveal { index } => {
            let text = service.reveal_memory(index)?;
            println!("{text}");
        }
        Commands::Delete { index, yes } => {
            if yes || confirm(input, &format!("Delete memory {index}? (y/n): "))? {
                let removed = service.delete_memory(index)?;
                println!("Deleted memory from {}.", removed.unlock_date);
            } else {
                println!("Deletion cancelled.");
            }
        }
        Commands::DeleteAll { yes } => {
            if yes || confirm(input, "Delete ALL memories? (y/n): ")? {
                service.delete_all()?;
                println!("All memories deleted.");
            } else {
                println!("Deletion cancelled.");
            }
        }
        Commands::Status => {
            println!("Data directory: {}", data_dir.display());
            println!("Memories:       {}", service.entry_count()?);
            println!("Key:            {}", service.key_fingerprint());
        }
    }
    Ok(())
}

/// Interactive menu, entered when no subcommand is given.
/// Recoverable errors are printed and the loop continues.
fn menu_loop(service: &MemoryService, input: &mut impl BufRead) -> Result<()> {
    loop {
        println!();
        println!("===== MEMOIR - Your Digital Diary =====");
        println!("1. Add a memory");
        println!("2. View a memory");
        println!("3. Delete a memory");
        println!("4. Delete all memories");
        println!("5. Exit");
        let choice = prompt(input, "Enter choice: ")?;
        let result = match choice.as_str() {
            "1" => add_interactive(service, input),
            "2" => reveal_interactive(service, input),
            "3" => delete_interactive(service, input),
            "4" => delete_all_interactive(service, input),
            "5" => break,
            _ => {
                println!("Invalid choice, try again.");
                continue;
            }
        };
        if let Err(err) = result {
            println!("{err}");
        }
    }
    println!("Goodbye. Stay safe with your memories.");
    Ok(())
}

fn add_interactive(service: &MemoryService, input: &mut impl BufRead) -> Result<()> {
    let text = prompt(input, "Enter your memory: ")?;
    let unlock = prompt(input, "Enter unlock date (YYYY-MM-DD): ")?;
    service.add_memory(&text, &unlock)?;
    println!("Memory saved.");
    Ok(())
}

fn reveal_interactive(service: &MemoryService, input: &mut impl BufRead) -> Result<()> {
    if !print_listing(service)? {
        return Ok(());
    }
    let Some(index) = prompt_index(input, "Enter the memory number to view: ")? else {
        return Ok(());
    };
    let text = service.reveal_memory(index)?;
    println!();
    println!("Memory {index}: {text}");
    Ok(())
}

fn delete_interactive(service: &MemoryService, input: &mut impl BufRead) -> Result<()> {
    if !print_listing(service)? {
        return Ok(());
    }
    let Some(index) = prompt_index(input, "Enter the memory number to delete: ")? else {
        return Ok(());
    };
    if confirm(input, &format!("Delete memory {index}? (y/n): "))? {
        let removed = service.delete_memory(index)?;
        println!("Deleted memory from {}.", removed.unlock_date);
    } else {
        println!("Deletion cancelled.");
    }
    Ok(())
}

fn delete_all_interactive(service: &MemoryService, input: &mut impl BufRead) -> Result<()> {
    if confirm(input, "Delete ALL memories? (y/n): ")? {
        service.delete_all()?;
        println!("All memories deleted.");
    } else {
        println!("Deletion cancelled.");
    }
    Ok(())
}

/// Print the listing; returns false when there is nothing to show.
fn print_listing(service: &MemoryService) -> Result<bool> {
    let memories = service.list_memories()?;
    if memories.is_empty() {
        println!("No memories saved yet.");
        return Ok(false);
    }
    println!("===== Your Memories =====");
    for m in &memories {
        let status = if m.unlocked {
            "unlocked".to_string()
        } else {
            format!("locked until {}", m.unlock_date)
        };
        println!("{}. Memory ({status})", m.index);
    }
    Ok(true)
}

fn prompt(input: &mut impl BufRead, label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(anyhow!("stdin closed"));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn prompt_index(input: &mut impl BufRead, label: &str) -> Result<Option<usize>> {
    let choice = prompt(input, label)?;
    match choice.trim().parse() {
        Ok(index) => Ok(Some(index)),
        Err(_) => {
            println!("Please enter a valid number.");
            Ok(None)
        }
    }
}

fn confirm(input: &mut impl BufRead, label: &str) -> Result<bool> {
    let answer = prompt(input, label)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
