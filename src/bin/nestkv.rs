//! NestKV REPL Binary
//!
//! Line-oriented shell over an embedded NestKV engine.

use std::io::{self, BufRead, Write};
use std::process;

use clap::Parser;
use nestkv::{Config, Engine, NestError, RecoveryPolicy, SyncStrategy};
use tracing_subscriber::{fmt, EnvFilter};

/// NestKV shell
#[derive(Parser, Debug)]
#[command(name = "nestkv")]
#[command(about = "Embedded key-value store with nested transactions")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./nestkv_data")]
    data_dir: String,

    /// Replay a leftover command log without asking
    #[arg(long, conflicts_with = "discard")]
    replay: bool,

    /// Discard a leftover command log without asking
    #[arg(long)]
    discard: bool,

    /// Flush writes to the OS without fsync (faster, not crash safe)
    #[arg(long)]
    no_sync: bool,
}

const PROMPT: &str = ">> ";

/// Whether the REPL keeps reading after a line
enum Control {
    Continue,
    End,
}

fn main() {
    // Logs go to stderr so command output on stdout stays clean
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,nestkv=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let recovery_policy = if args.replay {
        RecoveryPolicy::Replay
    } else if args.discard {
        RecoveryPolicy::Discard
    } else {
        RecoveryPolicy::Ask
    };
    let sync_strategy = if args.no_sync {
        SyncStrategy::OsBuffered
    } else {
        SyncStrategy::EveryWrite
    };

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .sync_strategy(sync_strategy)
        .recovery_policy(recovery_policy)
        .build();

    tracing::info!("NestKV v{}", nestkv::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);

    let mut engine = match Engine::open(config) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            process::exit(1);
        }
    };

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    if engine.pending_recovery().is_some() {
        if let Err(e) = resolve_recovery(&mut engine, &mut lines) {
            tracing::error!("Recovery failed: {}", e);
            process::exit(1);
        }
    }

    print_prompt(&engine);
    for line in lines {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("Failed to read input: {}", e);
                break;
            }
        };
        if let Control::End = handle_line(&mut engine, line.trim()) {
            break;
        }
        print_prompt(&engine);
    }

    shutdown(engine);
}

/// Ask the operator whether to replay or discard the leftover command log
fn resolve_recovery<I>(engine: &mut Engine, lines: &mut I) -> nestkv::Result<()>
where
    I: Iterator<Item = io::Result<String>>,
{
    loop {
        println!("The database was shutdown improperly with transactions pending.");
        println!("Do you wish to restore pending transactions? (y/n):");

        let answer = match lines.next() {
            Some(answer) => answer?,
            // No operator on the other end: leave the log for next time
            None => process::exit(1),
        };

        match answer.trim().to_ascii_uppercase().chars().next() {
            Some('Y') => {
                println!("Replaying pending transactions....");
                if let Some(pending) = engine.pending_recovery() {
                    echo_replay(&pending.commands);
                }
                let result = engine.replay_pending()?;
                if result.commands_rejected > 0 {
                    println!("{} command(s) could not be replayed", result.commands_rejected);
                }
                return Ok(());
            }
            Some('N') => return engine.discard_pending(),
            _ => println!("Please enter `y` for yes, `n` for no."),
        }
    }
}

/// Echo replayed commands the way they were typed, prompt indentation included
fn echo_replay(commands: &[String]) {
    let mut depth = 0usize;
    for command in commands {
        println!("{}{}{}", PROMPT, "   ".repeat(depth), command);
        match command.as_str() {
            "BEGIN" => depth += 1,
            "COMMIT ALL" => depth = 0,
            "COMMIT" | "ROLLBACK" => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
}

fn handle_line(engine: &mut Engine, line: &str) -> Control {
    let mut tokens = line.split_whitespace();
    let verb = match tokens.next() {
        Some(verb) => verb.to_ascii_uppercase(),
        None => return Control::Continue,
    };

    match verb.as_str() {
        "DISPLAY" => match tokens.next() {
            None => display_entries(engine),
            Some(flag) if flag.to_ascii_uppercase().starts_with('P') => display_pending(engine),
            Some(_) => println!("Improper syntax: Usage: `DISPLAY [PENDING]`"),
        },
        "END" => return Control::End,
        "CRASH" => {
            // Simulated crash: no flush, no cleanup
            process::exit(0);
        }
        _ => match engine.execute_line(line) {
            Ok(response) => {
                if !response.is_silent() {
                    println!("{}", response);
                }
            }
            Err(e) if e.is_rejection() => println!("{}", e),
            Err(e) => report_failure(&e),
        },
    }
    Control::Continue
}

fn display_entries(engine: &Engine) {
    let entries = engine.entries();
    if entries.is_empty() {
        println!("\nDatabase is empty.\n");
        return;
    }

    println!("\nCurrent Entries in Database");
    println!("===========================");
    for (key, value) in entries {
        println!("{} {}", key, value);
    }
    println!();
}

fn display_pending(engine: &Engine) {
    let scopes = engine.scopes();
    if scopes.is_empty() {
        println!("\nNo Pending Transactions\n");
        return;
    }

    println!("\nPending Transaction List\n========================");
    for (depth, scope) in scopes.iter().enumerate() {
        println!("{}BEGIN", "    ".repeat(depth));
        for entry in scope.entries() {
            println!("{}{}", "    ".repeat(depth + 1), entry.command());
        }
    }
    println!();
}

fn report_failure(e: &NestError) {
    tracing::error!("Command failed: {}", e);
    println!("ERROR: {}", e);
}

fn print_prompt(engine: &Engine) {
    print!("{}{}", PROMPT, "   ".repeat(engine.depth()));
    let _ = io::stdout().flush();
}

/// Graceful shutdown: sync the record log and release the engine
fn shutdown(engine: Engine) {
    match engine.close() {
        Ok(()) => tracing::info!("Engine closed"),
        Err(e) => {
            tracing::error!("Failed to close engine: {}", e);
            process::exit(1);
        }
    }
}
