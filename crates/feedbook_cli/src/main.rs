//! Line-oriented FeedBook front end.
//!
//! # Responsibility
//! - Wire config, logging, storage and network into one command service.
//! - Read commands from stdin and print feedback and the displayed list.
//!
//! # Invariants
//! - The CLI never mutates books directly; every change goes through
//!   `CommandService::execute`.

use anyhow::{Context, Result};
use clap::Parser;
use feedbook_core::config::default_config_path;
use feedbook_core::{
    command_defs, init_logging, open_db, CommandResult, CommandService, Config, EntryBookStorage,
    HttpArticleFetcher, ModelContext, Network, SqliteEntryBookRepository,
};
use log::info;
use std::io::{BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "feedbook")]
#[command(about = "Keep a reading list of feed articles from the terminal", long_about = None)]
struct Cli {
    /// Config file (defaults to $FEEDBOOK_HOME/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start with article fetching disabled
    #[arg(long)]
    offline: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = Config::load(&config_path)
        .with_context(|| format!("load config {}", config_path.display()))?;

    let log_dir = config.log_dir();
    if let Err(err) = init_logging(config.log_level(), &log_dir.to_string_lossy()) {
        eprintln!("warning: logging disabled: {err}");
    }

    let database_path = config.database_path();
    if let Some(parent) = database_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create data directory {}", parent.display()))?;
    }
    let conn = open_db(&database_path)
        .with_context(|| format!("open database {}", database_path.display()))?;
    let fetcher = HttpArticleFetcher::new(config.fetch_timeout(), &config.user_agent())
        .context("build http client")?;
    let network = Network::with_offline(fetcher, config.offline || cli.offline);
    let service = CommandService::open(SqliteEntryBookRepository::new(conn), network)
        .context("load entries")?;

    info!("event=cli_start module=cli status=ok");
    let stdin = std::io::stdin();
    run(service, stdin.lock(), std::io::stdout().lock())
}

fn run<S, R, W>(mut service: CommandService<S>, input: R, mut out: W) -> Result<()>
where
    S: EntryBookStorage,
    R: BufRead,
    W: Write,
{
    print_entries(&service, &mut out)?;
    prompt(service.context(), &mut out)?;

    for line in input.lines() {
        let line = line.context("read command")?;
        if line.trim().is_empty() {
            prompt(service.context(), &mut out)?;
            continue;
        }

        match service.execute(&line) {
            Ok(result) => {
                print_result(&result, service.context(), &mut out)?;
                if result.exit {
                    break;
                }
            }
            Err(err) => writeln!(out, "{err}")?,
        }
        print_entries(&service, &mut out)?;
        prompt(service.context(), &mut out)?;
    }

    info!("event=cli_exit module=cli status=ok");
    Ok(())
}

fn print_result(result: &CommandResult, context: ModelContext, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}", result.feedback)?;
    if result.show_help {
        for def in command_defs(context) {
            let aliases = if def.aliases.is_empty() {
                String::new()
            } else {
                format!(" ({})", def.aliases.join(", "))
            };
            writeln!(out, "  {}{aliases}: {}", def.name, def.summary)?;
        }
    }
    Ok(())
}

fn print_entries<S: EntryBookStorage>(
    service: &CommandService<S>,
    out: &mut impl Write,
) -> Result<()> {
    let entries = service.store().filtered_entries();
    if entries.is_empty() {
        writeln!(out, "(no entries)")?;
    }
    for (position, entry) in entries.iter().enumerate() {
        let marker = if entry.read { ' ' } else { '*' };
        writeln!(out, "{marker}{}. {entry}", position + 1)?;
    }
    Ok(())
}

fn prompt(context: ModelContext, out: &mut impl Write) -> Result<()> {
    write!(out, "feedbook [{context}]> ")?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::run;
    use feedbook_core::{open_db_in_memory, CommandService, Network, SqliteEntryBookRepository};

    fn run_script(script: &str) -> String {
        let repo = SqliteEntryBookRepository::new(open_db_in_memory().unwrap());
        let network = Network::with_offline(|_: &str| -> Option<Vec<u8>> { None }, true);
        let service = CommandService::open(repo, network).unwrap();
        let mut out = Vec::new();
        run(service, script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn prints_feedback_and_numbered_list() {
        let output = run_script("subscribe t/Rust l/https://blog.rust-lang.org/\n");
        assert!(output.contains("New entry subscribed: Rust"));
        assert!(output.contains("*1. Rust Link: https://blog.rust-lang.org/"));
        assert!(output.contains("feedbook [list]> "));
    }

    #[test]
    fn errors_are_printed_and_exit_stops_the_loop() {
        let output = run_script("unarchive 1\nhelp\nexit\nlist\n");
        assert!(output.contains("Unknown command in context `list`"));
        assert!(output.contains("  subscribe (sub): Subscribe to a feed"));
        assert!(output.contains("Exiting FeedBook as requested ..."));
        assert!(!output.contains("Listed all entries"));
    }
}
