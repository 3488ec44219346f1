//! zkcli - command-line entry point.

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use log::error;

use zkcli::cli::commands::CommandHistory;
use zkcli::client::{MemoryConnector, Session};
use zkcli::{Shell, ShellConfig, Streams};

#[derive(Parser, Debug)]
#[command(name = "zkcli", version, about = "Interactive coordination service shell")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Connection string, host:port[,host:port...]
    #[arg(long)]
    server: Option<String>,

    /// Run a single command and exit
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn main() {
    let args = Args::parse();

    let config = match ShellConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("zkcli: {}", e);
            exit(1);
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .format_timestamp(None)
        .init();

    if let Err(e) = try_main(args, config) {
        error!("{:#}", e);
        exit(1);
    }
}

fn try_main(args: Args, mut config: ShellConfig) -> anyhow::Result<()> {
    if let Some(server) = args.server {
        config.server = server;
    }

    let mut session = Session::new(Box::new(MemoryConnector::new()), config.server.clone());
    session.reconnect()?;
    let session = session.into_shared();
    let history = CommandHistory::new(config.history_size).into_shared();
    let mut shell = Shell::with_default_commands(session, history, Streams::stdio());

    if !args.command.is_empty() {
        let line = args
            .command
            .iter()
            .map(|word| {
                if word.contains(char::is_whitespace) {
                    format!("\"{}\"", word)
                } else {
                    word.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        shell.process_line(&line);
        shell.session().borrow_mut().close()?;
        return Ok(());
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        println!("Connecting to {}", config.server);
        println!("Type 'help' to see available commands.");
    }
    shell.run(stdin.lock())?;
    Ok(())
}
