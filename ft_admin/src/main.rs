//! Operator CLI for the Funtan economy engine.
//!
//! Runs one engine operation per invocation, or reads commands from stdin in
//! repl mode. Useful for migrations, support work and local play-testing on
//! the in-memory store.

mod commands;
mod config;
mod logging;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Error, anyhow};
use commands::{Command, Dispatcher};
use config::{AdminConfig, Backend, Overrides};
use funtan::{Database, GameEngine, GameStore, MemoryGameStore};
use pico_args::Arguments;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Operate the Funtan economy engine

USAGE:
  ft_admin [OPTIONS] <COMMAND> [ARGS]

OPTIONS:
  --db-url     URL         Database connection string  [default: env DATABASE_URL]
  --catalog    PATH        JSON catalog file           [default: env CATALOG_PATH or built-in]
  --scope      ID          Chat server whose admins may run privileged commands
  --actor      ID          Acting admin for `admins add|remove`

FLAGS:
  --memory                 Use a throwaway in-memory store
  --json                   Print results as JSON
  -h, --help               Print help information

COMMANDS:
  migrate                                    Apply the database schema
  catalog                                    List monsters by tier
  balance <player>                           Show balances
  daily <player>                             Claim the daily reward
  work <player>                              Start a work session
  collect <player>                           Collect a finished work session
  cancel-work <player>                       Cancel the running work session
  work-status <player>                       Show the latest work session
  hunt <player> [monster]                    Hunt a monster (best tier when omitted)
  equip <player> <inventory-id> weapon|gear  Equip an inventory item
  inventory <player> [weapon|gear]           List inventory
  records <player>                           Show kills per tier
  prestige <player>                          Raise prestige by one
  adjust <actor> <target> <currency> <amount>         Adjust a balance (admin)
  grant <actor> <target> weapon|gear <id> [qty]       Grant items (admin)
  remove <actor> <inventory-id> <qty>                 Remove items from a stack (admin)
  admins add|remove|list <scope> [player] [role]      Manage server admins
  grant-starters                             Give starter items to players without them
  seed-demo [player]                         Seed a demo player
  repl                                       Read `<player> <command> args...` lines from stdin

ENVIRONMENT:
  DATABASE_URL             PostgreSQL connection string
  ADMIN_IDS                Comma separated numeric ids allowed to run admin commands
  CATALOG_PATH             JSON catalog file
  RUST_LOG                 Log filter (default: info,sqlx=warn)
  (Game rules such as DAILY_BASE_BRONZE or HUNT_POLICY are read from the environment too)
";

struct Args {
    overrides: Overrides,
    json: bool,
    scope: Option<String>,
    actor: Option<String>,
    command: Vec<String>,
}

fn parse_args() -> Result<Args, Error> {
    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = Overrides {
        database_url: pargs.opt_value_from_str("--db-url")?,
        memory: pargs.contains("--memory"),
        catalog_path: pargs.opt_value_from_str::<_, PathBuf>("--catalog")?,
    };
    let json = pargs.contains("--json");
    let scope = pargs.opt_value_from_str("--scope")?;
    let actor = pargs.opt_value_from_str("--actor")?;

    let command = pargs
        .finish()
        .into_iter()
        .map(|arg| {
            arg.into_string()
                .map_err(|raw| anyhow!("Argument is not valid UTF-8: {raw:?}"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Args {
        overrides,
        json,
        scope,
        actor,
        command,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let args = parse_args()?;
    if args.command.is_empty() {
        eprint!("{HELP}");
        std::process::exit(2);
    }
    let command = Command::parse(&args.command)?;

    logging::init();

    let config = AdminConfig::from_env(args.overrides)?;
    let catalog = Arc::new(config.load_catalog()?);

    let (store, database): (Arc<dyn GameStore>, Option<Database>) = match &config.backend {
        Backend::Memory => {
            tracing::info!("Using the in-memory store; nothing will be persisted");
            let store: Arc<dyn GameStore> = Arc::new(MemoryGameStore::new());
            (store, None)
        }
        Backend::Postgres(db_config) => {
            let db = Database::new(db_config)
                .await
                .map_err(|e| anyhow!("Failed to connect to database: {e}"))?;
            tracing::info!("Database connected successfully");
            let store: Arc<dyn GameStore> = Arc::new(db.store());
            (store, Some(db))
        }
    };

    let engine = GameEngine::new(store, catalog, config.game.clone());
    let dispatcher = Dispatcher::new(engine, config, database.clone(), args.scope);

    let succeeded = match command {
        Command::Repl => {
            run_repl(&dispatcher, args.json).await?;
            true
        }
        command => {
            let reply = dispatcher.dispatch(&command, args.actor.as_deref()).await;
            println!("{}", reply.render(args.json));
            !reply.is_failure()
        }
    };

    if let Some(db) = database {
        db.close().await;
    }

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}

/// Read `<player> <command> args...` lines until EOF
async fn run_repl(dispatcher: &Dispatcher, json: bool) -> Result<(), Error> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if matches!(line, "quit" | "exit") {
            break;
        }

        match Command::parse_line(line) {
            Ok((actor, command)) => {
                let reply = dispatcher.dispatch(&command, Some(&actor)).await;
                println!("{}", reply.render(json));
            }
            Err(e) => eprintln!("{e}"),
        }
    }

    Ok(())
}
