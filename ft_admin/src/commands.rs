//! Command parsing, authorization and rendering.
//!
//! Every command maps to exactly one engine call. The engine result is turned
//! into an [`Outcome`] and rendered either as human text or as JSON.

use crate::{config::AdminConfig, logging};
use funtan::{
    CurrencyDeltas, Database, GameEngine, GameError, GameResult, ItemKind, Outcome, ReasonCode,
    format_duration,
    game::models::{HuntOutcome, InventoryItem, WorkStatus},
};
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use thiserror::Error;

/// Command line errors that never reach the engine
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("Invalid {what}: {value}")]
    InvalidArgument { what: &'static str, value: String },

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Unexpected argument: {0}")]
    UnexpectedArgument(String),

    #[error("The repl cannot be started from inside the repl")]
    NestedRepl,
}

/// Operator commands
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Migrate,
    Catalog,
    Balance { player: String },
    Daily { player: String },
    Work { player: String },
    Collect { player: String },
    CancelWork { player: String },
    WorkStatus { player: String },
    Hunt { player: String, monster: Option<String> },
    Equip { player: String, inventory_id: i64, slot: ItemKind },
    Inventory { player: String, kind: Option<ItemKind> },
    Records { player: String },
    Prestige { player: String },
    Adjust { actor: String, target: String, currency: String, amount: f64 },
    Grant { actor: String, target: String, kind: ItemKind, catalog_id: String, quantity: i64 },
    Remove { actor: String, inventory_id: i64, quantity: i64 },
    AdminsAdd { scope: String, player: String, role: Option<String> },
    AdminsRemove { scope: String, player: String },
    AdminsList { scope: String },
    GrantStarters,
    SeedDemo { player: Option<String> },
    Repl,
}

struct Args<'a> {
    items: &'a [String],
    pos: usize,
}

impl<'a> Args<'a> {
    fn new(items: &'a [String]) -> Self {
        Self { items, pos: 0 }
    }

    fn next(&mut self) -> Option<&'a str> {
        let item = self.items.get(self.pos)?;
        self.pos += 1;
        Some(item.as_str())
    }

    fn required(&mut self, name: &'static str) -> Result<String, CommandError> {
        self.next()
            .map(str::to_string)
            .ok_or(CommandError::MissingArgument(name))
    }

    fn optional(&mut self) -> Option<String> {
        self.next().map(str::to_string)
    }

    fn parsed<T: std::str::FromStr>(&mut self, name: &'static str) -> Result<T, CommandError> {
        let raw = self.next().ok_or(CommandError::MissingArgument(name))?;
        raw.parse().map_err(|_| CommandError::InvalidArgument {
            what: name,
            value: raw.to_string(),
        })
    }

    fn finish(&self) -> Result<(), CommandError> {
        match self.items.get(self.pos) {
            Some(extra) => Err(CommandError::UnexpectedArgument(extra.clone())),
            None => Ok(()),
        }
    }
}

impl Command {
    /// Parse a command and its positional arguments
    ///
    /// # Errors
    ///
    /// * `CommandError` - Unknown command, missing or malformed argument
    pub fn parse(items: &[String]) -> Result<Self, CommandError> {
        let mut args = Args::new(items);
        let name = args.required("command")?;

        let command = match name.as_str() {
            "migrate" => Command::Migrate,
            "catalog" => Command::Catalog,
            "balance" => Command::Balance {
                player: args.required("player")?,
            },
            "daily" => Command::Daily {
                player: args.required("player")?,
            },
            "work" => Command::Work {
                player: args.required("player")?,
            },
            "collect" => Command::Collect {
                player: args.required("player")?,
            },
            "cancel-work" => Command::CancelWork {
                player: args.required("player")?,
            },
            "work-status" => Command::WorkStatus {
                player: args.required("player")?,
            },
            "hunt" => Command::Hunt {
                player: args.required("player")?,
                monster: args.optional(),
            },
            "equip" => Command::Equip {
                player: args.required("player")?,
                inventory_id: args.parsed("inventory id")?,
                slot: args.parsed("slot")?,
            },
            "inventory" => {
                let player = args.required("player")?;
                let kind = match args.next() {
                    Some(raw) => Some(raw.parse().map_err(|_| CommandError::InvalidArgument {
                        what: "item kind",
                        value: raw.to_string(),
                    })?),
                    None => None,
                };
                Command::Inventory { player, kind }
            }
            "records" => Command::Records {
                player: args.required("player")?,
            },
            "prestige" => Command::Prestige {
                player: args.required("player")?,
            },
            "adjust" => Command::Adjust {
                actor: args.required("actor")?,
                target: args.required("target")?,
                currency: args.required("currency")?,
                amount: args.parsed("amount")?,
            },
            "grant" => {
                let actor = args.required("actor")?;
                let target = args.required("target")?;
                let kind = args.parsed("item kind")?;
                let catalog_id = args.required("catalog id")?;
                let quantity = match args.next() {
                    Some(raw) => raw.parse().map_err(|_| CommandError::InvalidArgument {
                        what: "quantity",
                        value: raw.to_string(),
                    })?,
                    None => 1,
                };
                Command::Grant {
                    actor,
                    target,
                    kind,
                    catalog_id,
                    quantity,
                }
            }
            "remove" => Command::Remove {
                actor: args.required("actor")?,
                inventory_id: args.parsed("inventory id")?,
                quantity: args.parsed("quantity")?,
            },
            "admins" => {
                let action = args.required("admins action")?;
                let scope = args.required("scope")?;
                match action.as_str() {
                    "add" => Command::AdminsAdd {
                        scope,
                        player: args.required("player")?,
                        role: args.optional(),
                    },
                    "remove" => Command::AdminsRemove {
                        scope,
                        player: args.required("player")?,
                    },
                    "list" => Command::AdminsList { scope },
                    other => {
                        return Err(CommandError::InvalidArgument {
                            what: "admins action",
                            value: other.to_string(),
                        });
                    }
                }
            }
            "grant-starters" => Command::GrantStarters,
            "seed-demo" => Command::SeedDemo {
                player: args.optional(),
            },
            "repl" => Command::Repl,
            other => return Err(CommandError::UnknownCommand(other.to_string())),
        };

        args.finish()?;
        Ok(command)
    }

    /// Parse one repl line: `<player> <command> args...`
    ///
    /// The leading player fills the command's player (or actor) argument and
    /// acts as the actor for privileged commands.
    ///
    /// # Returns
    ///
    /// * `(String, Command)` - Actor and parsed command
    pub fn parse_line(line: &str) -> Result<(String, Self), CommandError> {
        let mut tokens = line.split_whitespace().map(str::to_string);
        let player = tokens.next().ok_or(CommandError::MissingArgument("player"))?;
        let name = tokens.next().ok_or(CommandError::MissingArgument("command"))?;
        let rest: Vec<String> = tokens.collect();

        let mut items = vec![name.clone()];
        match name.as_str() {
            "migrate" | "catalog" | "grant-starters" | "admins" => {}
            "repl" => return Err(CommandError::NestedRepl),
            _ => items.push(player.clone()),
        }
        items.extend(rest);

        Ok((player, Self::parse(&items)?))
    }

    /// Name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::Migrate => "migrate",
            Command::Catalog => "catalog",
            Command::Balance { .. } => "balance",
            Command::Daily { .. } => "daily",
            Command::Work { .. } => "work",
            Command::Collect { .. } => "collect",
            Command::CancelWork { .. } => "cancel-work",
            Command::WorkStatus { .. } => "work-status",
            Command::Hunt { .. } => "hunt",
            Command::Equip { .. } => "equip",
            Command::Inventory { .. } => "inventory",
            Command::Records { .. } => "records",
            Command::Prestige { .. } => "prestige",
            Command::Adjust { .. } => "adjust",
            Command::Grant { .. } => "grant",
            Command::Remove { .. } => "remove",
            Command::AdminsAdd { .. } => "admins add",
            Command::AdminsRemove { .. } => "admins remove",
            Command::AdminsList { .. } => "admins list",
            Command::GrantStarters => "grant-starters",
            Command::SeedDemo { .. } => "seed-demo",
            Command::Repl => "repl",
        }
    }

    /// Player the command acts on
    pub fn player(&self) -> Option<&str> {
        match self {
            Command::Balance { player }
            | Command::Daily { player }
            | Command::Work { player }
            | Command::Collect { player }
            | Command::CancelWork { player }
            | Command::WorkStatus { player }
            | Command::Hunt { player, .. }
            | Command::Equip { player, .. }
            | Command::Inventory { player, .. }
            | Command::Records { player }
            | Command::Prestige { player }
            | Command::AdminsAdd { player, .. }
            | Command::AdminsRemove { player, .. } => Some(player),
            Command::Adjust { target, .. } | Command::Grant { target, .. } => Some(target),
            Command::SeedDemo { player } => player.as_deref(),
            _ => None,
        }
    }

    /// Actor that must be authorized before the command runs
    fn privileged_actor<'a>(&'a self, fallback: Option<&'a str>) -> Option<Option<&'a str>> {
        match self {
            Command::Adjust { actor, .. }
            | Command::Grant { actor, .. }
            | Command::Remove { actor, .. } => Some(Some(actor.as_str())),
            Command::AdminsAdd { .. } | Command::AdminsRemove { .. } => Some(fallback),
            _ => None,
        }
    }
}

/// Rendered result of one command
#[derive(Debug, Clone)]
pub struct Reply {
    pub outcome: Outcome<Value>,
    pub text: String,
}

impl Reply {
    fn from_result<T: Serialize>(result: GameResult<T>, describe: impl FnOnce(&T) -> String) -> Self {
        match result {
            Ok(data) => {
                let text = describe(&data);
                match serde_json::to_value(&data) {
                    Ok(value) => Reply {
                        outcome: Outcome::ok(value),
                        text,
                    },
                    Err(e) => Self::failure(GameError::Store(format!("Serialization failed: {e}"))),
                }
            }
            Err(err) => Self::failure(err),
        }
    }

    fn failure(err: GameError) -> Self {
        let outcome = Outcome::from(Err::<Value, _>(err));
        let text = outcome.error.clone().unwrap_or_default();
        Reply { outcome, text }
    }

    fn denied(message: &str) -> Self {
        Reply {
            outcome: Outcome {
                success: false,
                data: None,
                error: Some(message.to_string()),
                reason: Some(ReasonCode::Forbidden),
                retry_after_secs: None,
            },
            text: message.to_string(),
        }
    }

    pub fn success(&self) -> bool {
        self.outcome.success
    }

    /// Failed for a reason other than "not yet"
    pub fn is_failure(&self) -> bool {
        !self.success() && !self.outcome.is_informational()
    }

    pub fn render(&self, json: bool) -> String {
        if json {
            serde_json::to_string_pretty(&self.outcome).unwrap_or_else(|e| {
                format!("{{\"success\":false,\"error\":\"Serialization failed: {e}\"}}")
            })
        } else {
            self.text.clone()
        }
    }
}

/// Runs commands against one engine
pub struct Dispatcher {
    engine: GameEngine,
    config: AdminConfig,
    database: Option<Database>,
    scope: Option<String>,
}

impl Dispatcher {
    /// # Arguments
    ///
    /// * `engine` - Engine over the selected store
    /// * `config` - CLI configuration (global admin ids)
    /// * `database` - Pool for `migrate`, `None` on the in-memory store
    /// * `scope` - Chat server whose admins may run privileged commands
    pub fn new(
        engine: GameEngine,
        config: AdminConfig,
        database: Option<Database>,
        scope: Option<String>,
    ) -> Self {
        Self {
            engine,
            config,
            database,
            scope,
        }
    }

    /// Authorize, execute and log one command
    ///
    /// # Arguments
    ///
    /// * `command` - Parsed command (never `Repl`)
    /// * `actor` - Acting player for `admins add|remove`
    pub async fn dispatch(&self, command: &Command, actor: Option<&str>) -> Reply {
        let started = Instant::now();

        let reply = match command.privileged_actor(actor) {
            Some(actor) => match self.authorize(actor).await {
                Ok(()) => self.execute(command).await,
                Err(denied) => denied,
            },
            None => self.execute(command).await,
        };

        logging::log_operation(
            command.name(),
            command.player(),
            reply.outcome.reason,
            started.elapsed(),
        );
        reply
    }

    /// Global admins always pass; otherwise the actor must be a server
    /// admin of the configured scope.
    async fn authorize(&self, actor: Option<&str>) -> Result<(), Reply> {
        let Some(actor) = actor.map(str::trim).filter(|a| !a.is_empty()) else {
            return Err(Reply::denied("This command needs an acting admin (--actor)."));
        };

        if self.config.is_global_admin(actor) {
            return Ok(());
        }

        if let Some(scope) = &self.scope {
            match self.engine.is_server_admin(scope, actor).await {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(err) => return Err(Reply::failure(err)),
            }
        }

        tracing::warn!(actor = actor, scope = self.scope.as_deref(), "Unauthorized command");
        Err(Reply::denied("You are not allowed to run this command."))
    }

    async fn execute(&self, command: &Command) -> Reply {
        let engine = &self.engine;

        match command {
            Command::Migrate => self.migrate().await,
            Command::Catalog => {
                let buckets = engine.catalog().tier_index().buckets().to_vec();
                Reply::from_result(Ok::<_, GameError>(buckets), |buckets| {
                    buckets
                        .iter()
                        .flat_map(|bucket| {
                            std::iter::once(format!(
                                "Tier {} (from power {})",
                                bucket.tier, bucket.min_threshold
                            ))
                            .chain(bucket.monsters.iter().map(|m| {
                                format!(
                                    "  {} {} (threshold {}, {} gems)",
                                    m.id, m.name, m.threshold, m.gems
                                )
                            }))
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                })
            }
            Command::Balance { player } => {
                Reply::from_result(engine.get_balance(player).await, |b| {
                    format!(
                        "{player}: {} bronze, {} silver, {} gold, {} gems",
                        b.bronze, b.silver, b.gold, b.gems
                    )
                })
            }
            Command::Daily { player } => {
                Reply::from_result(engine.claim_daily(player).await, |r| {
                    format!(
                        "Claimed {} bronze (streak {}). Bronze: {}",
                        r.bronze, r.streak, r.new_bronze
                    )
                })
            }
            Command::Work { player } => Reply::from_result(engine.start_work(player).await, |s| {
                format!(
                    "Started work session {}. It finishes at {}.",
                    s.id,
                    s.finish_at.format("%Y-%m-%d %H:%M UTC")
                )
            }),
            Command::Collect { player } => {
                Reply::from_result(engine.collect_work(player).await, |p| {
                    format!(
                        "Collected {} silver ({} + {} streak bonus, streak {}). Silver: {}",
                        p.total_reward, p.base_reward, p.bonus, p.streak, p.new_silver
                    )
                })
            }
            Command::CancelWork { player } => {
                Reply::from_result(engine.cancel_work(player).await, |s| {
                    format!("Cancelled work session {}.", s.id)
                })
            }
            Command::WorkStatus { player } => {
                Reply::from_result(engine.work_status(player).await, |r| match &r.session {
                    None => "No work session yet.".to_string(),
                    Some(s) if s.status == WorkStatus::Working && r.remaining_secs > 0 => format!(
                        "Working (session {}), done in {}.",
                        s.id,
                        format_duration(r.remaining_secs)
                    ),
                    Some(s) if s.status == WorkStatus::Collected && r.cooldown_secs > 0 => {
                        format!(
                            "Session {} collected. Next shift in {}.",
                            s.id,
                            format_duration(r.cooldown_secs)
                        )
                    }
                    Some(s) => format!("Session {} is {}.", s.id, s.status),
                })
            }
            Command::Hunt { player, monster } => {
                Reply::from_result(engine.hunt(player, monster.as_deref()).await, |r| {
                    match r.outcome {
                        HuntOutcome::Victory => format!(
                            "Defeated {} ({}, tier {}) with power {}: +{} gems ({} total). Tier kills: {}",
                            r.monster.name,
                            r.monster.id,
                            r.monster.tier,
                            r.power,
                            r.gems_awarded,
                            r.new_gem_balance,
                            r.kills_in_tier
                        ),
                        HuntOutcome::Defeat => format!(
                            "Lost to {} ({}, tier {}) with power {}. Consolation: {} bronze",
                            r.monster.name,
                            r.monster.id,
                            r.monster.tier,
                            r.power,
                            r.consolation_bronze
                        ),
                    }
                })
            }
            Command::Equip {
                player,
                inventory_id,
                slot,
            } => Reply::from_result(engine.equip(player, *inventory_id, *slot).await, |r| {
                format!("Equipped {} as {}. Power: {}", r.item.name, r.slot, r.power)
            }),
            Command::Inventory { player, kind } => {
                Reply::from_result(engine.inventory(player, *kind).await, |items| {
                    if items.is_empty() {
                        "Inventory is empty.".to_string()
                    } else {
                        items.iter().map(describe_item).collect::<Vec<_>>().join("\n")
                    }
                })
            }
            Command::Records { player } => {
                Reply::from_result(engine.hunt_records(player).await, |records| {
                    if records.is_empty() {
                        "No hunts recorded.".to_string()
                    } else {
                        records
                            .iter()
                            .map(|r| format!("Tier {}: {} kills", r.tier, r.kills))
                            .collect::<Vec<_>>()
                            .join("\n")
                    }
                })
            }
            Command::Prestige { player } => {
                Reply::from_result(engine.add_prestige(player).await, |level| {
                    format!("{player} is now prestige {level}.")
                })
            }
            Command::Adjust {
                actor,
                target,
                currency,
                amount,
            } => {
                let result = match CurrencyDeltas::parse([(currency.as_str(), *amount)]) {
                    Ok(deltas) => engine.admin_adjust_currency(actor, target, &deltas).await,
                    Err(err) => Err(err),
                };
                Reply::from_result(result, |b| {
                    format!(
                        "{target}: {} bronze, {} silver, {} gold, {} gems",
                        b.bronze, b.silver, b.gold, b.gems
                    )
                })
            }
            Command::Grant {
                actor,
                target,
                kind,
                catalog_id,
                quantity,
            } => Reply::from_result(
                engine
                    .admin_grant_item(actor, target, *kind, catalog_id, *quantity)
                    .await,
                |item| format!("Granted to {target}: {}", describe_item(item)),
            ),
            Command::Remove {
                inventory_id,
                quantity,
                ..
            } => Reply::from_result(
                engine.remove_inventory_count(*inventory_id, *quantity).await,
                |r| match &r.remaining {
                    Some(item) => format!("Removed {}. Left: {}", r.removed, describe_item(item)),
                    None => format!("Removed {}. Stack #{} is gone.", r.removed, r.inventory_id),
                },
            ),
            Command::AdminsAdd {
                scope,
                player,
                role,
            } => Reply::from_result(
                engine.add_server_admin(scope, player, role.as_deref()).await,
                |a| format!("{} is now {} of {}.", a.player_id, a.role, a.scope_id),
            ),
            Command::AdminsRemove { scope, player } => {
                Reply::from_result(engine.remove_server_admin(scope, player).await, |removed| {
                    if *removed {
                        format!("{player} is no longer an admin of {scope}.")
                    } else {
                        format!("{player} was not an admin of {scope}.")
                    }
                })
            }
            Command::AdminsList { scope } => {
                Reply::from_result(engine.list_server_admins(scope).await, |admins| {
                    if admins.is_empty() {
                        format!("{scope} has no admins.")
                    } else {
                        admins
                            .iter()
                            .map(|a| format!("{} ({})", a.player_id, a.role))
                            .collect::<Vec<_>>()
                            .join("\n")
                    }
                })
            }
            Command::GrantStarters => {
                Reply::from_result(engine.grant_missing_starters().await, |grants| {
                    format!("Granted starter items to {} player(s).", grants.len())
                })
            }
            Command::SeedDemo { player } => {
                Reply::from_result(engine.seed_demo(player.as_deref()).await, |s| {
                    format!(
                        "Seeded {} with {} items: {} bronze, {} silver, {} gems",
                        s.player_id,
                        s.items.len(),
                        s.balance.bronze,
                        s.balance.silver,
                        s.balance.gems
                    )
                })
            }
            Command::Repl => Reply::failure(GameError::InvalidInput(
                CommandError::NestedRepl.to_string(),
            )),
        }
    }

    async fn migrate(&self) -> Reply {
        let result = match &self.database {
            Some(db) => db
                .migrate()
                .await
                .map(|()| "Schema is up to date.")
                .map_err(GameError::from),
            None => Ok("Nothing to migrate for the in-memory store."),
        };
        Reply::from_result(result, |message| message.to_string())
    }
}

fn describe_item(item: &InventoryItem) -> String {
    format!(
        "#{} {} {} {} (tier {}, {}) x{}",
        item.id, item.kind, item.catalog_id, item.name, item.tier, item.rarity, item.count
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Backend;
    use funtan::{Catalog, GameConfig, MemoryGameStore};
    use std::{collections::BTreeSet, sync::Arc};

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    fn dispatcher(admin_ids: &[&str], scope: Option<&str>) -> Dispatcher {
        let config = AdminConfig {
            backend: Backend::Memory,
            admin_ids: admin_ids.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            catalog_path: None,
            game: GameConfig::default(),
        };
        let engine = GameEngine::new(
            Arc::new(MemoryGameStore::new()),
            Arc::new(Catalog::standard()),
            config.game.clone(),
        );
        Dispatcher::new(engine, config, None, scope.map(str::to_string))
    }

    #[test]
    fn test_parse_player_commands() {
        assert_eq!(
            Command::parse(&args("daily 123")).unwrap(),
            Command::Daily {
                player: "123".to_string()
            }
        );
        assert_eq!(
            Command::parse(&args("hunt 123 m4")).unwrap(),
            Command::Hunt {
                player: "123".to_string(),
                monster: Some("m4".to_string())
            }
        );
        assert_eq!(
            Command::parse(&args("equip 123 7 gear")).unwrap(),
            Command::Equip {
                player: "123".to_string(),
                inventory_id: 7,
                slot: ItemKind::Gear
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Command::parse(&args("daily")),
            Err(CommandError::MissingArgument("player"))
        );
        assert!(matches!(
            Command::parse(&args("equip 1 x weapon")),
            Err(CommandError::InvalidArgument { what: "inventory id", .. })
        ));
        assert!(matches!(
            Command::parse(&args("equip 1 2 shield")),
            Err(CommandError::InvalidArgument { what: "slot", .. })
        ));
        assert!(matches!(
            Command::parse(&args("fish 1")),
            Err(CommandError::UnknownCommand(_))
        ));
        assert!(matches!(
            Command::parse(&args("balance 1 2")),
            Err(CommandError::UnexpectedArgument(_))
        ));
    }

    #[test]
    fn test_parse_grant_default_quantity() {
        match Command::parse(&args("grant 1 2 weapon w3")).unwrap() {
            Command::Grant { quantity, kind, .. } => {
                assert_eq!(quantity, 1);
                assert_eq!(kind, ItemKind::Weapon);
            }
            other => panic!("Expected Grant, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_repl_line() {
        let (actor, command) = Command::parse_line("555 collect").unwrap();
        assert_eq!(actor, "555");
        assert_eq!(
            command,
            Command::Collect {
                player: "555".to_string()
            }
        );

        let (actor, command) = Command::parse_line("555 adjust 777 gold 10").unwrap();
        assert_eq!(actor, "555");
        assert!(matches!(
            command,
            Command::Adjust { ref actor, ref target, .. } if actor == "555" && target == "777"
        ));

        let (_, command) = Command::parse_line("555 admins list guild").unwrap();
        assert_eq!(
            command,
            Command::AdminsList {
                scope: "guild".to_string()
            }
        );

        assert_eq!(Command::parse_line("555 repl"), Err(CommandError::NestedRepl));
        assert_eq!(
            Command::parse_line("555"),
            Err(CommandError::MissingArgument("command"))
        );
    }

    #[tokio::test]
    async fn test_dispatch_renders_text_and_json() {
        let d = dispatcher(&[], None);

        let reply = d.dispatch(&Command::parse(&args("daily 1")).unwrap(), None).await;
        assert!(reply.success());
        assert!(reply.render(false).contains("Claimed 50 bronze"));

        let reply = d.dispatch(&Command::parse(&args("daily 1")).unwrap(), None).await;
        assert!(!reply.success());
        assert!(!reply.is_failure());
        let json: Value = serde_json::from_str(&reply.render(true)).unwrap();
        assert_eq!(json["reason"], "Cooldown");
        assert_eq!(json["retry_after_secs"], 86_400);
    }

    #[tokio::test]
    async fn test_privileged_commands_need_authorization() {
        let d = dispatcher(&["100"], Some("guild"));
        let adjust = |actor: &str| Command::Adjust {
            actor: actor.to_string(),
            target: "5".to_string(),
            currency: "gold".to_string(),
            amount: 10.0,
        };

        let reply = d.dispatch(&adjust("200"), None).await;
        assert_eq!(reply.outcome.reason, Some(ReasonCode::Forbidden));

        let reply = d.dispatch(&adjust("100"), None).await;
        assert!(reply.success());

        // Global admin promotes 200 to server admin of the scope
        let promote = Command::parse(&args("admins add guild 200 mod")).unwrap();
        assert!(d.dispatch(&promote, None).await.is_failure());
        assert!(d.dispatch(&promote, Some("100")).await.success());

        let reply = d.dispatch(&adjust("200"), None).await;
        assert!(reply.success());
        assert_eq!(reply.outcome.data.unwrap()["gold"], 20);
    }

    #[tokio::test]
    async fn test_adjust_rejects_unknown_currency() {
        let d = dispatcher(&["100"], None);
        let reply = d
            .dispatch(&Command::parse(&args("adjust 100 5 platinum 3")).unwrap(), None)
            .await;
        assert_eq!(reply.outcome.reason, Some(ReasonCode::InvalidCurrencyType));
    }

    #[tokio::test]
    async fn test_migrate_on_memory_store() {
        let d = dispatcher(&[], None);
        let reply = d.dispatch(&Command::Migrate, None).await;
        assert!(reply.success());
        assert!(reply.text.contains("in-memory"));
    }

    #[tokio::test]
    async fn test_catalog_lists_tiers() {
        let d = dispatcher(&[], None);
        let reply = d.dispatch(&Command::Catalog, None).await;
        assert!(reply.text.starts_with("Tier 0"));
        assert!(reply.text.contains("m20 Mythic Seraph"));
    }
}
