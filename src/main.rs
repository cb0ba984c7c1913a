// ABOUTME: Entry point for the keywarden binary.
// ABOUTME: Parses CLI arguments, initializes tracing, and drives the inventory store.

use std::fs::File;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, bail};
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use keywarden_core::{
    KeyId, KeyRecord, Locale, RangePreset, UNCATEGORIZED, delivery_message, summarize,
};
use keywarden_io::{AwesomeApiQuotes, fetch_rate_in_background};
use keywarden_store::{
    ChannelFilter, DeliveryRequest, InventoryStore, KeyFilter, KeyUpdate, SnapshotError,
    StatusFilter, StoreError,
};

#[derive(Parser)]
#[command(name = "keywarden", version, about = "License key inventory with snapshot undo/redo")]
struct Cli {
    /// Path to the inventory database.
    #[arg(long, global = true, default_value = "keywarden.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add keys to a category.
    Add {
        #[arg(required = true)]
        keys: Vec<String>,
        #[arg(long, default_value = UNCATEGORIZED)]
        category: String,
        #[arg(long)]
        channel: Option<String>,
    },

    /// List keys, optionally filtered.
    List {
        /// Substring match over key, category, buyer, and channel.
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, conflicts_with = "no_channel")]
        channel: Option<String>,
        /// Only keys without a sales channel.
        #[arg(long)]
        no_channel: bool,
        #[arg(long, conflicts_with = "available")]
        sold: bool,
        #[arg(long)]
        available: bool,
    },

    /// Mark keys sold to a buyer and print the delivery message.
    Deliver {
        #[arg(required = true)]
        keys: Vec<String>,
        #[arg(long)]
        buyer: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        channel: Option<String>,
        #[arg(long)]
        price_brl: Option<f64>,
        #[arg(long)]
        price_usd: Option<f64>,
        #[arg(long, default_value = "en")]
        locale: Locale,
    },

    /// Undo the last mutation.
    Undo,

    /// Re-apply the mutation that was just undone.
    Redo,

    /// Edit one key in place.
    Edit {
        key: String,
        #[arg(long)]
        new_key: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        buyer: Option<String>,
        #[arg(long)]
        price_brl: Option<f64>,
        #[arg(long)]
        price_usd: Option<f64>,
        #[arg(long)]
        channel: Option<String>,
        /// Mark the key available again, clearing all sale fields.
        #[arg(long, conflicts_with_all = ["buyer", "price_brl", "price_usd"])]
        release: bool,
    },

    /// Delete keys.
    Delete {
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Rewrite the manual display order to the given sequence.
    Reorder {
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Manage categories.
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Manage sales channels.
    Channel {
        #[command(subcommand)]
        action: ChannelAction,
    },

    /// Sales report over a date range.
    Report {
        /// today, yesterday, last7, last30, this-month, or last-month.
        #[arg(long, default_value = "this-month", conflicts_with_all = ["from", "to"])]
        preset: String,
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
        /// USD to BRL rate; fetched from the quote service when omitted.
        #[arg(long)]
        rate: Option<f64>,
    },

    /// Export the inventory as CSV.
    Export {
        /// Output file; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Copy the database into a timestamped backup file.
    Backup {
        #[arg(long, default_value = "backups")]
        dir: PathBuf,
    },

    /// Print the delivery message for already-sold keys.
    Message {
        #[arg(required = true)]
        keys: Vec<String>,
        #[arg(long, default_value = "en")]
        locale: Locale,
    },
}

#[derive(Subcommand)]
enum CategoryAction {
    Add { name: String },
    Delete { name: String },
    List,
}

#[derive(Subcommand)]
enum ChannelAction {
    Add { name: String },
    Rename { old: String, new: String },
    Delete { name: String },
    List,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keywarden=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let mut store = InventoryStore::open(&cli.db)
        .with_context(|| format!("opening inventory database {}", cli.db.display()))?;
    tracing::debug!(db = %cli.db.display(), "inventory store opened");

    match cli.command {
        Command::Add {
            keys,
            category,
            channel,
        } => {
            let outcome = store.add_keys(&keys, &category, channel.as_deref())?;
            println!(
                "Added {} key(s) to {category}; {} duplicate(s) skipped.",
                outcome.added, outcome.duplicates
            );
        }

        Command::List {
            search,
            category,
            channel,
            no_channel,
            sold,
            available,
        } => {
            let filter = KeyFilter {
                search,
                category,
                channel: if no_channel {
                    Some(ChannelFilter::Unassigned)
                } else {
                    channel.map(ChannelFilter::Named)
                },
                status: if sold {
                    Some(StatusFilter::Sold)
                } else if available {
                    Some(StatusFilter::Available)
                } else {
                    None
                },
            };
            for record in store.view().filtered(&filter) {
                println!("{}", format_record(record));
            }
        }

        Command::Deliver {
            keys,
            buyer,
            email,
            channel,
            price_brl,
            price_usd,
            locale,
        } => {
            let ids = ids_for_keys(&store, &keys)?;
            let request = DeliveryRequest {
                ids,
                buyer,
                buyer_email: email,
                channel,
                price_brl,
                price_usd,
            };
            let delivered = store.deliver(&request, Utc::now())?;
            let categories = store.list_categories()?;
            println!("{}", delivery_message(&delivered, &categories, locale));
        }

        Command::Undo => match store.undo() {
            Ok(()) => println!("Undid the last operation."),
            Err(StoreError::Snapshot(SnapshotError::NothingToUndo)) => {
                println!("Nothing to undo.")
            }
            Err(err) => return Err(err.into()),
        },

        Command::Redo => match store.redo() {
            Ok(()) => println!("Redid the undone operation."),
            Err(StoreError::Snapshot(SnapshotError::NothingToRedo)) => {
                println!("Nothing to redo.")
            }
            Err(err) => return Err(err.into()),
        },

        Command::Edit {
            key,
            new_key,
            category,
            buyer,
            price_brl,
            price_usd,
            channel,
            release,
        } => {
            let current = store
                .view()
                .by_key(&key)
                .with_context(|| format!("unknown key: {key}"))?
                .clone();

            let sold = if release {
                false
            } else {
                current.sold || buyer.is_some()
            };
            let update = KeyUpdate {
                key: new_key.unwrap_or(current.key),
                category: category.unwrap_or(current.category),
                sold,
                buyer: buyer.or(current.buyer),
                sold_at: current.sold_at.or_else(|| sold.then(Utc::now)),
                price_brl: price_brl.or(current.price_brl),
                price_usd: price_usd.or(current.price_usd),
                channel: channel.or(current.channel),
            };
            let record = store.update_key(current.id, update)?;
            println!("{}", format_record(&record));
        }

        Command::Delete { keys } => {
            let ids = ids_for_keys(&store, &keys)?;
            let deleted = store.delete_keys(&ids)?;
            println!("Deleted {deleted} key(s).");
        }

        Command::Reorder { keys } => {
            let order: Vec<&str> = keys.iter().map(String::as_str).collect();
            store.reorder(&order)?;
            println!("Reordered {} key(s).", order.len());
        }

        Command::Category { action } => match action {
            CategoryAction::Add { name } => {
                let category = store.add_category(&name)?;
                println!("Added category {}.", category.name);
            }
            CategoryAction::Delete { name } => {
                store.delete_category(&name)?;
                println!("Deleted category {name}; its keys moved to {UNCATEGORIZED}.");
            }
            CategoryAction::List => {
                for category in store.list_categories()? {
                    println!("{}", category.name);
                }
            }
        },

        Command::Channel { action } => match action {
            ChannelAction::Add { name } => {
                if store.ensure_channel(&name)? {
                    println!("Added channel {name}.");
                } else {
                    println!("Channel {name} already exists.");
                }
            }
            ChannelAction::Rename { old, new } => {
                store.rename_channel(&old, &new)?;
                println!("Renamed channel {old} to {new}.");
            }
            ChannelAction::Delete { name } => {
                store.delete_channel(&name)?;
                println!("Deleted channel {name}.");
            }
            ChannelAction::List => {
                for channel in store.list_channels()? {
                    println!("{channel}");
                }
            }
        },

        Command::Report {
            preset,
            from,
            to,
            rate,
        } => {
            let (start, end) = match (from, to) {
                (Some(from), Some(to)) => (from, to),
                _ => parse_preset(&preset)?.resolve(Local::now().date_naive()),
            };
            let rate = match rate {
                Some(rate) => rate,
                None => fetch_rate()?,
            };

            let facts = store.sales_between(start, end)?;
            let summary = summarize(&facts, rate);

            println!("Sales {start} to {end} (USD at {rate:.4} BRL)");
            println!(
                "Total: {} sale(s), revenue {:.2}, cost {:.2}, profit {:.2}",
                summary.sales, summary.revenue, summary.cost, summary.profit
            );
            for row in &summary.by_category {
                println!(
                    "  {}: {} sale(s), revenue {:.2}, profit {:.2} ({:.2}/sale)",
                    row.category, row.sales, row.revenue, row.profit, row.mean_profit
                );
            }
        }

        Command::Export { out } => match out {
            Some(path) => {
                let file =
                    File::create(&path).with_context(|| format!("creating {}", path.display()))?;
                store.export_csv(file)?;
                println!("Exported to {}.", path.display());
            }
            None => store.export_csv(io::stdout().lock())?,
        },

        Command::Backup { dir } => {
            let target = store.backup(&dir, Utc::now())?;
            println!("Backed up to {}.", target.display());
        }

        Command::Message { keys, locale } => {
            let records = records_for_keys(&store, &keys)?;
            let categories = store.list_categories()?;
            println!("{}", delivery_message(&records, &categories, locale));
        }
    }

    Ok(())
}

fn ids_for_keys(store: &InventoryStore, keys: &[String]) -> anyhow::Result<Vec<KeyId>> {
    keys.iter()
        .map(|key| {
            store
                .view()
                .by_key(key)
                .map(|record| record.id)
                .with_context(|| format!("unknown key: {key}"))
        })
        .collect()
}

fn records_for_keys(store: &InventoryStore, keys: &[String]) -> anyhow::Result<Vec<KeyRecord>> {
    keys.iter()
        .map(|key| {
            store
                .view()
                .by_key(key)
                .cloned()
                .with_context(|| format!("unknown key: {key}"))
        })
        .collect()
}

fn format_record(record: &KeyRecord) -> String {
    let status = if record.sold { "Sold" } else { "Available" };
    let mut line = format!("{}  {}  {}", record.key, record.category, status);
    if let Some(buyer) = &record.buyer {
        line.push_str(&format!("  buyer={buyer}"));
    }
    if let Some(channel) = &record.channel {
        line.push_str(&format!("  channel={channel}"));
    }
    if let Some(at) = record.sold_at {
        line.push_str(&format!("  sold_at={}", at.format("%Y-%m-%d %H:%M:%S")));
    }
    line
}

fn parse_preset(name: &str) -> anyhow::Result<RangePreset> {
    Ok(match name {
        "today" => RangePreset::Today,
        "yesterday" => RangePreset::Yesterday,
        "last7" => RangePreset::Last7Days,
        "last30" => RangePreset::Last30Days,
        "this-month" => RangePreset::ThisMonth,
        "last-month" => RangePreset::LastMonth,
        other => bail!("unknown report preset: {other}"),
    })
}

fn fetch_rate() -> anyhow::Result<f64> {
    let fetcher = AwesomeApiQuotes::new()?;
    let rx = fetch_rate_in_background(fetcher);
    rx.recv()
        .context("quote worker disappeared")?
        .context("fetching the USD-BRL rate failed; pass --rate to set one manually")
}
