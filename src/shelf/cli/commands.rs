//! # CLI Layer
//!
//! One possible client of the shelf library. This is the only place that:
//! - Parses arguments
//! - Writes to stdout/stderr
//! - Installs the tracing subscriber
//! - Decides the exit status
//!
//! Every handler calls one `ShelfApi` method and renders the `CmdResult`.
//! A refused command (no copies, quota reached, unknown key) prints its
//! messages and makes the process exit with status 1.

use super::render::{
    print_item_detail, print_items, print_load_warnings, print_messages, print_patron_detail,
    print_stats,
};
use super::setup::{Cli, Commands, SearchBy};
use clap::Parser;
use directories::ProjectDirs;
use shelf::api::ShelfApi;
use shelf::commands::catalog::SearchField;
use shelf::commands::items::NewItem;
use shelf::commands::patrons::NewPatron;
use shelf::commands::CmdResult;
use shelf::config::ShelfConfig;
use shelf::error::{Result, ShelfError};
use shelf::model::Role;
use shelf::store::fs_backend::FsBackend;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const HOME_ENV: &str = "SHELF_HOME";

struct AppContext {
    api: ShelfApi<FsBackend>,
}

/// Runs the CLI. Returns `Ok(false)` when the command was refused.
pub fn run() -> Result<bool> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut ctx = init_context(&cli)?;

    let result = match cli.command {
        Commands::Add {
            key,
            title,
            creator,
            category,
            year,
            copies,
        } => ctx.api.add_item(NewItem {
            key,
            title,
            creator,
            category,
            year,
            copies,
        })?,
        Commands::Remove { key } => ctx.api.remove_item(&key)?,
        Commands::Show { key } => {
            let result = ctx.api.show_item(&key)?;
            if let Some(item) = result.listed_items.first() {
                print_item_detail(item);
            }
            return finish(result, false);
        }
        Commands::List { sort } => ctx.api.list_items(&sort)?,
        Commands::Search { term, by } => ctx.api.search_items(search_field(by), &term)?,
        Commands::Register {
            key,
            username,
            name,
            email,
            password,
            admin,
        } => ctx.api.register_patron(NewPatron {
            key,
            name: name.unwrap_or_else(|| username.clone()),
            username,
            password,
            email,
            role: if admin {
                Role::Administrator
            } else {
                Role::Patron
            },
        })?,
        Commands::Patron { key } => {
            let result = ctx.api.show_patron(&key)?;
            if let Some(patron) = result.listed_patrons.first() {
                print_patron_detail(patron);
            }
            if !result.listed_items.is_empty() {
                println!();
            }
            print_items(&result.listed_items);
            return finish(result, false);
        }
        Commands::Quota { key, quota } => ctx.api.set_quota(&key, quota)?,
        Commands::Borrow { patron, item } => ctx.api.borrow(&patron, &item)?,
        Commands::Return { patron, item } => ctx.api.return_item(&patron, &item)?,
        Commands::Wait { patron, item } => ctx.api.wait(&patron, &item)?,
        Commands::Next { item } => ctx.api.next_waiter(&item)?,
        Commands::Stats => {
            let result = ctx.api.stats()?;
            if let Some(stats) = &result.stats {
                print_stats(stats);
            }
            return finish(result, false);
        }
    };

    finish(result, true)
}

fn finish(result: CmdResult, show_items: bool) -> Result<bool> {
    if show_items {
        print_items(&result.listed_items);
    }
    print_messages(&result.messages);
    Ok(result.is_success())
}

fn search_field(by: SearchBy) -> SearchField {
    match by {
        SearchBy::Title => SearchField::Title,
        SearchBy::Creator => SearchField::Creator,
        SearchBy::Category => SearchField::Category,
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "shelf=debug" } else { "shelf=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // Ignore a second initialization (e.g. when embedded in tests).
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let data_dir = resolve_data_dir(cli)?;
    let config = ShelfConfig::load(&data_dir)?;

    let backend = FsBackend::new(config.items_path(&data_dir), config.patrons_path(&data_dir));
    tracing::debug!(
        items = %backend.items_path().display(),
        patrons = %backend.patrons_path().display(),
        "opening catalog"
    );
    let api = ShelfApi::new(backend).with_default_quota(config.default_quota);
    print_load_warnings(api.load_warnings());

    Ok(AppContext { api })
}

fn resolve_data_dir(cli: &Cli) -> Result<PathBuf> {
    if let Some(dir) = &cli.data_dir {
        return Ok(dir.clone());
    }
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("com", "shelf", "shelf")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| ShelfError::Store("Could not determine a data directory".to_string()))
}
