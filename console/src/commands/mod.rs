//! Subcommand dispatch

mod admin;
mod member;

use crate::cli::{AdminCommand, Command};
use crate::config::ClientConfig;
use crate::context::{open_store, Console};
use jifeng_core::SessionScope;
use jifeng_engine::Route;

/// Screen a command corresponds to, for the session guard
fn route_of(command: &Command) -> (SessionScope, Route) {
    match command {
        Command::Login(_) | Command::Logout => (SessionScope::Member, Route::Login),
        Command::Balance
        | Command::Products
        | Command::Product { .. }
        | Command::Exchange { .. } => (SessionScope::Member, Route::Exchange),
        Command::Records { .. } => (SessionScope::Member, Route::Records),
        Command::Admin(AdminCommand::Login(_) | AdminCommand::Logout) => {
            (SessionScope::Admin, Route::Login)
        }
        Command::Admin(AdminCommand::Exchanges { .. }) => (SessionScope::Admin, Route::AdminExchanges),
        Command::Admin(_) => (SessionScope::Admin, Route::AdminProducts),
    }
}

pub async fn run(config: &ClientConfig, command: Command) -> anyhow::Result<()> {
    let (scope, route) = route_of(&command);
    let store = open_store(config).await?;
    let console = Console::connect(config, store, scope, route).await?;

    let result = match command {
        Command::Login(args) => member::login(&console, &args.username, args.password).await,
        Command::Logout => member::logout(&console).await,
        Command::Balance => member::balance(&console).await,
        Command::Products => member::products(&console).await,
        Command::Product { id } => member::product(&console, &id).await,
        Command::Records { kind, range } => {
            member::records(&console, kind.into(), range.into()).await
        }
        Command::Exchange {
            product_id,
            quantity,
        } => member::exchange(&console, config, &product_id, quantity).await,
        Command::Admin(command) => admin::run(&console, command).await,
    };

    console.finish().await;
    result
}
