use recettes_telegram_rs::config::{open_store, Args};
use recettes_telegram_rs::data_backend::SharedStore;
use recettes_telegram_rs::data_types::{BotSettings, Command, DialogueState};
use recettes_telegram_rs::shared_main::{logger_init, schema};

use anyhow::Context;
use clap::Parser;
use log::log_enabled;
use std::process::exit;
use teloxide::{dispatching::dialogue::InMemStorage, prelude::*, utils::command::BotCommands};

fn build_store(args: &Args) -> anyhow::Result<SharedStore> {
    let config = args
        .store_config()
        .context("missing or invalid backend configuration")?;
    let store = open_store(&config).context("cannot open the store")?;
    Ok(store)
}

#[tokio::main]
async fn main() {
    //// Args setup
    let args = Args::parse();

    if args.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }

    logger_init(module_path!());
    log::info!("Starting bot...");

    if !(log_enabled!(log::Level::Debug) || log_enabled!(log::Level::Trace)) {
        log::info!("Enable verbose logging for performance metrics");
    }

    //// Store setup
    let store = match build_store(&args) {
        Ok(store) => store,
        Err(e) => {
            log::error!("{:#}", e);
            exit(1);
        }
    };

    let settings = BotSettings {
        history_concurrency: args.history_concurrency.max(1),
    };

    let bot = Bot::new(args.token);

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        log::warn!("Registering the command list failed: {}", e);
    }

    let command_handler_deps = dptree::deps![
        InMemStorage::<DialogueState>::new(),
        store,
        settings
    ];
    Dispatcher::builder(bot, schema())
        .dependencies(command_handler_deps)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
