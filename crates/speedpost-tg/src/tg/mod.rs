//! Telegram commands root module

mod cmd;
mod config;
mod reply;
mod track;

use crate::prelude::*;
use crate::{http, tracking, Result};
use dptree::di::DependencyMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use teloxide::adaptors::{CacheMe, DefaultParseMode, Throttle, Trace};
use teloxide::dispatching::UpdateFilterExt;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::update_listeners::webhooks;
use teloxide::utils::command::BotCommands;

pub(crate) use config::*;
pub(crate) use track::TrackCommandError;

pub(crate) type Bot = Trace<CacheMe<DefaultParseMode<Throttle<teloxide::Bot>>>>;

/// Number of updates received from Telegram
const TG_UPDATES_TOTAL: &str = "tg_updates_total";

/// Number of updates received from Telegram, that were skipped by the bot
const TG_UPDATES_SKIPPED_TOTAL: &str = "tg_updates_skipped_total";

pub(crate) struct Ctx {
    bot: Bot,
    prober: tracking::Prober,
    cfg: tracking::Config,
}

pub(crate) struct RunBotOptions {
    pub(crate) tg_cfg: Config,
    pub(crate) tracking_cfg: tracking::Config,
    pub(crate) http: http::Client,
}

pub(crate) async fn run_bot(opts: RunBotOptions) -> Result {
    let mut di = DependencyMap::new();

    let bot: Bot = teloxide::Bot::new(opts.tg_cfg.token.clone())
        .throttle(Default::default())
        .parse_mode(ParseMode::MarkdownV2)
        .cache_me()
        .trace(teloxide::adaptors::trace::Settings::all());

    info!(
        endpoints = opts.tracking_cfg.endpoints.len(),
        timeout = tracing_duration(opts.tracking_cfg.timeout),
        "Using tracking endpoints"
    );

    di.insert(Arc::new(Ctx {
        bot: bot.clone(),
        prober: tracking::Prober::new(opts.tracking_cfg.clone(), opts.http),
        cfg: opts.tracking_cfg,
    }));

    info!("Starting bot...");

    bot.set_my_commands(cmd::regular::Cmd::bot_commands())
        .send()
        .with_duration_log("Registered the bot commands")
        .await?;

    let handler = dptree::entry()
        .inspect(|update: Update| {
            metrics::register_counter!(TG_UPDATES_TOTAL, "kind" => update.kind.discriminator())
                .increment(1);
        })
        .branch(
            Update::filter_message()
                .filter_command::<cmd::StartCommand>()
                .endpoint(cmd::handle::<cmd::StartCommand>()),
        )
        .branch(
            Update::filter_message()
                .filter_command::<cmd::regular::Cmd>()
                .endpoint(cmd::handle::<cmd::regular::Cmd>()),
        )
        .branch(
            Update::filter_message()
                .chain(dptree::filter_map(cmd::filter_plain_text))
                .endpoint(cmd::handle::<cmd::regular::Cmd>()),
        )
        .inspect(|update: Update| {
            metrics::register_counter!(
                TG_UPDATES_SKIPPED_TOTAL,
                "kind" => update.kind.discriminator()
            )
            .increment(1);
        });

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(di)
        // We don't handle all possible messages that users send,
        // so to suppress the warning that we don't do this we have
        // a noop default handler here
        .default_handler(|_| std::future::ready(()))
        .enable_ctrlc_handler()
        .build();

    match opts.tg_cfg.webhook_endpoint() {
        None => {
            info!("Receiving updates via long polling");
            dispatcher.dispatch().await;
        }
        Some(url) => {
            let url = url.fatal_ctx(|| "Invalid webhook URL")?;
            let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, opts.tg_cfg.webhook_port));

            info!(%url, %addr, "Receiving updates via webhook");

            let listener = webhooks::axum(bot, webhooks::Options::new(addr, url)).await?;

            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await;
        }
    }

    info!("Bot stopped");

    Ok(())
}
