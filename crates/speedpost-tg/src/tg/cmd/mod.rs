pub(crate) mod regular;

use crate::prelude::*;
use crate::util::DynResult;
use crate::{tg, Result};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use teloxide::macros::BotCommands;
use teloxide::types::{Message, User};
use teloxide::utils::markdown;

#[async_trait]
pub(crate) trait Command: fmt::Debug + Send + Sync + 'static {
    async fn handle(self, ctx: &tg::Ctx, msg: &Message) -> Result;
}

pub(crate) fn handle<'a, C: Command>(
) -> impl Fn(Arc<tg::Ctx>, Message, C) -> BoxFuture<'a, DynResult> {
    move |ctx, msg, cmd| {
        let span = info_span!(
            "handle_message",
            sender = msg.from().map(User::debug_id).as_deref(),
            chat = %msg.chat.debug_id(),
            cmd = format_args!("{cmd:?}")
        );

        let fut = async move {
            debug!("Processing command");

            let result = cmd.handle(&ctx, &msg).await;

            if let Err(err) = &result {
                let span = warn_span!("err", err = tracing_err(err), id = err.id());
                report_error(&ctx, &msg, err).instrument(span).await;
            }

            result.map_err(Into::into)
        };

        Box::pin(fut.instrument(span))
    }
}

async fn report_error(ctx: &tg::Ctx, msg: &Message, err: &crate::Error) {
    let reply_msg = if err.is_user_error() {
        markdown::escape(&err.kind().to_string())
    } else {
        warn!("Command handler returned an error");
        markdown::code_block(&err.display_chain().to_string())
    };

    if let Err(err) = ctx.bot.reply_to(msg, reply_msg).await {
        warn!(
            err = tracing_err(&err),
            "Failed to reply with the error message to the user"
        );
    }
}

/// Special case for the `/start` command in PM with the bot.
///
/// We don't want this command to appear in the help message, so we handle
/// it separately
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "snake_case")]
pub(crate) enum StartCommand {
    #[command(description = "unreachable")]
    Start,
}

#[async_trait]
impl Command for StartCommand {
    async fn handle(self, ctx: &tg::Ctx, msg: &Message) -> Result {
        ctx.bot.reply_to(msg, tg::reply::greeting()).await?;
        Ok(())
    }
}

/// Any text that isn't a command is considered to be a tracking number
pub(crate) fn filter_plain_text(msg: Message) -> Option<regular::Cmd> {
    let text = msg.text()?;
    if text.starts_with('/') {
        return None;
    }
    Some(regular::Cmd::Track(text.to_owned()))
}
