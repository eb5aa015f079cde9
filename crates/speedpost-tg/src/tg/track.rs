use crate::prelude::*;
use crate::tg::{self, reply};
use crate::tracking::TrackingQuery;
use crate::Result;
use teloxide::prelude::*;

#[derive(Debug, thiserror::Error)]
pub(crate) enum TrackCommandError {
    #[error("Please send a tracking number like this: EZ123456789IN")]
    EmptyQuery,
}

/// Replies with an acknowledgement right away, because the lookup may take
/// a while, and then replaces it with the result of the lookup.
pub(crate) async fn handle(ctx: &tg::Ctx, msg: &Message, raw_query: &str) -> Result {
    let query = TrackingQuery::parse(raw_query).ok_or(TrackCommandError::EmptyQuery)?;

    let ack = ctx
        .bot
        .reply_to(msg, reply::acknowledgement(ctx.cfg.max_wait()))
        .await?;

    let text = match ctx.prober.probe(&query).await {
        Some(result) => reply::tracking_result(&query, &result),
        None => reply::not_found(),
    };

    let edited = ctx
        .bot
        .edit_message_text(ack.chat.id, ack.id, text.clone())
        .await;

    if let Err(err) = edited {
        warn!(
            err = tracing_err(&err),
            "Failed to edit the acknowledgement, sending a new message instead"
        );
        ctx.bot.reply_to(msg, text).await?;
    }

    Ok(())
}
