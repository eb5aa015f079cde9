use crate::tg::{self, track};
use crate::prelude::*;
use crate::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use teloxide::utils::markdown;

#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "snake_case", description = "Commands:")]
pub(crate) enum Cmd {
    #[command(description = "show the guide")]
    Help,

    #[command(description = "look up a parcel by its tracking number")]
    Track(String),
}

#[async_trait]
impl tg::cmd::Command for Cmd {
    async fn handle(self, ctx: &tg::Ctx, msg: &Message) -> Result {
        match self {
            Cmd::Help => {
                let commands = markdown::escape(&Cmd::descriptions().to_string());
                let help_text = format!(
                    "{}\n\n{commands}\n\n{}",
                    tg::reply::greeting(),
                    markdown::escape("You can also just send the tracking number as is."),
                );

                ctx.bot.reply_to(msg, help_text).await?;
            }
            Cmd::Track(query) => track::handle(ctx, msg, &query).await?,
        }
        Ok(())
    }
}
