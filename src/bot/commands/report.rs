//! Report Discord commands - `total`, `history`, `export` and `reset`.
//!
//! Each command reads the caller's records from the shared ledger and hands
//! them to the core report functions; the lock is released before replying.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::Context,
        core::{lock_ledger, report, summarize},
        errors::Result,
    };
    use poise::serenity_prelude as serenity;
    use tracing::info;

    /// File name the exported log is sent under.
    const EXPORT_FILE_NAME: &str = "ledger.csv";

    /// Shows income, expense and balance totals.
    #[poise::command(slash_command, prefix_command)]
    pub async fn total(ctx: Context<'_>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let records = lock_ledger(&ctx.data().ledger)?.read(&user_id)?;
        let summary = summarize(&records);

        ctx.say(format!(
            "📊 Your financial summary:\n{}",
            report::format_summary(&summary)
        ))
        .await?;
        Ok(())
    }

    /// Shows the latest transactions.
    #[poise::command(slash_command, prefix_command)]
    pub async fn history(ctx: Context<'_>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let records = lock_ledger(&ctx.data().ledger)?.read(&user_id)?;

        if records.is_empty() {
            ctx.say("No transaction history yet.").await?;
            return Ok(());
        }

        let latest = report::recent(&records, ctx.data().config.history_limit);
        ctx.say(format!(
            "📜 Latest transactions:\n{}",
            report::format_history(latest)
        ))
        .await?;
        Ok(())
    }

    /// Sends the ledger log as a CSV file.
    #[poise::command(slash_command, prefix_command)]
    pub async fn export(ctx: Context<'_>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let log = {
            let ledger = lock_ledger(&ctx.data().ledger)?;
            if ledger.read(&user_id)?.is_empty() {
                None
            } else {
                Some(ledger.raw_log()?)
            }
        };

        let Some(log) = log else {
            ctx.say("No data to export yet.").await?;
            return Ok(());
        };

        ctx.send(
            poise::CreateReply::default()
                .attachment(serenity::CreateAttachment::bytes(log, EXPORT_FILE_NAME)),
        )
        .await?;
        Ok(())
    }

    /// Deletes every one of your records.
    #[poise::command(slash_command, prefix_command)]
    pub async fn reset(ctx: Context<'_>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let removed = lock_ledger(&ctx.data().ledger)?.purge(&user_id)?;
        info!("User {} reset their ledger ({} records)", user_id, removed);

        ctx.say("🗑️ All of your data has been deleted.").await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
