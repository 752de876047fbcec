//! Chart Discord commands - `chart` and `balance_chart`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::Context,
        chart::{render_balance_chart, render_share_chart},
        core::{Period, aggregate_balance, lock_ledger, summarize},
        errors::Result,
    };
    use poise::serenity_prelude as serenity;

    const NO_DATA: &str = "No data to chart yet.";

    const BALANCE_CHART_USAGE: &str = "Usage:\n\
        `/balance_chart day` - daily\n\
        `/balance_chart week` - weekly\n\
        `/balance_chart month` - monthly\n\
        `/balance_chart year` - yearly";

    async fn send_svg(ctx: Context<'_>, svg: Vec<u8>, file_name: String) -> Result<()> {
        ctx.send(
            poise::CreateReply::default()
                .attachment(serenity::CreateAttachment::bytes(svg, file_name)),
        )
        .await?;
        Ok(())
    }

    /// Pie chart of your income against your expenses.
    #[poise::command(slash_command, prefix_command, aliases("grafik"))]
    pub async fn chart(ctx: Context<'_>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let records = lock_ledger(&ctx.data().ledger)?.read(&user_id)?;
        let summary = summarize(&records);

        if summary.is_empty() {
            ctx.say(NO_DATA).await?;
            return Ok(());
        }

        let svg = render_share_chart(&summary)?;
        send_svg(ctx, svg, "chart.svg".to_string()).await
    }

    /// Line chart of your balance per day, week, month or year.
    #[poise::command(slash_command, prefix_command, aliases("grafiksaldo"))]
    pub async fn balance_chart(
        ctx: Context<'_>,
        #[description = "day, week, month or year"] period: Option<String>,
    ) -> Result<()> {
        let Some(period) = period else {
            ctx.say(BALANCE_CHART_USAGE).await?;
            return Ok(());
        };

        let period = match period.parse::<Period>() {
            Ok(period) => period,
            Err(e) => {
                ctx.say(e.user_message()).await?;
                return Ok(());
            }
        };

        let user_id = ctx.author().id.to_string();
        let records = lock_ledger(&ctx.data().ledger)?.read(&user_id)?;
        let points = aggregate_balance(&records, period);

        if points.is_empty() {
            ctx.say(NO_DATA).await?;
            return Ok(());
        }

        let svg = render_balance_chart(&points, period)?;
        send_svg(ctx, svg, format!("balance_{period}.svg")).await
    }

}

// Re-export all commands
pub use inner::*;
