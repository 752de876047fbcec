//! Transaction Discord commands - `income` and `expense`.
//!
//! Amount validation happens here, at the boundary; the ledger itself trusts
//! the amounts it is handed.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::Context,
        core::lock_ledger,
        entities::Kind,
        errors::{Error, Result},
    };
    use tracing::debug;

    /// Parses a whole, non-negative amount such as `1000`.
    ///
    /// # Errors
    /// Returns `Error::InvalidAmount` for anything else (negative, fractional, text).
    pub fn parse_amount(input: &str) -> Result<u64> {
        input
            .trim()
            .parse::<u64>()
            .map_err(|_| Error::InvalidAmount {
                input: input.to_string(),
            })
    }

    const fn example_for(kind: Kind) -> &'static str {
        match kind {
            Kind::Income => "/income 1000 salary",
            Kind::Expense => "/expense 500 fried rice",
        }
    }

    const fn label_for(kind: Kind) -> &'static str {
        match kind {
            Kind::Income => "Income",
            Kind::Expense => "Expense",
        }
    }

    async fn record_entry(
        ctx: Context<'_>,
        kind: Kind,
        amount: Option<String>,
        description: Option<String>,
    ) -> Result<()> {
        let example = example_for(kind);

        let Some(amount) = amount else {
            ctx.say(format!(
                "Enter an amount and a description, e.g. `{example}`"
            ))
            .await?;
            return Ok(());
        };

        let amount = match parse_amount(&amount) {
            Ok(amount) => amount,
            Err(e) => {
                debug!("Rejected amount from {}: {}", ctx.author().id, e);
                ctx.say(format!("Amount must be a whole number, e.g. `{example}`"))
                    .await?;
                return Ok(());
            }
        };

        let user_id = ctx.author().id.to_string();
        let record =
            lock_ledger(&ctx.data().ledger)?.append(&user_id, kind, amount, description.as_deref())?;

        ctx.say(format!(
            "✅ {} {} ({}) recorded",
            label_for(kind),
            record.amount,
            record.description
        ))
        .await?;
        Ok(())
    }

    /// Records money coming in.
    #[poise::command(slash_command, prefix_command, aliases("pemasukan"))]
    pub async fn income(
        ctx: Context<'_>,
        #[description = "Amount, a whole number"] amount: Option<String>,
        #[description = "Where the money came from"]
        #[rest]
        description: Option<String>,
    ) -> Result<()> {
        record_entry(ctx, Kind::Income, amount, description).await
    }

    /// Records money going out.
    #[poise::command(slash_command, prefix_command, aliases("pengeluaran"))]
    pub async fn expense(
        ctx: Context<'_>,
        #[description = "Amount, a whole number"] amount: Option<String>,
        #[description = "What the money was spent on"]
        #[rest]
        description: Option<String>,
    ) -> Result<()> {
        record_entry(ctx, Kind::Expense, amount, description).await
    }

}

// Re-export all commands
pub use inner::*;
