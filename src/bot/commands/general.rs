//! General Discord commands - greeting and help.
//! These commands don't touch the ledger.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{bot::Context, errors::Result};

    const HELP_TEXT: &str = "👋 Hi! I keep track of your money.\n\n\
        Available commands:\n\
        📥 `/income <amount> [description]` - record income\n\
        📤 `/expense <amount> [description]` - record an expense\n\
        📊 `/total` - show your summary\n\
        📜 `/history` - show your latest transactions\n\
        📂 `/export` - download the ledger as CSV\n\
        🗑️ `/reset` - delete all of your data\n\
        📈 `/chart` - income vs expense chart\n\
        📉 `/balance_chart [day/week/month/year]` - balance over time";

    /// Greets the user and lists the commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn start(ctx: Context<'_>) -> Result<()> {
        ctx.say(HELP_TEXT).await?;
        Ok(())
    }

    /// Lists the available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: Context<'_>) -> Result<()> {
        ctx.say(HELP_TEXT).await?;
        Ok(())
    }

}

// Re-export all commands
pub use inner::*;
