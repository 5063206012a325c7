use anyhow::Result;
use oneonone_core::source::CalendarSource;
use owo_colors::OwoColorize;

use crate::context::Context;

pub async fn run(ctx: &Context) -> Result<()> {
    let calendar = ctx.calendar(true).await?;
    let account = calendar.account().await?;

    println!("{} Authenticated as {}", "✓".green(), account.bold());
    println!("   {}", format!("Time zone: {}", calendar.timezone()).dimmed());

    Ok(())
}
