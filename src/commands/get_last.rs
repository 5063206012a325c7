use anyhow::Result;
use oneonone_core::input::positive_days;
use oneonone_core::one_on_one::OneOnOneTracker;
use owo_colors::OwoColorize;

use crate::context::Context;
use crate::render::{Render, pluralize};

pub async fn run(ctx: &Context, username: &str, days: i64) -> Result<()> {
    let days = positive_days(days, "--days")?;

    let directory = ctx.directory()?;
    let person = ctx.person(&directory, username)?;

    let calendar = ctx.calendar(false).await?;
    let me = ctx.me(&calendar, &directory).await?;
    let tracker = OneOnOneTracker::new(&calendar, &me, ctx.tz);

    match tracker.last_one_on_one(&person, days, ctx.now()).await? {
        Some(event) => println!("{}", event.render()),
        None => println!(
            "{}",
            format!(
                "No 1:1 with {} found in the last {} {}",
                person.name,
                days,
                pluralize("day", days)
            )
            .dimmed()
        ),
    }

    Ok(())
}
