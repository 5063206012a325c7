use anyhow::Result;
use oneonone_core::dataset::DatasetStore;
use oneonone_core::input::positive_days;
use oneonone_core::one_on_one::OneOnOneTracker;

use crate::context::Context;
use crate::render::render_recommendation;

/// Prefer the stored record unless `refresh` is set or there is none.
pub async fn run(
    ctx: &Context,
    username: &str,
    days: i64,
    refresh: bool,
    cadence_days: Option<i64>,
) -> Result<()> {
    let days = positive_days(days, "--days")?;

    let directory = ctx.directory()?;
    let person = ctx.person(&directory, username)?;
    let today = ctx.now().date_naive();

    if !refresh {
        let stored = ctx.store()?.load()?;
        if let Some(record) = stored.as_ref().and_then(|d| d.get(&person.username)) {
            tracing::debug!(username = %person.username, "Using stored recommendation");
            println!("{}", render_recommendation(&record.to_recommendation(today), today));
            return Ok(());
        }
    }

    let cadence = ctx.cadence(cadence_days, None)?;

    let calendar = ctx.calendar(false).await?;
    let me = ctx.me(&calendar, &directory).await?;
    let tracker = OneOnOneTracker::new(&calendar, &me, ctx.tz);

    let rec = tracker
        .next_meeting_date(&person, days, &cadence, ctx.now())
        .await?;
    println!("{}", render_recommendation(&rec, today));

    Ok(())
}
