use anyhow::Result;
use oneonone_core::input::positive_days;
use oneonone_core::one_on_one::OneOnOneTracker;
use owo_colors::OwoColorize;

use crate::context::Context;
use crate::render::render_recommendation;
use crate::utils::tui;

pub async fn run(ctx: &Context, days: i64, cadence_days: Option<i64>) -> Result<()> {
    let days = positive_days(days, "--days")?;
    let cadence = ctx.cadence(cadence_days, None)?;

    let directory = ctx.directory()?;
    let mut store = ctx.store()?;

    let calendar = ctx.calendar(false).await?;
    let me = ctx.me(&calendar, &directory).await?;
    let people = directory.tracked(&me.email, &ctx.config.tracked)?;

    let tracker = OneOnOneTracker::new(&calendar, &me, ctx.tz);
    let now = ctx.now();
    let spinner = tui::create_spinner(format!("Scanning {} calendars", people.len()));
    let result = tracker
        .refresh(&mut store, &people, days, &cadence, now)
        .await;
    spinner.finish_and_clear();
    let dataset = result?;

    let today = now.date_naive();
    for record in &dataset.records {
        println!("{}", render_recommendation(&record.to_recommendation(today), today));
    }
    println!(
        "\n{}",
        format!(
            "Saved {} recommendations to {}",
            dataset.records.len(),
            store.path().display()
        )
        .dimmed()
    );

    Ok(())
}
