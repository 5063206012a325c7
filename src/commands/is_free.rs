use anyhow::Result;
use oneonone_core::input::{MeetingDate, MeetingTime, local_datetime, parse_duration};
use oneonone_core::slots;
use oneonone_core::source::CalendarSource;

use crate::context::Context;

pub async fn run(
    ctx: &Context,
    username: &str,
    date: &str,
    time: &str,
    duration: Option<&str>,
) -> Result<()> {
    let date = MeetingDate::parse(date, ctx.now().date_naive())?;
    let time: MeetingTime = time.parse()?;
    let start = local_datetime(&ctx.tz, date, time)?;
    let duration = match duration {
        Some(s) => parse_duration(s)?,
        None => ctx.config.meeting_duration()?,
    };

    let directory = ctx.directory()?;
    let person = ctx.person(&directory, username)?;

    let calendar = ctx.calendar(false).await?;
    let busy = calendar.busy(&person.email, start, start + duration).await?;

    println!("{}", slots::is_free(&busy, start, duration));

    Ok(())
}
