use anyhow::Result;

use crate::context::Context;
use crate::render::Render;

pub fn run(ctx: &Context, key: &str) -> Result<()> {
    let directory = ctx.directory()?;
    let person = directory.lookup(key)?;

    println!("{}", person.render());

    Ok(())
}
