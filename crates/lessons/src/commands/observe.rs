use anyhow::Context;
use lessons_core::ObserveRequest;
use std::io::{self, Read};

pub fn run() -> anyhow::Result<()> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;

    let request: ObserveRequest =
        serde_json::from_str(&input).context("stdin is not a valid observe request")?;

    let engine = super::open_engine()?;
    let outcome = engine.observe(request, &super::session_id())?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
