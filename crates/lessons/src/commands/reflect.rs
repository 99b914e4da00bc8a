use lessons_core::ReflectRequest;

pub fn run(query: Option<String>, limit: Option<usize>) -> anyhow::Result<()> {
    let engine = super::open_engine()?;
    let outcome = engine.reflect(&ReflectRequest { query, limit })?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
