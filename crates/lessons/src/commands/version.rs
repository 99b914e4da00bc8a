pub fn run() -> anyhow::Result<()> {
    println!("lessons {}", env!("CARGO_PKG_VERSION"));
    println!("Self-improvement loop for AI coding assistants");
    Ok(())
}
