pub fn run() -> anyhow::Result<()> {
    println!("updateguard {}", env!("CARGO_PKG_VERSION"));
    println!("Update-source suppression filters for WordPress-style hosts");
    Ok(())
}
