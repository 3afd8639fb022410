fn main() -> anyhow::Result<()> {
    cluckbook::run()?;
    Ok(())
}
