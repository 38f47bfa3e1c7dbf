use anyhow::Context;
use bank::{init_bank, run_app};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let bank = init_bank().context("failed to set up the bank")?;
    run_app(bank).context("session aborted")?;
    Ok(())
}
