#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

use anyhow::Result;
use vergen::EmitBuilder;

fn main() -> Result<()> {
    // Emits placeholder values when there is no git checkout.
    EmitBuilder::builder().all_git().emit()?;

    return Ok(());
}
