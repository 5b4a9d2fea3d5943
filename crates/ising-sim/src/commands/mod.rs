pub mod exact;
pub mod mcmc;
pub mod version;

use std::error::Error;

use serde::Serialize;

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
