pub mod config;
pub mod energy;
pub mod focus;

use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
