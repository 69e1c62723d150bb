use fertil_core::error::FertilError;
use serde::Serialize;

pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<(), FertilError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
