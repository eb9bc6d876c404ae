//! Pretty-printing for CLI results. Kept separate from `main` so the
//! command dispatch stays readable.

use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
