//! Stored utme state
//!
//! State files are JSON objects with a `utme` field. The field may hold a
//! wire string, `null`, or the structured form printed by `decode`; any other
//! kind of value is rejected by the codec.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use utme_codec::{Utme, UtmeInput};

/// Load the codec stored in a state file
pub fn load_state(path: &Path) -> Result<Utme> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file: {:?}", path))?;
    let state: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse state file: {:?}", path))?;

    let stored = state.get("utme").unwrap_or(&Value::Null);
    let input = UtmeInput::try_from(stored)
        .with_context(|| format!("Invalid utme in state file: {:?}", path))?;
    let utme = Utme::parse(input)
        .with_context(|| format!("Invalid utme in state file: {:?}", path))?;

    log::debug!("Loaded state from {:?}: {:?}", path, utme.serialize());
    Ok(utme)
}

/// Store the codec as its wire string
pub fn save_state(path: &Path, utme: &Utme) -> Result<()> {
    let state = json!({ "utme": utme.serialize() });
    let content = serde_json::to_string_pretty(&state)?;
    fs::write(path, content).with_context(|| format!("Failed to write state file: {:?}", path))?;
    log::debug!("Saved state to {:?}", path);
    Ok(())
}
