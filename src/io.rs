//! Loading candidate maps and ranking configuration from JSON files

use anyhow::{Context, Result};
use expanse_core::CandidateMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

/// Read a JSON object of `key -> representation`, keeping document order
pub fn load_candidates<R: DeserializeOwned>(path: &Path) -> Result<CandidateMap<R>> {
    load_json(path).with_context(|| format!("Failed to load candidates from {:?}", path))
}

/// Read any JSON configuration document
pub fn load_config<C: DeserializeOwned>(path: &Path) -> Result<C> {
    load_json(path).with_context(|| format!("Failed to load config from {:?}", path))
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Write a value as pretty JSON followed by a newline
pub fn write_json<T: Serialize, W: Write>(mut writer: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    Ok(())
}
