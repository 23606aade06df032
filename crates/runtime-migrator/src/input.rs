//! Runtime ID input

use std::collections::HashSet;

use clap::ValueEnum;
use runtime_common::{Error, Result};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Format of the runtime ID list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum InputType {
    /// One ID per line; blank lines and `#` comments are skipped
    Txt,
    /// A JSON array of strings
    #[default]
    Json,
}

/// Read and parse runtime IDs from an async reader
pub async fn read_runtime_ids<R>(mut reader: R, input_type: InputType) -> Result<Vec<String>>
where
    R: AsyncRead + Unpin,
{
    let mut input = String::new();
    reader.read_to_string(&mut input).await?;
    parse_runtime_ids(&input, input_type)
}

/// Parse runtime IDs, dropping duplicates but keeping first-seen order
pub fn parse_runtime_ids(input: &str, input_type: InputType) -> Result<Vec<String>> {
    let ids: Vec<String> = match input_type {
        InputType::Json => serde_json::from_str::<Vec<String>>(input)
            .map_err(|e| Error::serialization_for_kind("runtime IDs", e.to_string()))?
            .into_iter()
            .map(|id| id.trim().to_string())
            .collect(),
        InputType::Txt => input
            .lines()
            .map(str::trim)
            .filter(|line| !line.starts_with('#'))
            .map(str::to_string)
            .collect(),
    };

    let mut seen = HashSet::new();
    Ok(ids
        .into_iter()
        .filter(|id| !id.is_empty() && seen.insert(id.clone()))
        .collect())
}
