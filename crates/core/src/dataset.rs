use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::info;

use crate::error::DatasetError;
use crate::model::DatasetNode;

pub const DEFAULT_DATASET: &str = "vor_data.json";

pub fn load(path: &Path) -> Result<DatasetNode, DatasetError> {
    let file = File::open(path)?;
    let root = from_reader(BufReader::new(file))?;
    info!(path = %path.display(), groups = root.children.as_ref().map_or(0, Vec::len), "dataset loaded");
    Ok(root)
}

pub fn from_reader(reader: impl Read) -> Result<DatasetNode, DatasetError> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn from_str(json: &str) -> Result<DatasetNode, DatasetError> {
    Ok(serde_json::from_str(json)?)
}
