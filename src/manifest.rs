use std::fs;
use std::path::Path;

use crate::domain::SourceRef;
use crate::error::RegError;

pub fn load(path: &Path) -> Result<Vec<SourceRef>, RegError> {
    let content =
        fs::read_to_string(path).map_err(|_| RegError::ManifestRead(path.to_path_buf()))?;
    let refs: Vec<SourceRef> =
        serde_json::from_str(&content).map_err(|err| RegError::ManifestParse(err.to_string()))?;
    Ok(refs)
}

pub fn from_paths(paths: &[String]) -> Vec<SourceRef> {
    paths
        .iter()
        .map(|path| SourceRef::from_path(path.clone()))
        .collect()
}
