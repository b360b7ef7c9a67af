use camino::Utf8Path;
use tracing::debug;

use crate::checksum;
use crate::config::RegisterConfig;
use crate::domain::{MetadataRecord, ProducerKind, ResourceIdentifier};
use crate::error::RegError;

#[derive(Debug, Clone)]
pub struct IdentifierBuilder {
    scope: String,
    storage_root: String,
    transfer_url: String,
    producer: ProducerKind,
}

impl IdentifierBuilder {
    pub fn new(
        scope: impl Into<String>,
        storage_root: impl Into<String>,
        transfer_url: impl Into<String>,
        producer: ProducerKind,
    ) -> Self {
        Self {
            scope: scope.into(),
            storage_root: storage_root.into(),
            transfer_url: transfer_url.into(),
            producer,
        }
    }

    pub fn from_config(config: &RegisterConfig, producer: ProducerKind) -> Self {
        Self::new(
            config.scope.clone(),
            config.storage_root.clone(),
            config.transfer_url.clone(),
            producer,
        )
    }

    pub fn build(
        &self,
        path: &Utf8Path,
        sidecar: Option<&str>,
    ) -> Result<ResourceIdentifier, RegError> {
        let relative = path
            .as_str()
            .strip_prefix(&self.storage_root)
            .ok_or_else(|| RegError::PathOutsideRoot(path.to_owned()))?;

        let digests = checksum::digest_file(path)?;

        let physical_name = format!("{}{}", self.transfer_url, relative);
        let scope_prefix = format!("/{}/", self.scope);
        // Paths outside the scope directory keep their full relative name.
        let logical_name = relative.strip_prefix(&scope_prefix).unwrap_or(relative);
        debug!(%physical_name, %logical_name, "built identifier");

        Ok(ResourceIdentifier {
            physical_name,
            logical_name: logical_name.to_string(),
            size_bytes: digests.size_bytes,
            checksum_md5: digests.md5,
            checksum_adler32: digests.adler32,
            scope: self.scope.clone(),
            metadata: MetadataRecord::new(self.producer, sidecar),
        })
    }
}
