use std::collections::BTreeMap;

use camino::Utf8Path;
use tracing::{debug, info};

use crate::attacher::DatasetAttacher;
use crate::catalog::CatalogConnector;
use crate::domain::{Bundle, ResourceIdentifier, SourceRef};
use crate::error::RegError;
use crate::identifier::IdentifierBuilder;
use crate::submitter::ReplicaSubmitter;

pub struct RegistrationOrchestrator<C: CatalogConnector> {
    builder: IdentifierBuilder,
    submitter: ReplicaSubmitter<C>,
    attacher: DatasetAttacher<C>,
}

impl<C: CatalogConnector> RegistrationOrchestrator<C> {
    pub fn new(
        builder: IdentifierBuilder,
        submitter: ReplicaSubmitter<C>,
        attacher: DatasetAttacher<C>,
    ) -> Self {
        Self {
            builder,
            submitter,
            attacher,
        }
    }

    // Ordering: every replica is created before any attach is attempted.
    pub fn register(&mut self, dataset_id: &str, refs: &[SourceRef]) -> Result<usize, RegError> {
        if refs.is_empty() {
            return Ok(0);
        }

        let mut bundles = Vec::with_capacity(refs.len());
        for source in refs {
            let identifier = self
                .builder
                .build(Utf8Path::new(&source.path), source.sidecar.as_deref())?;
            let dataset = source
                .dataset
                .clone()
                .unwrap_or_else(|| dataset_id.to_string());
            bundles.push(Bundle {
                dataset_id: dataset,
                identifier,
            });
        }

        let identifiers: Vec<ResourceIdentifier> = bundles
            .iter()
            .map(|bundle| bundle.identifier.clone())
            .collect();
        self.submitter.submit(&identifiers)?;

        let mut groups: BTreeMap<String, Vec<ResourceIdentifier>> = BTreeMap::new();
        for bundle in bundles {
            groups.entry(bundle.dataset_id).or_default().push(bundle.identifier);
        }

        for (dataset, members) in &groups {
            info!(dataset, count = members.len(), "attaching identifiers");
            self.attacher.attach_batch(dataset, members)?;
        }

        let total = identifiers.len();
        debug!(total, "registration complete");
        Ok(total)
    }
}
