use tracing::{debug, info};

use crate::catalog::{AttachReply, CatalogConnector, CatalogSession, CreateDatasetReply};
use crate::domain::{DatasetStatus, ResourceIdentifier};
use crate::error::RegError;
use crate::retry::RetryPolicy;

enum BatchOutcome {
    Done,
    DatasetMissing,
}

pub struct DatasetAttacher<C: CatalogConnector> {
    connector: C,
    session: C::Session,
    scope: String,
    location: String,
    policy: RetryPolicy,
}

impl<C: CatalogConnector> DatasetAttacher<C> {
    pub fn new(
        connector: C,
        scope: impl Into<String>,
        location: impl Into<String>,
        policy: RetryPolicy,
    ) -> Result<Self, RegError> {
        let session = connector.connect()?;
        Ok(Self {
            connector,
            session,
            scope: scope.into(),
            location: location.into(),
            policy,
        })
    }

    pub fn attach_batch(
        &mut self,
        dataset_id: &str,
        identifiers: &[ResourceIdentifier],
    ) -> Result<(), RegError> {
        match self.attach_with_retries(dataset_id, identifiers)? {
            BatchOutcome::Done => Ok(()),
            BatchOutcome::DatasetMissing => {
                info!(dataset_id, "dataset not found, creating it");
                self.create_dataset(dataset_id)?;
                // One retry after creation; a second not-found means the
                // dataset reference itself is broken and must surface.
                match self.attach_with_retries(dataset_id, identifiers)? {
                    BatchOutcome::Done => Ok(()),
                    BatchOutcome::DatasetMissing => {
                        Err(RegError::DatasetMissing(dataset_id.to_string()))
                    }
                }
            }
        }
    }

    fn attach_with_retries(
        &mut self,
        dataset_id: &str,
        identifiers: &[ResourceIdentifier],
    ) -> Result<BatchOutcome, RegError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self
                .session
                .attach_items(&self.scope, dataset_id, identifiers, &self.location)
            {
                Ok(AttachReply::Attached) => {
                    debug!(dataset_id, count = identifiers.len(), "batch attached");
                    return Ok(BatchOutcome::Done);
                }
                Ok(AttachReply::ItemAlreadyAttached) => {
                    // The batch reply does not say which item collided.
                    debug!(dataset_id, "batch has an already-attached item, retrying per item");
                    self.attach_each(dataset_id, identifiers)?;
                    return Ok(BatchOutcome::Done);
                }
                Ok(AttachReply::DatasetNotFound) => return Ok(BatchOutcome::DatasetMissing),
                Err(RegError::CatalogTransient(reason))
                    if attempt < self.policy.max_attempts =>
                {
                    debug!(%reason, attempt, dataset_id, "attach_items failed");
                    self.policy.wait("attach_items", attempt);
                    self.session = self.connector.connect()?;
                }
                Err(RegError::CatalogTransient(_)) => {
                    return Err(RegError::RetriesExhausted {
                        operation: "attach_items",
                        attempts: attempt,
                    });
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn attach_each(
        &mut self,
        dataset_id: &str,
        identifiers: &[ResourceIdentifier],
    ) -> Result<(), RegError> {
        for identifier in identifiers {
            self.attach_one(dataset_id, identifier)?;
        }
        Ok(())
    }

    fn attach_one(
        &mut self,
        dataset_id: &str,
        identifier: &ResourceIdentifier,
    ) -> Result<(), RegError> {
        let item = std::slice::from_ref(identifier);
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self
                .session
                .attach_items(&self.scope, dataset_id, item, &self.location)
            {
                Ok(AttachReply::Attached) => return Ok(()),
                Ok(AttachReply::ItemAlreadyAttached) => {
                    debug!(
                        dataset_id,
                        logical_name = %identifier.logical_name,
                        "already attached"
                    );
                    return Ok(());
                }
                // The dataset existed moments ago; treat disappearance as fatal.
                Ok(AttachReply::DatasetNotFound) => {
                    return Err(RegError::DatasetMissing(dataset_id.to_string()));
                }
                Err(RegError::CatalogTransient(reason))
                    if attempt < self.policy.max_attempts =>
                {
                    debug!(%reason, attempt, dataset_id, "attach_item failed");
                    self.policy.wait("attach_item", attempt);
                    self.session = self.connector.connect()?;
                }
                Err(RegError::CatalogTransient(_)) => {
                    return Err(RegError::RetriesExhausted {
                        operation: "attach_item",
                        attempts: attempt,
                    });
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn create_dataset(&mut self, dataset_id: &str) -> Result<(), RegError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.session.create_dataset(
                &self.scope,
                dataset_id,
                DatasetStatus::monotonic(),
                &self.location,
            ) {
                Ok(CreateDatasetReply::Created) => {
                    info!(dataset_id, "created dataset");
                    return Ok(());
                }
                Ok(CreateDatasetReply::AlreadyExists) => {
                    // Another registrar won the creation race.
                    debug!(dataset_id, "dataset already exists");
                    return Ok(());
                }
                Err(RegError::CatalogTransient(reason))
                    if attempt < self.policy.max_attempts =>
                {
                    debug!(%reason, attempt, dataset_id, "create_dataset failed");
                    self.policy.wait("create_dataset", attempt);
                    self.session = self.connector.connect()?;
                }
                Err(RegError::CatalogTransient(_)) => {
                    return Err(RegError::RetriesExhausted {
                        operation: "create_dataset",
                        attempts: attempt,
                    });
                }
                Err(err) => return Err(err),
            }
        }
    }
}
