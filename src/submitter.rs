use tracing::debug;

use crate::catalog::{CatalogConnector, CatalogSession};
use crate::domain::ResourceIdentifier;
use crate::error::RegError;
use crate::retry::RetryPolicy;

pub struct ReplicaSubmitter<C: CatalogConnector> {
    connector: C,
    session: C::Session,
    location: String,
    policy: RetryPolicy,
}

impl<C: CatalogConnector> ReplicaSubmitter<C> {
    pub fn new(
        connector: C,
        location: impl Into<String>,
        policy: RetryPolicy,
    ) -> Result<Self, RegError> {
        let session = connector.connect()?;
        Ok(Self {
            connector,
            session,
            location: location.into(),
            policy,
        })
    }

    pub fn submit(&mut self, identifiers: &[ResourceIdentifier]) -> Result<(), RegError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.session.create_replicas(&self.location, identifiers) {
                Ok(()) => {
                    debug!(
                        count = identifiers.len(),
                        location = %self.location,
                        "replicas created"
                    );
                    return Ok(());
                }
                Err(RegError::CatalogTransient(reason))
                    if attempt < self.policy.max_attempts =>
                {
                    debug!(%reason, attempt, "create_replicas failed");
                    self.policy.wait("create_replicas", attempt);
                    self.session = self.connector.connect()?;
                }
                Err(RegError::CatalogTransient(_)) => {
                    return Err(RegError::RetriesExhausted {
                        operation: "create_replicas",
                        attempts: attempt,
                    });
                }
                Err(err) => return Err(err),
            }
        }
    }
}
