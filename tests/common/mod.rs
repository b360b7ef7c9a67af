#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use replica_registrar::catalog::{
    AttachReply, CatalogConnector, CatalogSession, CreateDatasetReply,
};
use replica_registrar::domain::{
    DatasetStatus, MetadataRecord, ProducerKind, ResourceIdentifier,
};
use replica_registrar::error::RegError;
use replica_registrar::retry::RetryPolicy;

#[derive(Default)]
pub struct ScriptState {
    pub replica_replies: Mutex<VecDeque<Result<(), RegError>>>,
    pub create_replies: Mutex<VecDeque<Result<CreateDatasetReply, RegError>>>,
    pub attach_replies: Mutex<VecDeque<Result<AttachReply, RegError>>>,
    pub calls: Mutex<Vec<String>>,
    pub connects: Mutex<usize>,
}

impl ScriptState {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn connects(&self) -> usize {
        *self.connects.lock().unwrap()
    }

    pub fn script_attach(&self, replies: Vec<Result<AttachReply, RegError>>) {
        self.attach_replies.lock().unwrap().extend(replies);
    }

    pub fn script_create(&self, replies: Vec<Result<CreateDatasetReply, RegError>>) {
        self.create_replies.lock().unwrap().extend(replies);
    }

    pub fn script_replicas(&self, replies: Vec<Result<(), RegError>>) {
        self.replica_replies.lock().unwrap().extend(replies);
    }
}

#[derive(Clone, Default)]
pub struct ScriptedConnector {
    pub state: Arc<ScriptState>,
}

pub struct ScriptedSession {
    state: Arc<ScriptState>,
}

impl CatalogConnector for ScriptedConnector {
    type Session = ScriptedSession;

    fn connect(&self) -> Result<ScriptedSession, RegError> {
        *self.state.connects.lock().unwrap() += 1;
        Ok(ScriptedSession {
            state: Arc::clone(&self.state),
        })
    }
}

impl CatalogSession for ScriptedSession {
    fn create_replicas(
        &self,
        location: &str,
        identifiers: &[ResourceIdentifier],
    ) -> Result<(), RegError> {
        self.state
            .calls
            .lock()
            .unwrap()
            .push(format!("replicas:{location}:{}", identifiers.len()));
        self.state
            .replica_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    fn create_dataset(
        &self,
        scope: &str,
        name: &str,
        _status: DatasetStatus,
        _location: &str,
    ) -> Result<CreateDatasetReply, RegError> {
        self.state
            .calls
            .lock()
            .unwrap()
            .push(format!("create:{scope}:{name}"));
        self.state
            .create_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(CreateDatasetReply::Created))
    }

    fn attach_items(
        &self,
        _scope: &str,
        name: &str,
        identifiers: &[ResourceIdentifier],
        _location: &str,
    ) -> Result<AttachReply, RegError> {
        self.state
            .calls
            .lock()
            .unwrap()
            .push(format!("attach:{name}:{}", identifiers.len()));
        self.state
            .attach_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(AttachReply::Attached))
    }
}

pub fn identifier(name: &str) -> ResourceIdentifier {
    ResourceIdentifier {
        physical_name: format!("root://xrd1:1094//rucio/test/{name}"),
        logical_name: name.to_string(),
        size_bytes: 1024,
        checksum_md5: "a7ee5c19f5717bcf8d772de202864244".parse().unwrap(),
        checksum_adler32: "480be4de".parse().unwrap(),
        scope: "test".to_string(),
        metadata: MetadataRecord::new(ProducerKind::DataProduct, None),
    }
}

pub fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(max_attempts, Duration::ZERO, Duration::ZERO)
}
