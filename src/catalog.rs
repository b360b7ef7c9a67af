use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;
use tracing::debug;

use crate::domain::{DatasetStatus, ResourceIdentifier};
use crate::error::RegError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateDatasetReply {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachReply {
    Attached,
    ItemAlreadyAttached,
    DatasetNotFound,
}

pub trait CatalogSession: Send + Sync {
    fn create_replicas(
        &self,
        location: &str,
        identifiers: &[ResourceIdentifier],
    ) -> Result<(), RegError>;

    fn create_dataset(
        &self,
        scope: &str,
        name: &str,
        status: DatasetStatus,
        location: &str,
    ) -> Result<CreateDatasetReply, RegError>;

    fn attach_items(
        &self,
        scope: &str,
        name: &str,
        identifiers: &[ResourceIdentifier],
        location: &str,
    ) -> Result<AttachReply, RegError>;
}

// Retry loops discard a session after a failed attempt and connect a fresh one.
pub trait CatalogConnector: Send + Sync {
    type Session: CatalogSession;

    fn connect(&self) -> Result<Self::Session, RegError>;
}

#[derive(Debug, Clone)]
pub struct RestCatalogConnector {
    base_url: String,
}

impl RestCatalogConnector {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }
}

impl CatalogConnector for RestCatalogConnector {
    type Session = RestCatalogSession;

    fn connect(&self) -> Result<RestCatalogSession, RegError> {
        RestCatalogSession::new(self.base_url.clone())
    }
}

pub struct RestCatalogSession {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct ReplicaRequest<'a> {
    files: &'a [ResourceIdentifier],
}

#[derive(Serialize)]
struct DatasetRequest<'a> {
    statuses: DatasetStatus,
    location: &'a str,
}

#[derive(Serialize)]
struct AttachRequest<'a> {
    items: &'a [ResourceIdentifier],
    location: &'a str,
}

impl RestCatalogSession {
    fn new(base_url: String) -> Result<Self, RegError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("replica-reg/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| RegError::CatalogTransient(err.to_string()))?,
        );

        if let Ok(token) = std::env::var("REPLICA_REG_TOKEN") {
            if !token.trim().is_empty() {
                headers.insert(
                    AUTHORIZATION,
                    HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                        .map_err(|err| RegError::CatalogTransient(err.to_string()))?,
                );
            }
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| RegError::CatalogTransient(err.to_string()))?;

        Ok(Self { client, base_url })
    }

    fn post<T: Serialize>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<reqwest::blocking::Response, RegError> {
        self.client
            .post(url)
            .json(body)
            .send()
            .map_err(|err| RegError::CatalogTransient(err.to_string()))
    }
}

impl CatalogSession for RestCatalogSession {
    fn create_replicas(
        &self,
        location: &str,
        identifiers: &[ResourceIdentifier],
    ) -> Result<(), RegError> {
        let url = format!("{}/replicas/{}", self.base_url, location);
        let response = self.post(&url, &ReplicaRequest { files: identifiers })?;
        match response.status().as_u16() {
            200..=299 => Ok(()),
            // Re-submitting an already-created replica is not an error.
            409 => {
                debug!(location, "replicas already present");
                Ok(())
            }
            _ => Err(status_error(response)),
        }
    }

    fn create_dataset(
        &self,
        scope: &str,
        name: &str,
        status: DatasetStatus,
        location: &str,
    ) -> Result<CreateDatasetReply, RegError> {
        let url = format!("{}/datasets/{}/{}", self.base_url, scope, name);
        let response = self.post(
            &url,
            &DatasetRequest {
                statuses: status,
                location,
            },
        )?;
        match response.status().as_u16() {
            200..=299 => Ok(CreateDatasetReply::Created),
            409 => Ok(CreateDatasetReply::AlreadyExists),
            _ => Err(status_error(response)),
        }
    }

    fn attach_items(
        &self,
        scope: &str,
        name: &str,
        identifiers: &[ResourceIdentifier],
        location: &str,
    ) -> Result<AttachReply, RegError> {
        let url = format!("{}/datasets/{}/{}/items", self.base_url, scope, name);
        let response = self.post(
            &url,
            &AttachRequest {
                items: identifiers,
                location,
            },
        )?;
        match response.status().as_u16() {
            200..=299 => Ok(AttachReply::Attached),
            409 => Ok(AttachReply::ItemAlreadyAttached),
            404 => Ok(AttachReply::DatasetNotFound),
            _ => Err(status_error(response)),
        }
    }
}

fn status_error(response: reqwest::blocking::Response) -> RegError {
    let status = response.status().as_u16();
    let message = response
        .text()
        .unwrap_or_else(|_| "catalog request failed".to_string());
    if is_transient_status(status) {
        RegError::CatalogTransient(format!("status {status}: {message}"))
    } else {
        RegError::CatalogStatus { status, message }
    }
}

fn is_transient_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}
