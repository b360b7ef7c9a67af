use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::RegError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ProducerKind {
    DataProduct,
    RawFile,
    ZipFile,
    DimensionFile,
}

impl fmt::Display for ProducerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProducerKind::DataProduct => write!(f, "data_product"),
            ProducerKind::RawFile => write!(f, "raw_file"),
            ProducerKind::ZipFile => write!(f, "zip_file"),
            ProducerKind::DimensionFile => write!(f, "dimension_file"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Md5Digest(String);

impl Md5Digest {
    pub fn from_digest(digest: [u8; 16]) -> Self {
        let mut hex = String::with_capacity(32);
        for byte in digest {
            hex.push_str(&format!("{byte:02x}"));
        }
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Md5Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Md5Digest {
    type Err = RegError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        let is_valid =
            normalized.len() == 32 && normalized.chars().all(|ch| ch.is_ascii_hexdigit());
        if !is_valid {
            return Err(RegError::InvalidMd5(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Adler32Digest(String);

impl Adler32Digest {
    pub fn from_value(value: u32) -> Self {
        Self(format!("{value:08x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Adler32Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Adler32Digest {
    type Err = RegError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        let is_valid =
            normalized.len() == 8 && normalized.chars().all(|ch| ch.is_ascii_hexdigit());
        if !is_valid {
            return Err(RegError::InvalidAdler32(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub producer_type: ProducerKind,
    #[serde(default)]
    pub sidecar_payload: String,
}

impl MetadataRecord {
    pub fn new(producer_type: ProducerKind, sidecar: Option<&str>) -> Self {
        Self {
            producer_type,
            sidecar_payload: sidecar.unwrap_or_default().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    pub physical_name: String,
    pub logical_name: String,
    pub size_bytes: u64,
    pub checksum_md5: Md5Digest,
    pub checksum_adler32: Adler32Digest,
    pub scope: String,
    pub metadata: MetadataRecord,
}

#[derive(Debug, Clone)]
pub struct Bundle {
    pub dataset_id: String,
    pub identifier: ResourceIdentifier,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DatasetStatus {
    pub monotonic: bool,
}

impl DatasetStatus {
    pub fn monotonic() -> Self {
        Self { monotonic: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceRef {
    #[serde(default)]
    pub dataset: Option<String>,
    pub path: String,
    #[serde(default)]
    pub sidecar: Option<String>,
}

impl SourceRef {
    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            dataset: None,
            path: path.into(),
            sidecar: None,
        }
    }
}
