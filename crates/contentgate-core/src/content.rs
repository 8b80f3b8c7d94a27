//! Content references: metadata for off-chain objects.
//!
//! A [`ContentReference`] is created once at registration and never mutated
//! or deleted afterwards. The content hash is its unique key.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{AgreementId, ContentHash, PrincipalId};

/// Kind of content behind a reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    Document,
    Image,
    Video,
    Audio,
    Data,
    Model3D,
    Certificate,
    Evidence,
    Medical,
    Financial,
    Legal,
    Identity,
    /// Application-defined type.
    Custom(String),
}

impl ContentType {
    /// Whether this type is a paged document that can be rendered to PDF.
    pub fn is_document_like(&self) -> bool {
        matches!(
            self,
            ContentType::Document
                | ContentType::Certificate
                | ContentType::Evidence
                | ContentType::Medical
                | ContentType::Financial
                | ContentType::Legal
                | ContentType::Identity
        )
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentType::Document => f.write_str("Document"),
            ContentType::Image => f.write_str("Image"),
            ContentType::Video => f.write_str("Video"),
            ContentType::Audio => f.write_str("Audio"),
            ContentType::Data => f.write_str("Data"),
            ContentType::Model3D => f.write_str("3D model"),
            ContentType::Certificate => f.write_str("Certificate"),
            ContentType::Evidence => f.write_str("Evidence"),
            ContentType::Medical => f.write_str("Medical"),
            ContentType::Financial => f.write_str("Financial"),
            ContentType::Legal => f.write_str("Legal"),
            ContentType::Identity => f.write_str("Identity"),
            ContentType::Custom(name) => f.write_str(name),
        }
    }
}

/// Where the underlying object is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageNetwork {
    Ipfs,
    Arweave,
    Filecoin,
    Private,
}

impl StorageNetwork {
    /// Render the locator the storage collaborator resolves.
    pub fn locator(&self, hash: &ContentHash) -> String {
        match self {
            StorageNetwork::Ipfs => format!("ipfs://{hash}"),
            StorageNetwork::Arweave => format!("ar://{hash}"),
            StorageNetwork::Filecoin => format!("filecoin://{hash}"),
            StorageNetwork::Private => format!("private://{hash}"),
        }
    }
}

impl fmt::Display for StorageNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageNetwork::Ipfs => f.write_str("IPFS"),
            StorageNetwork::Arweave => f.write_str("Arweave"),
            StorageNetwork::Filecoin => f.write_str("Filecoin"),
            StorageNetwork::Private => f.write_str("private storage"),
        }
    }
}

/// Encryption scheme applied to the stored object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncryptionType {
    ChaCha20Poly1305,
    Aes256Gcm,
    Other(String),
}

impl fmt::Display for EncryptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncryptionType::ChaCha20Poly1305 => f.write_str("ChaCha20-Poly1305"),
            EncryptionType::Aes256Gcm => f.write_str("AES-256-GCM"),
            EncryptionType::Other(name) => f.write_str(name),
        }
    }
}

/// Registered metadata for one off-chain object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentReference {
    /// Unique, immutable key.
    pub content_hash: ContentHash,

    pub content_type: ContentType,

    pub size_bytes: u64,

    pub storage_network: StorageNetwork,

    pub encrypted: bool,

    /// Scheme used when `encrypted` is set.
    pub encryption_type: Option<EncryptionType>,

    /// Set at registration, never reassigned.
    pub owner: PrincipalId,

    /// Unix milliseconds.
    pub registered_at: i64,

    /// On-chain asset this content belongs to, if any.
    pub linked_asset: Option<String>,

    pub linked_agreement: Option<AgreementId>,

    /// Hash of a separately stored description.
    pub description_hash: Option<ContentHash>,
}

impl ContentReference {
    /// Locator the storage collaborator resolves for this content.
    pub fn locator(&self) -> String {
        self.storage_network.locator(&self.content_hash)
    }
}

/// Builder for a [`ContentReference`].
///
/// The registration timestamp is filled in by whoever persists it.
#[derive(Debug, Clone)]
pub struct ContentRegistration {
    content_hash: ContentHash,
    content_type: ContentType,
    size_bytes: u64,
    storage_network: StorageNetwork,
    owner: PrincipalId,
    encryption_type: Option<EncryptionType>,
    linked_asset: Option<String>,
    linked_agreement: Option<AgreementId>,
    description_hash: Option<ContentHash>,
}

impl ContentRegistration {
    /// Start a registration for unencrypted content with no links.
    pub fn new(
        content_hash: impl Into<ContentHash>,
        content_type: ContentType,
        size_bytes: u64,
        storage_network: StorageNetwork,
        owner: impl Into<PrincipalId>,
    ) -> Self {
        Self {
            content_hash: content_hash.into(),
            content_type,
            size_bytes,
            storage_network,
            owner: owner.into(),
            encryption_type: None,
            linked_asset: None,
            linked_agreement: None,
            description_hash: None,
        }
    }

    /// Mark the content as encrypted with the given scheme.
    pub fn encrypted(mut self, encryption_type: EncryptionType) -> Self {
        self.encryption_type = Some(encryption_type);
        self
    }

    /// Link the content to an on-chain asset.
    pub fn linked_asset(mut self, asset: impl Into<String>) -> Self {
        self.linked_asset = Some(asset.into());
        self
    }

    /// Link the content to a work agreement.
    pub fn linked_agreement(mut self, agreement: impl Into<AgreementId>) -> Self {
        self.linked_agreement = Some(agreement.into());
        self
    }

    /// Attach the hash of a description document.
    pub fn description_hash(mut self, hash: impl Into<ContentHash>) -> Self {
        self.description_hash = Some(hash.into());
        self
    }

    /// The hash being registered.
    pub fn content_hash(&self) -> &ContentHash {
        &self.content_hash
    }

    /// The owner being registered.
    pub fn owner(&self) -> &PrincipalId {
        &self.owner
    }

    /// Finish the reference, stamping it with the registration time.
    pub fn build(self, registered_at: i64) -> ContentReference {
        ContentReference {
            content_hash: self.content_hash,
            content_type: self.content_type,
            size_bytes: self.size_bytes,
            storage_network: self.storage_network,
            encrypted: self.encryption_type.is_some(),
            encryption_type: self.encryption_type,
            owner: self.owner,
            registered_at,
            linked_asset: self.linked_asset,
            linked_agreement: self.linked_agreement,
            description_hash: self.description_hash,
        }
    }
}
