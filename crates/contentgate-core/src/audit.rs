//! Audit log entries.
//!
//! Every access attempt produces exactly one entry, whether it was served or
//! denied. Entries are append-only.

use serde::{Deserialize, Serialize};

use crate::format::OutputFormat;
use crate::types::{ContentHash, PrincipalId};

/// Kind of access that was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessType {
    /// A view that counts against the grant.
    View,
    /// A metadata preview that does not consume a view.
    Preview,
}

/// One recorded access attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub content_hash: ContentHash,
    pub accessor: PrincipalId,
    pub access_type: AccessType,
    /// Unix milliseconds.
    pub timestamp: i64,
    pub output_format: OutputFormat,
    pub success: bool,
    /// Denial reason for failed attempts.
    pub error: Option<String>,
}

impl AuditLogEntry {
    /// Entry for a served request.
    pub fn served(
        content_hash: ContentHash,
        accessor: PrincipalId,
        access_type: AccessType,
        output_format: OutputFormat,
        timestamp: i64,
    ) -> Self {
        Self {
            content_hash,
            accessor,
            access_type,
            timestamp,
            output_format,
            success: true,
            error: None,
        }
    }

    /// Entry for a denied request.
    pub fn denied(
        content_hash: ContentHash,
        accessor: PrincipalId,
        access_type: AccessType,
        output_format: OutputFormat,
        timestamp: i64,
        error: impl Into<String>,
    ) -> Self {
        Self {
            content_hash,
            accessor,
            access_type,
            timestamp,
            output_format,
            success: false,
            error: Some(error.into()),
        }
    }
}
