//! Structured renderings of content metadata.
//!
//! Every structured format is a pure function of the [`ContentReference`];
//! nothing here touches the stored object.

use std::fmt::Write as _;

use serde::Serialize;
use thiserror::Error;

use contentgate_core::{
    AgreementId, ContentHash, ContentReference, ContentType, EncryptionType, OutputFormat,
    PrincipalId, StorageNetwork,
};

/// Errors from [`render`].
#[derive(Debug, Error)]
pub enum RenderError {
    /// Binary formats are produced by a fetcher, not rendered.
    #[error("{0} is not a structured format")]
    NotStructured(OutputFormat),

    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSON shape of a content reference.
#[derive(Serialize)]
struct MetadataDocument<'a> {
    content_hash: &'a ContentHash,
    content_type: String,
    size_bytes: u64,
    size: String,
    storage_network: &'a StorageNetwork,
    locator: String,
    encrypted: bool,
    encryption_type: Option<&'a EncryptionType>,
    owner: &'a PrincipalId,
    registered_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    linked_asset: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    linked_agreement: Option<&'a AgreementId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description_hash: Option<&'a ContentHash>,
}

impl<'a> MetadataDocument<'a> {
    fn new(content: &'a ContentReference) -> Self {
        Self {
            content_hash: &content.content_hash,
            content_type: content.content_type.to_string(),
            size_bytes: content.size_bytes,
            size: human_size(content.size_bytes),
            storage_network: &content.storage_network,
            locator: content.locator(),
            encrypted: content.encrypted,
            encryption_type: content.encryption_type.as_ref(),
            owner: &content.owner,
            registered_at: content.registered_at,
            linked_asset: content.linked_asset.as_deref(),
            linked_agreement: content.linked_agreement.as_ref(),
            description_hash: content.description_hash.as_ref(),
        }
    }
}

/// Render `content` in a structured `format`.
pub fn render(content: &ContentReference, format: OutputFormat) -> Result<String, RenderError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&MetadataDocument::new(content))?),
        OutputFormat::Markdown => Ok(markdown(content)),
        OutputFormat::PlainText => Ok(plain_text(content)),
        OutputFormat::Summary => Ok(summary(content)),
        other => Err(RenderError::NotStructured(other)),
    }
}

/// Label/value pairs shared by the tabular formats.
fn fields(content: &ContentReference) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Content hash", content.content_hash.to_string()),
        ("Type", content.content_type.to_string()),
        (
            "Size",
            format!("{} ({} bytes)", human_size(content.size_bytes), content.size_bytes),
        ),
        ("Storage", content.storage_network.to_string()),
        ("Locator", content.locator()),
        ("Encryption", encryption_label(content)),
        ("Owner", content.owner.to_string()),
        ("Registered at", content.registered_at.to_string()),
    ];
    if let Some(asset) = &content.linked_asset {
        rows.push(("Linked asset", asset.clone()));
    }
    if let Some(agreement) = &content.linked_agreement {
        rows.push(("Linked agreement", agreement.to_string()));
    }
    if let Some(description) = &content.description_hash {
        rows.push(("Description", description.to_string()));
    }
    rows
}

fn markdown(content: &ContentReference) -> String {
    let mut out = format!("# {}\n\n| Field | Value |\n|---|---|\n", title(&content.content_type));
    for (label, value) in fields(content) {
        // Writing to a String cannot fail.
        let _ = writeln!(out, "| {label} | {} |", value.replace('|', "\\|"));
    }
    out
}

fn plain_text(content: &ContentReference) -> String {
    let mut out = String::new();
    for (label, value) in fields(content) {
        let _ = writeln!(out, "{label}: {value}");
    }
    out
}

fn summary(content: &ContentReference) -> String {
    let protection = match &content.encryption_type {
        Some(scheme) if content.encrypted => format!("encrypted with {scheme}"),
        _ if content.encrypted => "encrypted".to_string(),
        _ => "unencrypted".to_string(),
    };
    format!(
        "{} of {} stored on {}, {}, owned by {}.",
        title(&content.content_type),
        human_size(content.size_bytes),
        content.storage_network,
        protection,
        content.owner
    )
}

fn title(content_type: &ContentType) -> String {
    match content_type {
        ContentType::Custom(name) => format!("{name} content"),
        other => other.to_string(),
    }
}

fn encryption_label(content: &ContentReference) -> String {
    match (&content.encryption_type, content.encrypted) {
        (Some(scheme), true) => scheme.to_string(),
        (None, true) => "encrypted".to_string(),
        _ => "none".to_string(),
    }
}

/// Decimal units, one fractional digit above a kilobyte.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1000 {
        return format!("{bytes} bytes");
    }
    let mut value = bytes as f64 / 1000.0;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
