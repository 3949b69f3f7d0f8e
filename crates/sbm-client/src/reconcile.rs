//! Idempotent state enforcement for SBM records.
//!
//! `ensure_present` and `ensure_absent` compare what the server holds with
//! what the caller wants and only write when they differ. In check mode the
//! comparison runs but no write is sent; the outcome reports what would
//! have changed.

use sbm_common::{ApiError, Resource, ResourceKind};
use thiserror::Error;
use tracing::{debug, info};

use crate::client::ResourceClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub changed: bool,
    pub message: String,
}

impl Outcome {
    fn changed(message: String) -> Self {
        Self { changed: true, message }
    }

    fn unchanged(message: String) -> Self {
        Self { changed: false, message }
    }
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The write was accepted but the server does not report the expected
    /// state afterwards.
    #[error("{kind} '{key}': {reason}")]
    Verification {
        kind: ResourceKind,
        key: String,
        reason: String,
    },
}

pub async fn ensure_present<R: Resource>(
    client: &ResourceClient,
    desired: &R,
    check: bool,
) -> Result<Outcome, ReconcileError> {
    let kind = R::KIND;
    let key = desired.key();
    let existing = client.list(kind).await?;

    if existing.iter().any(|k| k == key) {
        let current: R = client.get(key).await?;
        if desired.same_definition(&current) {
            debug!("{} '{}' already matches", kind, key);
            return Ok(Outcome::unchanged(format!("Successfully confirmed {} '{}'", kind, key)));
        }
        if check {
            return Ok(Outcome::changed(format!("Would update {} '{}'", kind, key)));
        }
        let reported = client.update(desired).await?;
        if !desired.same_definition(&reported) {
            return Err(verification(kind, key, "updated data not as expected"));
        }
        info!("Updated {} '{}'", kind, key);
        return Ok(Outcome::changed(format!("Successfully updated {} '{}'", kind, key)));
    }

    if check {
        return Ok(Outcome::changed(format!("Would add {} '{}'", kind, key)));
    }
    let keys = client.create(desired).await?;
    if !keys.iter().any(|k| k == key) {
        return Err(verification(kind, key, "missing from the collection after adding"));
    }
    let reported: R = client.get(key).await?;
    if !desired.same_definition(&reported) {
        return Err(verification(kind, key, "added data not as expected"));
    }
    info!("Added {} '{}'", kind, key);
    Ok(Outcome::changed(format!("Successfully added {} '{}'", kind, key)))
}

pub async fn ensure_absent(
    client: &ResourceClient,
    kind: ResourceKind,
    key: &str,
    check: bool,
) -> Result<Outcome, ReconcileError> {
    let existing = client.list(kind).await?;
    if !existing.iter().any(|k| k == key) {
        return Ok(Outcome::unchanged(format!("{} '{}' is already absent", kind, key)));
    }
    if check {
        return Ok(Outcome::changed(format!("Would remove {} '{}'", kind, key)));
    }
    client.delete(kind, key).await?;
    info!("Removed {} '{}'", kind, key);
    Ok(Outcome::changed(format!("Successfully removed {} '{}'", kind, key)))
}

fn verification(kind: ResourceKind, key: &str, reason: &str) -> ReconcileError {
    ReconcileError::Verification {
        kind,
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
