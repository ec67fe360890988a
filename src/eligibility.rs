//! Eligibility resolution: who gets a certificate, and under which name.
//!
//! Public events accept any free-text name verbatim (trimmed). Restricted
//! events require an identifier registered on the event; the printed name is
//! the participant's `display_name`, never the submitted token. Lookups go
//! through the [`ParticipantDirectory`] trait so the record-management layer
//! stays an external collaborator; [`RosterDirectory`] is a JSON-roster
//! implementation for the CLI and tests.
//!
//! A lookup miss and a lookup-backend failure produce the same
//! [`EligibilityError::NotEligible`] on purpose: the rejection must not
//! leak whether an identifier is unregistered or the backend is down. The
//! cause is still logged. Resolution never caches: the roster may change
//! between attempts, so every submission re-runs the lookup.

use crate::config::{AccessMode, EventConfig};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Placeholder subject printed by organizer previews before anyone registers.
pub const SAMPLE_SUBJECT_NAME: &str = "Sample Participant Name";

/// A verified subject name, ready to composite.
///
/// Only the resolvers (and [`SubjectName::sample`] for previews) construct
/// these, so a `RenderRequest` always carries an eligibility-checked name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectName(String);

impl SubjectName {
    /// The organizer-preview placeholder name.
    pub fn sample() -> Self {
        SubjectName(SAMPLE_SUBJECT_NAME.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EligibilityError {
    /// The single user-facing rejection for every eligibility failure:
    /// unregistered identifier, lookup-backend error, or empty input.
    #[error("not eligible for a certificate on this event")]
    NotEligible,
}

/// Failure inside a directory backend. Collapsed into
/// [`EligibilityError::NotEligible`] before reaching users; the message only
/// ever lands in logs.
#[derive(Error, Debug)]
#[error("participant directory unavailable: {0}")]
pub struct DirectoryError(pub String);

/// A participant registered on an event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Participant {
    /// Unique per event; what requesters submit in restricted mode.
    pub identifier: String,
    /// The name printed on the certificate.
    pub display_name: String,
}

/// External participant lookup, keyed on `(event_id, identifier)`.
///
/// `Ok(None)` means the identifier is not registered; `Err` means the
/// backend itself failed. Callers treat both as ineligibility.
#[allow(async_fn_in_trait)]
pub trait ParticipantDirectory {
    async fn find(
        &self,
        event_id: &str,
        identifier: &str,
    ) -> Result<Option<Participant>, DirectoryError>;
}

/// Resolve the subject name for a submission under the event's access mode.
pub async fn resolve_subject(
    directory: &impl ParticipantDirectory,
    config: &EventConfig,
    submitted: &str,
) -> Result<SubjectName, EligibilityError> {
    match config.mode {
        AccessMode::Public => resolve_public(submitted),
        AccessMode::Restricted => resolve_restricted(directory, &config.event_id, submitted).await,
    }
}

/// Public mode: the trimmed input is the subject name.
pub fn resolve_public(submitted: &str) -> Result<SubjectName, EligibilityError> {
    let trimmed = submitted.trim();
    if trimmed.is_empty() {
        warn!("empty subject name submitted");
        return Err(EligibilityError::NotEligible);
    }
    Ok(SubjectName(trimmed.to_string()))
}

/// Restricted mode: look the identifier up on the event.
///
/// Runs a fresh lookup on every call; nothing is cached across attempts.
pub async fn resolve_restricted(
    directory: &impl ParticipantDirectory,
    event_id: &str,
    identifier: &str,
) -> Result<SubjectName, EligibilityError> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        warn!(event_id, "empty identifier submitted");
        return Err(EligibilityError::NotEligible);
    }
    match directory.find(event_id, identifier).await {
        Ok(Some(participant)) => {
            debug!(event_id, "participant verified");
            Ok(SubjectName(participant.display_name))
        }
        Ok(None) => {
            // Same user-facing rejection as the error arm; only the log differs
            warn!(event_id, "identifier not registered on event");
            Err(EligibilityError::NotEligible)
        }
        Err(error) => {
            warn!(event_id, %error, "participant lookup failed");
            Err(EligibilityError::NotEligible)
        }
    }
}

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("roster parse error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct RosterFile {
    event_id: String,
    participants: Vec<Participant>,
}

/// Participant directory backed by a JSON roster document:
///
/// ```json
/// {
///   "event_id": "spring-hackathon-2025",
///   "participants": [
///     { "identifier": "9998887776", "display_name": "Asha Rao" }
///   ]
/// }
/// ```
///
/// Lookups for a different event id answer `Ok(None)`, like any directory
/// that has no matching registration.
pub struct RosterDirectory {
    event_id: String,
    participants: Vec<Participant>,
}

impl RosterDirectory {
    pub fn from_json(json: &str) -> Result<Self, RosterError> {
        let file: RosterFile = serde_json::from_str(json)?;
        Ok(RosterDirectory {
            event_id: file.event_id,
            participants: file.participants,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, RosterError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// The event this roster belongs to; drivers can warn on mismatches.
    pub fn event_id(&self) -> &str {
        &self.event_id
    }
}

impl ParticipantDirectory for RosterDirectory {
    async fn find(
        &self,
        event_id: &str,
        identifier: &str,
    ) -> Result<Option<Participant>, DirectoryError> {
        if event_id != self.event_id {
            return Ok(None);
        }
        Ok(self
            .participants
            .iter()
            .find(|p| p.identifier == identifier)
            .cloned())
    }
}
