//! # Properties: the completion record for one electron.
//!
//! [`Properties`] captures what happened to an electron: which atom kind ran
//! it, when processing started and ended, and either a result or an error.
//! The dispatcher hands the record to `Conductor::complete`, which forwards
//! it to the original requester.
//!
//! ## Wire format
//!
//! JSON object with keys `electronid`, `atomid`, `start` and `end` (RFC 3339
//! UTC), `error` (string or null), and `result` (base64 or null). The typed
//! [`ElectronError`] collapses to its display form on the wire and decodes
//! back as a generic execution failure.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ElectronError;

/// Outcome of one electron execution.
///
/// Invariants: `end >= start`; exactly one of `error` / `result` is
/// meaningfully populated on success, and on failure `error` is populated
/// while `result` may be absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Properties {
    /// Identity of the electron this record describes.
    pub electron_id: String,
    /// Atom kind that ran (or was asked to run) the electron.
    pub atom_id: String,
    /// When processing began (UTC).
    pub start: DateTime<Utc>,
    /// When processing ended (UTC).
    pub end: DateTime<Utc>,
    /// Failure, when the electron did not complete cleanly.
    pub error: Option<ElectronError>,
    /// Result bytes produced by the atom.
    pub result: Option<Vec<u8>>,
}

impl Properties {
    /// Opens a record at the moment processing begins: `start` is captured
    /// now, `end` mirrors `start` until [`finish`](Self::finish) is called.
    pub fn open(electron_id: impl Into<String>, atom_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            electron_id: electron_id.into(),
            atom_id: atom_id.into(),
            start: now,
            end: now,
            error: None,
            result: None,
        }
    }

    /// Builds an already-closed failure record with `start == end`.
    ///
    /// Used for electrons that never reach execution (validation failures).
    pub fn failure(
        electron_id: impl Into<String>,
        atom_id: impl Into<String>,
        error: ElectronError,
    ) -> Self {
        let mut props = Self::open(electron_id, atom_id);
        props.error = Some(error);
        props
    }

    /// Closes the record with the execution outcome, stamping `end`.
    pub fn finish(&mut self, outcome: Result<Vec<u8>, ElectronError>) {
        self.end = Utc::now();
        match outcome {
            Ok(result) => self.result = Some(result),
            Err(error) => self.error = Some(error),
        }
    }

    /// Processing time visible to the calling system.
    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}

#[derive(Serialize)]
struct WireOut<'a> {
    electronid: &'a str,
    atomid: &'a str,
    start: &'a DateTime<Utc>,
    end: &'a DateTime<Utc>,
    error: Option<String>,
    result: Option<String>,
}

#[derive(Deserialize)]
struct WireIn {
    electronid: String,
    atomid: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    result: Option<String>,
}

impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireOut {
            electronid: &self.electron_id,
            atomid: &self.atom_id,
            start: &self.start,
            end: &self.end,
            error: self.error.as_ref().map(ToString::to_string),
            result: self.result.as_deref().map(|r| STANDARD.encode(r)),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Properties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireIn::deserialize(deserializer)?;
        Ok(Properties {
            electron_id: wire.electronid,
            atom_id: wire.atomid,
            start: wire.start,
            end: wire.end,
            error: wire.error.map(|reason| ElectronError::Fail { reason }),
            result: wire
                .result
                .map(|r| STANDARD.decode(r).map_err(D::Error::custom))
                .transpose()?,
        })
    }
}
