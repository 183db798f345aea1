//! # Electron: the unit of work carried between conductors and atoms.
//!
//! An [`Electron`] names a target atom kind, carries an opaque payload, and
//! optionally bounds its own execution time. Conductors deliver electrons to
//! the dispatcher; the dispatcher routes them to the matching atom kind.
//!
//! ## Wire format
//!
//! Electrons cross transports as JSON objects with keys `senderid`, `id`,
//! `atomid`, and optionally `payload`, `timeout` (integer nanoseconds),
//! `resp`, and `copystate`. Unknown keys are ignored.
//!
//! The payload is dual-encoded:
//! - On decode, a JSON **string** is treated as standard base64 and decoded
//!   to raw bytes (a malformed base64 string is a decode error); any other
//!   JSON value is preserved verbatim as its raw encoding.
//! - On encode, payload bytes that parse as JSON are embedded verbatim;
//!   anything else is base64-encoded into a JSON string.
//!
//! Payloads whose bytes are themselves a JSON string therefore re-enter the
//! base64 path on decode and do not round-trip; base64-encode such payloads
//! at the producer.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;

/// A unit of work: target atom kind, opaque payload, optional deadline.
///
/// Valid iff `sender_id`, `id`, and `atom_id` are all non-empty; validity is
/// checked on every inbound electron before routing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Electron {
    /// Identity of the conductor the electron originated from.
    pub sender_id: String,
    /// Unique identity of the electron within its sender.
    pub id: String,
    /// Name of the atom kind requested.
    pub atom_id: String,
    /// Opaque payload handed to the atom's process method.
    pub payload: Option<Vec<u8>>,
    /// Execution deadline; `None` or zero means unbounded.
    pub timeout: Option<Duration>,
    /// The requester expects a reply.
    pub resp: bool,
    /// Hint that atom state should be copied forward.
    pub copy_state: bool,
}

impl Electron {
    /// Creates an electron addressed at `atom_id`.
    pub fn new(
        sender_id: impl Into<String>,
        id: impl Into<String>,
        atom_id: impl Into<String>,
    ) -> Self {
        Self {
            sender_id: sender_id.into(),
            id: id.into(),
            atom_id: atom_id.into(),
            ..Self::default()
        }
    }

    /// Attaches a payload.
    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Bounds execution time.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns true when all three identity fields are non-empty.
    pub fn validate(&self) -> bool {
        !self.sender_id.is_empty() && !self.id.is_empty() && !self.atom_id.is_empty()
    }
}

/// Payload as it appears on the wire: raw JSON embedded verbatim, or a
/// base64 string for bytes that are not valid JSON.
#[derive(Serialize)]
#[serde(untagged)]
enum PayloadOut<'a> {
    Raw(&'a RawValue),
    Encoded(String),
}

fn encode_payload(payload: &[u8]) -> PayloadOut<'_> {
    std::str::from_utf8(payload)
        .ok()
        .and_then(|text| serde_json::from_str::<&RawValue>(text).ok())
        .map_or_else(
            || PayloadOut::Encoded(STANDARD.encode(payload)),
            PayloadOut::Raw,
        )
}

#[derive(Serialize)]
struct WireOut<'a> {
    senderid: &'a str,
    id: &'a str,
    atomid: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<PayloadOut<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout: Option<u64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    resp: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    copystate: bool,
}

#[derive(Deserialize)]
struct WireIn {
    senderid: String,
    id: String,
    atomid: String,
    #[serde(default)]
    payload: Option<Box<RawValue>>,
    #[serde(default)]
    timeout: Option<u64>,
    #[serde(default)]
    resp: Option<bool>,
    #[serde(default)]
    copystate: Option<bool>,
}

impl Serialize for Electron {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireOut {
            senderid: &self.sender_id,
            id: &self.id,
            atomid: &self.atom_id,
            payload: self.payload.as_deref().map(encode_payload),
            timeout: self.timeout.map(|d| d.as_nanos() as u64),
            resp: self.resp,
            copystate: self.copy_state,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Electron {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireIn::deserialize(deserializer)?;

        let payload = match wire.payload {
            None => None,
            Some(raw) => {
                let text = raw.get();
                match serde_json::from_str::<String>(text) {
                    Ok(encoded) => Some(STANDARD.decode(encoded).map_err(D::Error::custom)?),
                    Err(_) => Some(text.as_bytes().to_vec()),
                }
            }
        };

        Ok(Electron {
            sender_id: wire.senderid,
            id: wire.id,
            atom_id: wire.atomid,
            payload,
            timeout: wire.timeout.map(Duration::from_nanos),
            resp: wire.resp.unwrap_or(false),
            copy_state: wire.copystate.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAY: &str = r#"{"test":"test"}"#;
    const PAY64: &str = "eyJ0ZXN0IjoidGVzdCJ9";

    fn noop() -> Electron {
        Electron::new("empty", "empty", "empty")
    }

    fn with_raw_payload() -> Electron {
        noop().with_payload(PAY.as_bytes())
    }

    #[test]
    fn marshal() {
        let tests = [
            (
                "valid electron",
                noop(),
                r#"{"senderid":"empty","id":"empty","atomid":"empty"}"#,
            ),
            (
                "valid electron w/ payload",
                with_raw_payload(),
                r#"{"senderid":"empty","id":"empty","atomid":"empty","payload":{"test":"test"}}"#,
            ),
        ];

        for (name, e, expected) in tests {
            let out = serde_json::to_string(&e).unwrap();
            assert_eq!(out, expected, "{name}");
        }
    }

    #[test]
    fn unmarshal() {
        let b64_json =
            format!(r#"{{"senderid":"empty","id":"empty","atomid":"empty","payload":"{PAY64}"}}"#);
        let tests = [
            (
                "valid electron",
                r#"{"senderid":"empty","id":"empty","atomid":"empty"}"#,
                noop(),
            ),
            (
                "valid electron / non-base64 payload",
                r#"{"senderid":"empty","id":"empty","atomid":"empty","payload":{"test":"test"}}"#,
                with_raw_payload(),
            ),
            (
                "valid electron / base64 payload",
                b64_json.as_str(),
                with_raw_payload(),
            ),
        ];

        for (name, json, expected) in tests {
            let e: Electron = serde_json::from_str(json).unwrap();
            assert_eq!(e, expected, "{name}");
        }
    }

    #[test]
    fn unmarshal_invalid_blob() {
        assert!(serde_json::from_str::<Electron>(r#"{"empty"}"#).is_err());
    }

    #[test]
    fn unmarshal_malformed_base64_payload() {
        let json = r#"{"senderid":"s","id":"e","atomid":"a","payload":"not-base64!"}"#;
        assert!(serde_json::from_str::<Electron>(json).is_err());
    }

    #[test]
    fn unmarshal_ignores_unknown_fields() {
        let json = r#"{"senderid":"s","id":"e","atomid":"a","extra":42}"#;
        let e: Electron = serde_json::from_str(json).unwrap();
        assert_eq!(e, Electron::new("s", "e", "a"));
    }

    #[test]
    fn roundtrip_binary_payload() {
        // Not UTF-8, so the payload must travel as base64.
        let e = noop().with_payload(vec![0u8, 159, 146, 150]);
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains(r#""payload":""#));

        let back: Electron = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn roundtrip_embedded_json_payload() {
        let e = with_raw_payload();
        let back: Electron = serde_json::from_str(&serde_json::to_string(&e).unwrap()).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn roundtrip_timeout_and_flags() {
        let mut e = noop().with_timeout(Duration::from_millis(1500));
        e.resp = true;
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains(r#""timeout":1500000000"#));
        assert!(json.contains(r#""resp":true"#));
        assert!(!json.contains("copystate"));

        let back: Electron = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn validate() {
        let tests = [
            ("valid electron", noop(), true),
            ("invalid electron", Electron::default(), false),
            ("invalid electron / only sender", Electron::new("test", "", ""), false),
            ("invalid electron / only atom", Electron::new("", "", "test"), false),
            ("invalid electron / only ID", Electron::new("", "test", ""), false),
            ("invalid electron / sender & atom", Electron::new("test", "", "test"), false),
            ("invalid electron / ID & sender", Electron::new("test", "test", ""), false),
            ("invalid electron / ID & atom", Electron::new("", "test", "test"), false),
        ];

        for (name, e, valid) in tests {
            assert_eq!(e.validate(), valid, "{name}");
        }
    }
}
