use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use thiserror::Error;
use warden_core::SessionSnapshot;

const TRANSFER_DOMAIN: &str = "warden";
const TRANSFER_VERSION: &str = "v1";

/// Identifier prefix emitted before the map name and encoded payload.
pub(crate) const TRANSFER_HEADER: &str = "warden:v1";
const FIELD_DELIMITER: char = ':';

/// Errors that can occur while encoding or decoding session transfer strings.
#[derive(Debug, Error)]
pub(crate) enum TransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("session string was empty")]
    EmptyPayload,
    /// The string did not contain the expected number of segments.
    #[error("session string is missing the {0} segment")]
    MissingSegment(&'static str),
    /// The string used an unexpected prefix segment.
    #[error("session prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The string used an unsupported version identifier.
    #[error("session version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The map segment disagrees with the map stored in the payload.
    #[error("session string names map '{header}' but the payload belongs to '{payload}'")]
    MapMismatch {
        /// Map named in the header.
        header: String,
        /// Map stored inside the payload.
        payload: String,
    },
    /// The base64 payload could not be decoded.
    #[error("could not decode session payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The payload could not be converted to or from JSON.
    #[error("could not process session payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

/// Encodes a snapshot into a single-line string suitable for clipboard transfer.
pub(crate) fn encode(snapshot: &SessionSnapshot) -> Result<String, TransferError> {
    let json = serde_json::to_vec(snapshot)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!("{TRANSFER_HEADER}:{}:{encoded}", snapshot.map))
}

/// Decodes a snapshot from its transfer string representation.
pub(crate) fn decode(value: &str) -> Result<SessionSnapshot, TransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TransferError::EmptyPayload);
    }

    let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
    let domain = parts.next().ok_or(TransferError::MissingSegment("prefix"))?;
    let version = parts
        .next()
        .ok_or(TransferError::MissingSegment("version"))?;
    let rest = parts.next().ok_or(TransferError::MissingSegment("map"))?;

    if domain != TRANSFER_DOMAIN {
        return Err(TransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != TRANSFER_VERSION {
        return Err(TransferError::UnsupportedVersion(version.to_owned()));
    }

    // Map names may contain the delimiter; the payload never does.
    let (map, payload) = rest
        .rsplit_once(FIELD_DELIMITER)
        .ok_or(TransferError::MissingSegment("payload"))?;
    let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
    let snapshot: SessionSnapshot = serde_json::from_slice(&bytes)?;
    if snapshot.map != map {
        return Err(TransferError::MapMismatch {
            header: map.to_owned(),
            payload: snapshot.map,
        });
    }
    Ok(snapshot)
}

/// Reports whether the provided text looks like a transfer string.
#[must_use]
pub(crate) fn is_transfer_string(value: &str) -> bool {
    value
        .trim_start()
        .strip_prefix(TRANSFER_HEADER)
        .is_some_and(|rest| rest.starts_with(FIELD_DELIMITER))
}
