//! Codec trait and implementations for serializing/deserializing records.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The session layer uses it to turn an [`Identity`](crate::Identity) into
//! the string stored under the identity key, and back again on restore.
//! It doesn't care HOW records are serialized, only that something
//! implements [`Codec`].

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → safe to share between threads. The session manager
///   lives behind an `Arc` and may be used from any Tokio worker.
/// - `'static` → the codec owns everything it needs, so it can be stored
///   inside long-lived structs.
///
/// `DeserializeOwned` (vs plain `Deserialize`) means the decoded value
/// doesn't borrow from the input bytes, so the buffer read from storage
/// can be dropped right after decoding.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;

    /// Encodes a value into a UTF-8 string, for string-valued stores.
    ///
    /// The default goes through [`encode`](Self::encode) and rejects
    /// non-UTF-8 output. Text codecs such as [`JsonCodec`] never produce
    /// that.
    fn encode_string<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<String, ProtocolError> {
        let bytes = self.encode(value)?;
        String::from_utf8(bytes).map_err(|e| {
            ProtocolError::InvalidRecord(format!(
                "codec produced non-UTF-8 output: {e}"
            ))
        })
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// JSON keeps persisted identity records readable: a user can open the
/// storage directory and see `{"user_id":"alice"}`. It is also the format
/// the web client keeps in browser local storage, so records stay
/// interchangeable.
///
/// This is behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use prepdesk_protocol::{Codec, Identity, JsonCodec, UserId};
///
/// let codec = JsonCodec;
/// let identity = Identity::new(UserId::from("alice"));
///
/// let text = codec.encode_string(&identity).unwrap();
/// assert_eq!(text, r#"{"user_id":"alice"}"#);
///
/// let decoded: Identity = codec.decode(text.as_bytes()).unwrap();
/// assert_eq!(identity, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Identity, UserId};

    #[test]
    fn test_json_codec_decode_garbage_returns_decode_error() {
        let result: Result<Identity, _> = JsonCodec.decode(b"{not json");

        assert!(
            matches!(result, Err(ProtocolError::Decode(_))),
            "malformed bytes should surface as Decode"
        );
    }

    #[test]
    fn test_json_codec_decode_missing_field_returns_decode_error() {
        // An identity record without `user_id` is not an identity.
        let result: Result<Identity, _> = JsonCodec.decode(br#"{"name":"x"}"#);

        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_encode_string_includes_display_name() {
        let identity = Identity {
            user_id: UserId::from("bob"),
            display_name: Some("Bob B.".into()),
        };

        let text = JsonCodec.encode_string(&identity).unwrap();

        assert_eq!(text, r#"{"user_id":"bob","name":"Bob B."}"#);
    }
}
