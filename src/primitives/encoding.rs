//! Centralized encoding and decoding utilities that define the wire format
//! of all values exchanged with other cluster members.
//!
//! Currently uses `postcard` as the underlying serialization format.

use {
	bytes::Bytes,
	serde::{Serialize, de::DeserializeOwned},
};

pub fn serialize<T: Serialize>(value: &T) -> Bytes {
	postcard::to_allocvec(value)
		.expect("serialization should never fail")
		.into()
}

pub fn deserialize<T: DeserializeOwned>(
	bytes: impl AsRef<[u8]>,
) -> Result<T, postcard::Error> {
	postcard::from_bytes(bytes.as_ref())
}

/// Decodes a single value from the front of `bytes` and returns it along
/// with the remaining unconsumed suffix. Used for sequentially decoding
/// count-prefixed streams of values.
pub fn take<T: DeserializeOwned>(
	bytes: &[u8],
) -> Result<(T, &[u8]), postcard::Error> {
	postcard::take_from_bytes(bytes)
}
