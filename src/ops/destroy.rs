use {
	crate::{
		nodes::{GroupId, Registry},
		ops::{OpTag, Operation, WireError},
		primitives::{serialize, take},
	},
	bytes::{Bytes, BytesMut},
};

/// Batch notification that one or more consensus groups have been destroyed
/// cluster-wide. Sent by the coordinator to every member hosting a local
/// replica of a destroyed group.
///
/// Notes:
///
/// - This is not a replicated log entry. Destruction is an out-of-band
///   administrative action and is not agreed through the group's own
///   consensus.
///
/// - The order of ids carries no meaning and each id is processed
///   independently: a failure while tearing down one replica never
///   prevents the remaining ids in the batch from being processed.
///
/// - Processing is idempotent per id, so the coordinator may redeliver the
///   same notification at will.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestroyNodes {
	group_ids: Vec<GroupId>,
}

impl DestroyNodes {
	/// Creates a teardown notification for the given group ids.
	pub fn new(group_ids: impl IntoIterator<Item = GroupId>) -> Self {
		Self {
			group_ids: group_ids.into_iter().collect(),
		}
	}

	/// The group ids carried by this notification.
	pub fn group_ids(&self) -> &[GroupId] {
		&self.group_ids
	}
}

impl Operation for DestroyNodes {
	const RESPONDS: bool = false;
	const TAG: OpTag = OpTag::DESTROY_NODES;

	/// Encodes the payload as a count followed by that many group id
	/// encodings, using the ambient serialization contract.
	fn encode(&self) -> Bytes {
		let count = i32::try_from(self.group_ids.len())
			.expect("group count exceeds frame capacity");

		let mut payload = BytesMut::from(&serialize(&count)[..]);
		for id in &self.group_ids {
			payload.extend_from_slice(&serialize(id));
		}
		payload.freeze()
	}

	/// Decodes a count-prefixed payload back into the id sequence.
	///
	/// A negative count, a payload that ends before the declared count is
	/// satisfied, or bytes left over after the last entry all reject the
	/// entire message. Partial decodes are never exposed.
	fn decode(payload: &[u8]) -> Result<Self, WireError> {
		let (count, mut rest) = take::<i32>(payload)?;
		let count =
			usize::try_from(count).map_err(|_| WireError::InvalidCount(count))?;

		// the count is remote input; cap preallocation independently of it
		let mut group_ids = Vec::with_capacity(count.min(1024));
		for _ in 0..count {
			let (id, suffix) = take::<GroupId>(rest).map_err(|err| match err {
				postcard::Error::DeserializeUnexpectedEnd => WireError::Truncated,
				other => WireError::Decode(other),
			})?;
			group_ids.push(id);
			rest = suffix;
		}

		if !rest.is_empty() {
			return Err(WireError::TrailingBytes);
		}

		Ok(Self { group_ids })
	}

	/// Destroys the local replica of every id in the batch, independently
	/// and in order of appearance. Ids without a local replica are skipped
	/// silently; release failures are reported inside the destroy path and
	/// never abort the batch. Produces no response.
	fn apply(self, registry: &Registry) -> impl Future<Output = ()> + Send {
		async move {
			tracing::debug!(
				count = self.group_ids.len(),
				"processing group teardown batch",
			);

			for id in &self.group_ids {
				registry.destroy(id).await;
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn gid(name: &str, generation: i64) -> GroupId {
		GroupId::new(name, generation)
	}

	#[test]
	fn round_trip() {
		let op = DestroyNodes::new([gid("orders", 3), gid("payments", 17)]);
		let decoded = DestroyNodes::decode(&op.encode()).unwrap();
		assert_eq!(decoded, op);
	}

	#[test]
	fn empty_batch_round_trip() {
		let op = DestroyNodes::new([]);
		let decoded = DestroyNodes::decode(&op.encode()).unwrap();
		assert!(decoded.group_ids().is_empty());
	}

	#[test]
	fn negative_count_rejected() {
		let payload = serialize(&-1i32);
		assert!(matches!(
			DestroyNodes::decode(&payload),
			Err(WireError::InvalidCount(-1)),
		));
	}

	#[test]
	fn short_stream_rejected() {
		// declare two entries but encode only one
		let mut payload = BytesMut::from(&serialize(&2i32)[..]);
		payload.extend_from_slice(&serialize(&gid("orders", 3)));

		assert!(matches!(
			DestroyNodes::decode(&payload),
			Err(WireError::Truncated),
		));
	}

	#[test]
	fn trailing_bytes_rejected() {
		let mut payload =
			BytesMut::from(&DestroyNodes::new([gid("orders", 3)]).encode()[..]);
		payload.extend_from_slice(b"junk");

		assert!(matches!(
			DestroyNodes::decode(&payload),
			Err(WireError::TrailingBytes),
		));
	}

	#[test]
	fn truncated_mid_entry_rejected() {
		let encoded = DestroyNodes::new([gid("orders", 3)]).encode();
		let cut = &encoded[..encoded.len() - 1];

		assert!(matches!(
			DestroyNodes::decode(cut),
			Err(WireError::Truncated),
		));
	}
}
