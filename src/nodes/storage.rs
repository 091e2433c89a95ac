use {bytes::Bytes, crate::nodes::GroupId};

/// A contiguous run of replicated log entries owned by one replica.
///
/// Segments are not freed synchronously during teardown. When a replica is
/// destroyed its segments are handed to the [`Compaction`] collaborator,
/// which removes them asynchronously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSegment {
	/// The group this segment belongs to.
	pub group: GroupId,

	/// The serialized log entries in this segment, oldest first.
	pub entries: Vec<Bytes>,
}

impl LogSegment {
	/// Creates a new empty open segment for the given group.
	pub const fn empty(group: GroupId) -> Self {
		Self {
			group,
			entries: Vec::new(),
		}
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// Accepts log segments released by destroyed replicas for asynchronous
/// removal.
///
/// This is the seam to the external storage/compaction facility. The
/// teardown path never frees log storage synchronously; it hands the
/// segments over exactly once per destroyed replica and moves on. A failure
/// returned here is reported and the replica is still removed from the
/// registry, so a broken compactor can leak storage but never wedge the
/// teardown path.
pub trait Compaction: Send + Sync + 'static {
	/// Takes ownership of all log segments released by the replica of
	/// `group`. Called exactly once, from the replica's own worker task, as
	/// part of the `Terminating → Destroyed` transition.
	fn retire(
		&self,
		group: &GroupId,
		segments: Vec<LogSegment>,
	) -> Result<(), CompactionError>;
}

/// Failure reported by a [`Compaction`] implementation when it cannot take
/// ownership of released segments.
#[derive(Debug, thiserror::Error)]
#[error("log segment handoff failed: {0}")]
pub struct CompactionError(pub String);

/// Default [`Compaction`] implementation that drops released segments
/// immediately. Suitable for replicas whose log lives only in memory.
#[derive(Debug, Default)]
pub struct DiscardCompaction;

impl Compaction for DiscardCompaction {
	fn retire(
		&self,
		_group: &GroupId,
		_segments: Vec<LogSegment>,
	) -> Result<(), CompactionError> {
		Ok(())
	}
}
