use crate::nodes::GroupId;

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
	/// A replica is already registered under this exact group id. Generations
	/// are unique per name, so this signals a bug in the group-creation path
	/// rather than a normal runtime condition.
	#[error("a replica is already registered for group {0}")]
	DuplicateGroup(GroupId),

	/// The target replica has been claimed for teardown or fully destroyed.
	/// Proposals fail fast with this error instead of being queued.
	#[error("group {0} has been destroyed")]
	GroupDestroyed(GroupId),
}
