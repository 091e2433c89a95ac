use crate::ops::OpTag;

#[derive(Debug, thiserror::Error)]
pub enum WireError {
	/// The declared entry count is negative or does not fit in memory.
	#[error("invalid group count in teardown frame: {0}")]
	InvalidCount(i32),

	/// The frame ended before the declared entry count was satisfied.
	#[error("frame ends before the declared entry count is satisfied")]
	Truncated,

	/// The frame contains bytes past the last declared entry.
	#[error("unexpected trailing bytes after the last entry")]
	TrailingBytes,

	/// A value in the frame violates the ambient serialization contract.
	#[error("malformed frame: {0}")]
	Decode(#[from] postcard::Error),

	/// The frame is addressed to an operation type this process does not
	/// handle.
	#[error("no handler installed for operation tag {0}")]
	UnknownTag(OpTag),
}
