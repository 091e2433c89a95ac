use {
	core::fmt,
	serde::{Deserialize, Serialize},
};

/// Identifies one generation of one named consensus group.
///
/// Notes:
///
/// - Two ids are equal iff both the name and the generation match.
///
/// - The generation strictly increases each time a group named `name` is
///   recreated. A destroyed generation is permanently retired; a future
///   group reusing the name must be registered under a strictly greater
///   generation.
///
/// - The id is immutable once constructed and is used as the registry key,
///   so a teardown notification for `{name, gen}` can never reach a replica
///   registered under `{name, gen'}` with a different generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId {
	name: String,
	generation: i64,
}

impl GroupId {
	/// Creates a new group id from a logical name and a generation number.
	pub fn new(name: impl Into<String>, generation: i64) -> Self {
		Self {
			name: name.into(),
			generation,
		}
	}

	/// The logical name of the group.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The incarnation number of the group.
	pub const fn generation(&self) -> i64 {
		self.generation
	}
}

impl fmt::Display for GroupId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}@{}", self.name, self.generation)
	}
}
