use core::sync::atomic::{AtomicU8, Ordering};

/// The lifecycle state of one local replica.
///
/// States move strictly forward: `Active → Terminating → Destroyed`. There
/// is no transition back to `Active`; a destroyed generation is permanently
/// retired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Lifecycle {
	/// The replica participates in consensus traffic and accepts proposals.
	Active = 0,

	/// The replica has been claimed for teardown. New proposals fail fast
	/// and background activity is being cancelled.
	Terminating = 1,

	/// Terminal state. The replica's resources have been released (or
	/// marked for best-effort asynchronous release) and the id is no longer
	/// reachable from the registry.
	Destroyed = 2,
}

/// Atomic cell holding a replica's [`Lifecycle`] state.
///
/// The `Active → Terminating` edge is a compare-exchange, so out of any
/// number of concurrent destroyers exactly one claims the replica and
/// performs the teardown sequence. Everyone else observes the claim and
/// backs off, which is what makes redelivered teardown notifications
/// harmless.
#[derive(Debug)]
pub(super) struct LifecycleCell(AtomicU8);

impl LifecycleCell {
	pub fn new() -> Self {
		Self(AtomicU8::new(Lifecycle::Active as u8))
	}

	pub fn current(&self) -> Lifecycle {
		match self.0.load(Ordering::Acquire) {
			0 => Lifecycle::Active,
			1 => Lifecycle::Terminating,
			_ => Lifecycle::Destroyed,
		}
	}

	/// Attempts to claim the replica for teardown. Returns `true` for
	/// exactly one caller while the replica is `Active`, and `false` for
	/// everyone else thereafter.
	pub fn claim(&self) -> bool {
		self
			.0
			.compare_exchange(
				Lifecycle::Active as u8,
				Lifecycle::Terminating as u8,
				Ordering::AcqRel,
				Ordering::Acquire,
			)
			.is_ok()
	}

	/// Marks the replica as fully destroyed.
	pub fn finish(&self) {
		self.0.store(Lifecycle::Destroyed as u8, Ordering::Release);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn starts_active() {
		let cell = LifecycleCell::new();
		assert_eq!(cell.current(), Lifecycle::Active);
	}

	#[test]
	fn only_one_claim_wins() {
		let cell = LifecycleCell::new();

		assert!(cell.claim());
		assert_eq!(cell.current(), Lifecycle::Terminating);

		// repeated claims lose
		assert!(!cell.claim());
		assert_eq!(cell.current(), Lifecycle::Terminating);
	}

	#[test]
	fn no_claim_after_destroyed() {
		let cell = LifecycleCell::new();

		assert!(cell.claim());
		cell.finish();

		assert_eq!(cell.current(), Lifecycle::Destroyed);
		assert!(!cell.claim());
		assert_eq!(cell.current(), Lifecycle::Destroyed);
	}

	#[test]
	fn finish_is_terminal() {
		let cell = LifecycleCell::new();
		cell.claim();
		cell.finish();
		cell.finish();
		assert_eq!(cell.current(), Lifecycle::Destroyed);
	}
}
