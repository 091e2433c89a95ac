//! # Tessera
//!
//! The replica lifecycle and group-teardown subsystem of a distributed
//! consensus service.
//!
//! Each process hosts local replicas of one or more consensus groups. When
//! the cluster coordinator decides that a group should be retired, it sends
//! a batch teardown notification to every member hosting a replica of that
//! group. This crate implements the member side of that contract: the
//! process-wide [`Registry`] of live replicas, the
//! Active → Terminating → Destroyed lifecycle of each replica, and the wire
//! codec and dispatch for the [`DestroyNodes`] notification.
//!
//! Teardown is an out-of-band administrative action. It does not go through
//! the group's own replicated log, produces no response to the sender, and
//! is safe to redeliver: destroying an unknown or already-destroyed group
//! identity is a no-op.

pub mod nodes;
pub mod ops;
pub mod primitives;

pub use {
	bytes::{Bytes, BytesMut},
	nodes::{
		Compaction,
		Config,
		GroupId,
		Lifecycle,
		LogSegment,
		NodeHandle,
		Registry,
	},
	ops::{DestroyNodes, Dispatcher, OpTag, Operation},
};
