//! # Replica Registry & Lifecycle
//!
//! Every consensus group that the local process participates in is
//! represented by one replica: a bundle of in-memory resources (election
//! and heartbeat timers, a replication buffer of log entries, a reference
//! to the applied state-machine snapshot) owned exclusively by a background
//! worker task. The [`Registry`] is the authoritative, process-wide map
//! from [`GroupId`] to the handle of that worker.
//!
//! ## Identity
//!
//! A [`GroupId`] pairs a logical group name with a generation number.
//! Generations strictly increase each time a group name is recreated, so a
//! stale teardown notification targeting an old incarnation can never
//! affect a newer replica that reused the name.
//!
//! ## Lifecycle
//!
//! Each replica moves through `Active → Terminating → Destroyed`, and only
//! in that direction. The transition out of `Active` is claimed atomically
//! by exactly one caller of [`Registry::destroy`]; from that point the
//! replica stops scheduling timers, fails new and queued proposals with
//! [`Error::GroupDestroyed`], hands its log segments to the [`Compaction`]
//! collaborator for asynchronous removal, and acknowledges termination.
//! A replica never remains `Terminating` forever: the destroyer waits at
//! most [`Config::teardown_grace`] for the acknowledgment before forcing
//! the transition to `Destroyed`.
//!
//! ## Concurrency
//!
//! All state-affecting operations on one replica serialize through its
//! worker task; there is no cross-group serialization. The registry map is
//! the only structure shared across groups and supports concurrent readers
//! and writers without a global lock.

mod config;
mod error;
mod id;
mod lifecycle;
mod node;
mod registry;
mod storage;

pub use {
	config::{Config, ConfigBuilder, ConfigBuilderError},
	error::Error,
	id::GroupId,
	lifecycle::Lifecycle,
	node::NodeHandle,
	registry::{NodeBuilder, Registry},
	storage::{Compaction, CompactionError, DiscardCompaction, LogSegment},
};
