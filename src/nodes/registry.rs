use {
	crate::nodes::{
		Config,
		Error,
		GroupId,
		NodeHandle,
		node::WorkerLoop,
		storage::{Compaction, DiscardCompaction, LogSegment},
	},
	bytes::Bytes,
	dashmap::{DashMap, mapref::entry::Entry},
	std::sync::Arc,
};

/// Authoritative, process-wide map from [`GroupId`] to the local replica
/// hosting that group.
///
/// This type is instantiated once per process. The group-creation facility
/// registers replicas here; teardown notifications and in-process
/// administrative logic destroy them through [`Registry::destroy`].
pub struct Registry {
	/// Registry subsystem configuration, shared with every replica worker.
	config: Arc<Config>,

	/// Collaborator that takes ownership of log segments released by
	/// destroyed replicas.
	compaction: Arc<dyn Compaction>,

	/// All live replicas keyed by group id. Holds handles in `Active` and
	/// `Terminating` states only; destroyed ids are removed and never
	/// reachable from here.
	active: DashMap<GroupId, NodeHandle>,
}

/// Public API
impl Registry {
	/// Creates a registry whose replicas discard released log segments.
	pub fn new(config: Config) -> Self {
		Self::with_compaction(config, Arc::new(DiscardCompaction))
	}

	/// Creates a registry that hands log segments released during teardown
	/// to the given compaction collaborator.
	pub fn with_compaction(
		config: Config,
		compaction: Arc<dyn Compaction>,
	) -> Self {
		Self {
			compaction,
			config: Arc::new(config),
			active: DashMap::new(),
		}
	}

	/// Returns the handle of the replica registered under `id`, if any.
	/// Non-mutating and safe to call concurrently with any other operation.
	pub fn lookup(&self, id: &GroupId) -> Option<NodeHandle> {
		self.active.get(id).map(|entry| entry.value().clone())
	}

	/// The number of live replicas on this process.
	pub fn len(&self) -> usize {
		self.active.len()
	}

	pub fn is_empty(&self) -> bool {
		self.active.is_empty()
	}

	/// Returns a builder for registering a new replica under the given id,
	/// optionally restoring recovered log segments and an applied snapshot.
	pub fn node(&self, id: GroupId) -> NodeBuilder<'_> {
		NodeBuilder {
			registry: self,
			id,
			sealed: Vec::new(),
			snapshot: None,
		}
	}

	/// Registers a fresh `Active` replica under `id` and spawns its worker
	/// task.
	///
	/// Fails with [`Error::DuplicateGroup`] if a replica is already
	/// registered under this id. Generations are unique per group name, so
	/// a collision signals a bug in the group-creation path.
	pub fn register(&self, id: GroupId) -> Result<NodeHandle, Error> {
		self.node(id).register()
	}

	/// Destroys the replica registered under `id`, releasing its resources
	/// and removing it from the registry.
	///
	/// This operation is idempotent and safe against redelivery: if `id` is
	/// absent, or another caller has already claimed the teardown, it
	/// returns immediately with no effect. It never affects a replica
	/// registered under the same name with a different generation.
	///
	/// The winning caller drives the replica to `Destroyed`, waiting at
	/// most [`Config::teardown_grace`] for the worker to acknowledge that
	/// its background activity has stopped. A stuck worker does not block
	/// the teardown path: on timeout the id is removed anyway and the
	/// remaining resources are released asynchronously on a best-effort
	/// basis. Resource-release failures are reported, never propagated.
	pub async fn destroy(&self, id: &GroupId) {
		// clone the handle out so no map guard is held across an await
		let Some(handle) = self.lookup(id) else {
			return;
		};

		if !handle.claim() {
			// another destroyer owns the teardown of this replica
			return;
		}

		tracing::debug!(group = %id, "destroying replica");
		handle.cancel();

		if !handle.await_terminated(self.config.teardown_grace).await {
			tracing::warn!(
				group = %id,
				grace = ?self.config.teardown_grace,
				"teardown acknowledgment timed out, releasing asynchronously",
			);
		}

		// remove before marking destroyed so a destroyed handle is never
		// observable through the registry
		self.active.remove(id);
		handle.finish();

		tracing::info!(group = %id, "replica destroyed");
	}
}

/// Configures and registers one replica.
///
/// Returned by [`Registry::node`]. The group-creation facility uses this to
/// restore recovered state when a group is recreated under a new
/// generation.
pub struct NodeBuilder<'a> {
	registry: &'a Registry,
	id: GroupId,
	sealed: Vec<LogSegment>,
	snapshot: Option<Bytes>,
}

impl NodeBuilder<'_> {
	/// Restores sealed log segments recovered from storage.
	pub fn with_segments(
		mut self,
		segments: impl IntoIterator<Item = LogSegment>,
	) -> Self {
		self.sealed.extend(segments);
		self
	}

	/// Restores a reference to the applied state-machine snapshot.
	pub fn with_snapshot(mut self, snapshot: Bytes) -> Self {
		self.snapshot = Some(snapshot);
		self
	}

	/// Registers the replica and spawns its worker task. See
	/// [`Registry::register`].
	pub fn register(self) -> Result<NodeHandle, Error> {
		match self.registry.active.entry(self.id.clone()) {
			Entry::Occupied(_) => Err(Error::DuplicateGroup(self.id)),
			Entry::Vacant(place) => {
				let handle = WorkerLoop::spawn(
					self.id,
					Arc::clone(&self.registry.config),
					Arc::clone(&self.registry.compaction),
					self.sealed,
					self.snapshot,
				);

				tracing::info!(group = %handle.id(), "replica registered");
				place.insert(handle.clone());
				Ok(handle)
			}
		}
	}
}
