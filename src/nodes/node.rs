use {
	crate::nodes::{
		Config,
		Error,
		GroupId,
		Lifecycle,
		lifecycle::LifecycleCell,
		storage::{Compaction, LogSegment},
	},
	bytes::Bytes,
	core::time::Duration,
	rand::random_range,
	std::sync::Arc,
	tokio::{
		sync::{
			mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
			oneshot,
			watch,
		},
		time::{Instant, sleep_until, timeout},
	},
	tokio_util::sync::CancellationToken,
};

/// Handle to one local replica of a consensus group.
///
/// Notes:
///
/// - This type is cheap to clone as it uses an Arc internally and all
///   clones refer to the same underlying replica.
///
/// - The replica's mutable internals (timers, replication buffer, applied
///   snapshot reference) are owned exclusively by a background worker task.
///   All state-affecting calls on this handle serialize through the
///   worker's command channel, so a teardown can never interleave with an
///   in-flight proposal on the same replica.
///
/// - The handle stays valid after the replica is destroyed; operations on
///   a destroyed replica fail fast with [`Error::GroupDestroyed`].
#[derive(Clone, Debug)]
pub struct NodeHandle(Arc<NodeState>);

/// Public API
impl NodeHandle {
	/// The id of the group this replica belongs to.
	pub fn id(&self) -> &GroupId {
		&self.0.id
	}

	/// The current lifecycle state of this replica.
	pub fn lifecycle(&self) -> Lifecycle {
		self.0.lifecycle.current()
	}

	/// Returns `true` while the replica accepts proposals.
	pub fn is_active(&self) -> bool {
		self.lifecycle() == Lifecycle::Active
	}

	/// Submits a serialized client proposal to this replica and waits for
	/// it to be appended to the replication buffer. Returns the log index
	/// assigned to the entry.
	///
	/// Fails fast with [`Error::GroupDestroyed`] if the replica has been
	/// claimed for teardown, including when the claim lands while the
	/// proposal is queued. Proposals are never silently dropped.
	pub async fn propose(&self, entry: Bytes) -> Result<u64, Error> {
		if !self.is_active() {
			return Err(Error::GroupDestroyed(self.0.id.clone()));
		}

		let (reply_tx, reply_rx) = oneshot::channel();
		self
			.0
			.commands_tx
			.send(Command::Propose(entry, reply_tx))
			.map_err(|_| Error::GroupDestroyed(self.0.id.clone()))?;

		// if the worker shuts down between enqueue and processing, the reply
		// sender is dropped during the drain and the proposal fails here
		reply_rx
			.await
			.map_err(|_| Error::GroupDestroyed(self.0.id.clone()))?
	}
}

/// Internal API
impl NodeHandle {
	/// Attempts to claim this replica for teardown. Exactly one caller wins
	/// the `Active → Terminating` transition.
	pub(super) fn claim(&self) -> bool {
		self.0.lifecycle.claim()
	}

	/// Signals the worker task to stop scheduling timers and begin the
	/// shutdown sequence.
	pub(super) fn cancel(&self) {
		self.0.cancel.cancel();
	}

	/// Waits up to `grace` for the worker task to acknowledge that all of
	/// its background activity has stopped. Returns `false` when the grace
	/// period elapses first.
	pub(super) async fn await_terminated(&self, grace: Duration) -> bool {
		let mut terminated = self.0.terminated.subscribe();
		matches!(
			timeout(grace, terminated.wait_for(|done| *done)).await,
			Ok(Ok(_))
		)
	}

	/// Forces the lifecycle into its terminal state.
	pub(super) fn finish(&self) {
		self.0.lifecycle.finish();
	}
}

/// Shared state of one replica, referenced by all clones of its handle and
/// by the worker task.
#[derive(Debug)]
struct NodeState {
	/// The id of the group this replica belongs to.
	id: GroupId,

	/// The lifecycle state machine for this replica.
	lifecycle: LifecycleCell,

	/// Channel for sending commands to the worker task.
	commands_tx: UnboundedSender<Command>,

	/// Cancellation token that terminates the worker task.
	cancel: CancellationToken,

	/// Set to `true` by the worker task once all of its background activity
	/// has stopped and its resources have been handed off.
	terminated: watch::Sender<bool>,
}

/// Commands processed by the replica's worker task.
enum Command {
	/// Appends a client proposal to the replication buffer and replies with
	/// the assigned log index.
	Propose(Bytes, oneshot::Sender<Result<u64, Error>>),
}

/// Background worker task that exclusively owns one replica's mutable
/// consensus-side state.
pub(super) struct WorkerLoop {
	/// The shared replica state, also referenced by handles.
	state: Arc<NodeState>,

	/// Registry subsystem configuration.
	config: Arc<Config>,

	/// Channel for receiving commands from handles.
	commands_rx: UnboundedReceiver<Command>,

	/// Collaborator that takes ownership of released log segments.
	compaction: Arc<dyn Compaction>,

	/// Sealed log segments restored at registration time.
	sealed: Vec<LogSegment>,

	/// The open segment that proposals are appended to.
	open: LogSegment,

	/// Reference to the applied state-machine snapshot, if any was restored.
	snapshot: Option<Bytes>,

	/// Total number of log entries known to this replica, used to assign
	/// indices to appended proposals.
	appended: u64,

	/// Deadline of the pending election timer.
	election_deadline: Instant,

	/// Deadline of the pending heartbeat timer.
	heartbeat_deadline: Instant,
}

impl WorkerLoop {
	/// Creates the replica state and spawns its worker task. Called by the
	/// registry while it holds the map entry for this id, so no two live
	/// replicas can ever share a group id.
	pub(super) fn spawn(
		id: GroupId,
		config: Arc<Config>,
		compaction: Arc<dyn Compaction>,
		sealed: Vec<LogSegment>,
		snapshot: Option<Bytes>,
	) -> NodeHandle {
		let (commands_tx, commands_rx) = unbounded_channel();

		let state = Arc::new(NodeState {
			id: id.clone(),
			commands_tx,
			lifecycle: LifecycleCell::new(),
			cancel: CancellationToken::new(),
			terminated: watch::Sender::new(false),
		});

		let appended: u64 = sealed.iter().map(|s| s.len() as u64).sum();
		let now = Instant::now();

		let worker = Self {
			commands_rx,
			compaction,
			sealed,
			snapshot,
			appended,
			state: Arc::clone(&state),
			open: LogSegment::empty(id),
			election_deadline: now + election_interval(&config),
			heartbeat_deadline: now + config.heartbeat_interval,
			config,
		};

		tokio::spawn(worker.run());

		NodeHandle(state)
	}

	async fn run(mut self) {
		tracing::info!(
			group = %self.state.id,
			restored = self.appended,
			"replica active",
		);

		loop {
			tokio::select! {
				() = self.state.cancel.cancelled() => {
					self.on_terminated();
					break;
				}

				() = sleep_until(self.election_deadline) => {
					self.on_election_timeout();
				}

				() = sleep_until(self.heartbeat_deadline) => {
					self.on_heartbeat();
				}

				Some(command) = self.commands_rx.recv() => {
					self.on_command(command);
				}
			}
		}
	}

	/// The election timer elapsed without leader traffic. The consensus
	/// engine drives the actual election; this task only owns the timer's
	/// scheduling, which stops once the replica leaves `Active`.
	fn on_election_timeout(&mut self) {
		tracing::trace!(group = %self.state.id, "election timeout elapsed");
		self.election_deadline = Instant::now() + election_interval(&self.config);
	}

	fn on_heartbeat(&mut self) {
		tracing::trace!(group = %self.state.id, "heartbeat tick");
		self.heartbeat_deadline = Instant::now() + self.config.heartbeat_interval;
	}

	fn on_command(&mut self, command: Command) {
		match command {
			Command::Propose(entry, reply_tx) => {
				// the claim may land between a handle's fast-path check and the
				// worker picking the proposal up
				if self.state.lifecycle.current() != Lifecycle::Active {
					let _ = reply_tx
						.send(Err(Error::GroupDestroyed(self.state.id.clone())));
					return;
				}

				self.open.entries.push(entry);
				self.appended += 1;
				let _ = reply_tx.send(Ok(self.appended));
			}
		}
	}

	/// Runs the `Terminating → Destroyed` effects: fails queued proposals,
	/// discards the applied snapshot reference, hands all log segments to
	/// the compaction collaborator, and acknowledges termination.
	fn on_terminated(&mut self) {
		self.commands_rx.close();
		let mut rejected = 0usize;
		while let Ok(command) = self.commands_rx.try_recv() {
			match command {
				Command::Propose(_, reply_tx) => {
					let _ = reply_tx
						.send(Err(Error::GroupDestroyed(self.state.id.clone())));
					rejected += 1;
				}
			}
		}

		if self.snapshot.take().is_some() {
			tracing::trace!(
				group = %self.state.id,
				"applied snapshot reference discarded",
			);
		}

		let mut segments = core::mem::take(&mut self.sealed);
		let open = core::mem::replace(
			&mut self.open,
			LogSegment::empty(self.state.id.clone()),
		);
		if !open.is_empty() {
			segments.push(open);
		}

		if let Err(err) = self.compaction.retire(&self.state.id, segments) {
			// best-effort release: report and keep going so the teardown path
			// never wedges on a broken compactor
			tracing::warn!(
				group = %self.state.id,
				%err,
				"failed to hand off released log segments",
			);
		}

		tracing::debug!(
			group = %self.state.id,
			entries = self.appended,
			rejected,
			"replica terminated",
		);

		let _ = self.state.terminated.send(true);
	}
}

/// Election timeout with jitter, as used by the consensus tick.
fn election_interval(config: &Config) -> Duration {
	let jitter = config.election_timeout_jitter.as_millis() as u64;
	config.election_timeout + Duration::from_millis(random_range(0..=jitter))
}
