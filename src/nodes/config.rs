use {core::time::Duration, derive_builder::Builder};

/// Configuration options for the replica registry subsystem.
#[derive(Builder, Debug, Clone)]
#[builder(pattern = "owned", setter(prefix = "with"), derive(Debug, Clone))]
#[builder_struct_attr(doc(hidden))]
pub struct Config {
	/// The duration a replica waits without hearing from the group leader
	/// before its election timer fires.
	#[builder(default = "Duration::from_secs(1)")]
	pub election_timeout: Duration,

	/// The maximum jitter applied to the election timeout to avoid split
	/// votes when several replicas time out at once.
	#[builder(default = "Duration::from_millis(500)")]
	pub election_timeout_jitter: Duration,

	/// The interval at which a replica schedules heartbeat work while it is
	/// active. Scheduling stops once the replica leaves the `Active` state.
	#[builder(default = "Duration::from_millis(150)")]
	pub heartbeat_interval: Duration,

	/// The maximum time a destroyer waits for a terminating replica to
	/// acknowledge that its background activity has stopped. When the grace
	/// period elapses the replica is forced into `Destroyed` and its
	/// remaining resources are released asynchronously on a best-effort
	/// basis.
	#[builder(default = "Duration::from_secs(2)")]
	pub teardown_grace: Duration,
}

impl Config {
	/// Creates a new config builder with default values.
	pub fn builder() -> ConfigBuilder {
		ConfigBuilder::default()
	}
}

impl Default for Config {
	fn default() -> Self {
		Self::builder().build().expect("all fields have defaults")
	}
}
