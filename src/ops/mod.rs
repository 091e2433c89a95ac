//! # Typed Operation Dispatch
//!
//! Administrative notifications arrive from the transport as opaque byte
//! frames. Every frame starts with an [`OpTag`] naming the operation type,
//! followed by the operation's own payload encoding. The [`Dispatcher`]
//! routes the payload to the handler installed for that tag and drives the
//! decoded operation against the local [`Registry`].
//!
//! Operations declare through [`Operation::RESPONDS`] whether their
//! dispatch contract produces a response. Teardown notifications do not:
//! delivery is fire-and-forget, the sender gets no acknowledgment, and
//! redelivery must therefore be harmless. This dispatch surface carries no
//! reply channel and only accepts non-responding operations.

use {
	crate::{
		nodes::Registry,
		primitives::{serialize, take},
	},
	bytes::{Bytes, BytesMut},
	core::fmt,
	futures::{FutureExt, future::BoxFuture},
	serde::{Deserialize, Serialize},
	std::{collections::HashMap, sync::Arc},
};

mod destroy;
mod error;

pub use {destroy::DestroyNodes, error::WireError};

/// Identifies an operation type on the wire. The tag is the first value of
/// every operation frame and selects the handler the payload is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpTag(pub u8);

impl OpTag {
	/// Batch teardown of local replicas of destroyed groups.
	pub const DESTROY_NODES: Self = Self(1);
}

impl fmt::Display for OpTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{:02x}", self.0)
	}
}

/// A typed administrative operation that can be carried in a wire frame and
/// executed against the local replica registry.
pub trait Operation: Sized + Send + 'static {
	/// The wire tag that routes frames to this operation type.
	const TAG: OpTag;

	/// Whether executing this operation produces a response for the sender.
	/// Operations with a void dispatch contract set this to `false`; their
	/// completion has no externally observable acknowledgment.
	const RESPONDS: bool;

	/// Encodes the operation payload (everything after the tag).
	fn encode(&self) -> Bytes;

	/// Decodes the operation payload. Any inconsistency rejects the whole
	/// frame; partially decoded operations are never exposed.
	fn decode(payload: &[u8]) -> Result<Self, WireError>;

	/// Executes the operation against the local registry.
	fn apply(self, registry: &Registry) -> impl Future<Output = ()> + Send;
}

type Handler = Box<
	dyn Fn(Arc<Registry>, Bytes) -> BoxFuture<'static, Result<(), WireError>>
		+ Send
		+ Sync,
>;

/// Routes incoming operation frames to the handler installed for their tag.
pub struct Dispatcher {
	/// The local replica registry that operations execute against.
	registry: Arc<Registry>,

	/// Installed handlers keyed by operation tag.
	handlers: HashMap<OpTag, Handler>,
}

impl Dispatcher {
	/// Creates a dispatcher for the given registry with all built-in
	/// operations installed.
	pub fn new(registry: Arc<Registry>) -> Self {
		let mut dispatcher = Self {
			registry,
			handlers: HashMap::new(),
		};
		dispatcher.install::<DestroyNodes>();
		dispatcher
	}

	/// Installs the handler for operation type `O`, replacing any handler
	/// previously installed for the same tag.
	pub fn install<O: Operation>(&mut self) {
		// this dispatch surface has no reply channel; operations that produce
		// responses are routed through a different service
		const { assert!(!O::RESPONDS) };

		self.handlers.insert(
			O::TAG,
			Box::new(|registry, payload| {
				async move {
					let operation = O::decode(&payload)?;
					operation.apply(&registry).await;
					Ok(())
				}
				.boxed()
			}),
		);
	}

	/// Builds a complete wire frame (tag followed by payload) for the given
	/// operation. This is what the coordinator side hands to the transport.
	pub fn envelope<O: Operation>(operation: &O) -> Bytes {
		let mut frame = BytesMut::from(&serialize(&O::TAG)[..]);
		frame.extend_from_slice(&operation.encode());
		frame.freeze()
	}

	/// Decodes the tag of an incoming frame and drives the installed
	/// handler over its payload.
	///
	/// A malformed frame or an unknown tag rejects the whole message before
	/// any part of it is executed. No response is produced in any case;
	/// errors are terminal at this point and redelivery is the sender's
	/// decision.
	pub async fn dispatch(&self, frame: &[u8]) -> Result<(), WireError> {
		let (tag, payload) = take::<OpTag>(frame)?;

		let Some(handler) = self.handlers.get(&tag) else {
			return Err(WireError::UnknownTag(tag));
		};

		handler(Arc::clone(&self.registry), Bytes::copy_from_slice(payload))
			.await
	}
}
