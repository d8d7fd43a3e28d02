//! Nullable infrastructure for deterministic testing.
//!
//! The core reaches the outside world only through [`ChainView`] and
//! [`EventSink`]. The implementations here are controllable from tests:
//! the chain only moves when told to, and every emitted event is kept.
//!
//! [`ChainView`]: trappist_types::ChainView
//! [`EventSink`]: trappist_types::EventSink

pub mod chain;
pub mod events;

pub use chain::NullChain;
pub use events::RecordingEventSink;
