//! Vectorized environments.
//!
//! `Serial` runs several multi-agent environments one after another inside a
//! single call and exposes them as one flat batch of agents. No threads are
//! spawned; batching lives in the environments' own buffers.

mod serial;

pub use serial::Serial;
