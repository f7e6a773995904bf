//! Priority-ordered handler dispatch keyed by exact strings or patterns
//!
//! A [`PriorityChain`] orders handlers by priority. A
//! [`PatternDispatchRegistry`] owns one chain per key and answers which chains
//! apply to a candidate string. Nothing here ever calls a handler.
//!
//! ```rust
//! use interpol::dispatch::{DispatchKey, PatternDispatchRegistry};
//!
//! let mut registry = PatternDispatchRegistry::new();
//! registry.register(DispatchKey::exact("hei"), "X", 0).unwrap();
//! registry.register(DispatchKey::pattern("h.i"), "Y", 100).unwrap();
//!
//! let handlers: Vec<_> = registry.flatten("hei").collect();
//! assert_eq!(handlers, [&"X", &"Y"]);
//! ```

mod chain;
mod registry;
mod shared;

pub use chain::{EntryId, HandlerEntry, Iter, PriorityChain};
pub use registry::{DispatchError, DispatchKey, PatternDispatchRegistry};
pub use shared::SharedRegistry;
