//! Render cache: content-addressed keys and bounded LRU storage.
//!
//! Owned by the adapter layer only. Each adapter holds its own
//! [`RenderCache`]; the panel controller never touches it.

mod key;
mod store;

pub use key::{ContentHash, generate_key};
pub use store::{DEFAULT_CAPACITY, RenderCache};
