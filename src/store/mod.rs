//! Alert persistence behind a trait-based abstraction.
//!
//! The pipeline only ever talks to the `AlertStore` trait: it creates alerts
//! and queries for unresolved ones during deduplication. The bundled
//! implementation keeps everything in memory; a relational backend lives
//! behind the same trait in the surrounding system.
//!
//! ## Design
//!
//! - **Trait-based**: `AlertStore` allows swapping implementations
//! - **Async**: All operations are async for compatibility with Tokio tasks
//! - **Lifecycle-aware**: acknowledge/resolve/purge operations for the
//!   surrounding system, not used by the core pipeline itself

pub mod backend;
pub mod error;
pub mod memory;

pub use backend::AlertStore;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
