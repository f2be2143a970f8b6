//! Services that sit beside the repository layer.

pub mod id_source;

#[cfg(feature = "http-server")]
pub use id_source::RandomIdSource;
pub use id_source::{FixedIdSource, IdSource, SequenceIdSource};
