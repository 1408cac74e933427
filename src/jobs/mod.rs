//! Job processing module.

mod processor;
mod store;

pub use processor::{DocumentProcessor, ProcessedDocument};
pub use store::{JobRecord, JobStore};
