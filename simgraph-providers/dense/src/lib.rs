//! Dense node features loaded from Arrow and Parquet into contiguous storage.
//!
//! [`DenseMatrixProvider`] implements [`simgraph_core::VectorSource`], so it
//! can back a [`simgraph_core::VectorSimilarity`] directly.

mod errors;
mod ingest;
mod provider;

pub use errors::DenseMatrixProviderError;
pub use provider::DenseMatrixProvider;

#[cfg(test)]
mod tests;
