//! Simgraph core library: approximate k-nearest-neighbour similarity graphs
//! built with NN-Descent.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod bounded_k;
mod config;
mod error;
mod graph;
mod hooks;
mod knn;
mod neighbour_list;
mod partition;
mod result;
mod rng;
mod sampler;
mod similarity;
mod termination;

#[cfg(test)]
mod test_utils;

pub use crate::{
    bounded_k::BoundedK,
    config::{KnnConfig, KnnConfigBuilder},
    error::{
        GraphError, GraphErrorCode, KnnError, KnnErrorCode, Result, SimilarityError,
        SimilarityErrorCode,
    },
    graph::{AdjacencyGraph, GraphView, NodesOnly},
    hooks::{NeighbourConsumer, NoopConsumer, NoopProgress, ProgressTracker, TracingProgress},
    knn::{AllNodes, FilteredKnn, Knn, NodeFilter},
    neighbour_list::{Neighbour, NeighbourList},
    partition::{Partition, range_partition},
    result::{KnnResult, SimilarityResult, SimilaritySummary},
    sampler::SamplerKind,
    similarity::{
        AverageSimilarity, DenseVectors, FnNeighbourFilter, FnSimilarity, KnnNeighbourFilter,
        NeighbourFilter, ScalarSimilarity, SetMetric, SetSimilarity, SimilarityComputer,
        SimilarityFunction, VectorMetric, VectorSimilarity, VectorSource, cosine_similarity,
        euclidean_similarity, jaccard_similarity, overlap_similarity, pearson_similarity,
        scalar_similarity,
    },
    termination::TerminationFlag,
};
