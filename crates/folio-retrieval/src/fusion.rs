//! Reciprocal Rank Fusion (RRF) across lexical and dense rankings.
//!
//! A chunk at 0-indexed rank `r` contributes `weight / (k + r + 1)`. Chunks are
//! keyed by content, so a passage found by both strategies sums both shares.

use folio_types::{Chunk, RagConfig};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct RrfFusion {
    /// Smoothing constant
    pub k: f32,
    pub lexical_weight: f32,
    pub dense_weight: f32,
}

impl Default for RrfFusion {
    fn default() -> Self {
        Self {
            k: 60.0,
            lexical_weight: 1.0,
            dense_weight: 2.0,
        }
    }
}

impl From<&RagConfig> for RrfFusion {
    fn from(config: &RagConfig) -> Self {
        Self {
            k: config.rrf_k,
            lexical_weight: config.lexical_weight,
            dense_weight: config.dense_weight,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FusedChunk {
    pub chunk: Chunk,
    pub score: f32,
}

impl RrfFusion {
    pub fn with_weights(lexical_weight: f32, dense_weight: f32) -> Self {
        Self {
            lexical_weight,
            dense_weight,
            ..Self::default()
        }
    }

    /// Fuse both rankings and keep the best `limit`. Ties keep first-seen order,
    /// lexical list first.
    pub fn fuse(&self, lexical: Vec<Chunk>, dense: Vec<Chunk>, limit: usize) -> Vec<FusedChunk> {
        let mut fused: Vec<FusedChunk> = Vec::new();
        let mut by_content: HashMap<String, usize> = HashMap::new();

        let ranked = [(lexical, self.lexical_weight), (dense, self.dense_weight)];
        for (results, weight) in ranked {
            for (rank, chunk) in results.into_iter().enumerate() {
                let contribution = weight / (self.k + rank as f32 + 1.0);

                match by_content.get(&chunk.content) {
                    Some(&i) => fused[i].score += contribution,
                    None => {
                        by_content.insert(chunk.content.clone(), fused.len());
                        fused.push(FusedChunk {
                            chunk,
                            score: contribution,
                        });
                    }
                }
            }
        }

        fused.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        fused.truncate(limit);
        fused
    }
}
