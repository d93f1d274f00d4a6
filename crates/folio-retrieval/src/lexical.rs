//! On-demand BM25 keyword index over a chunk set.

use folio_types::Chunk;
use std::collections::HashMap;

const K1: f32 = 1.5;
const B: f32 = 0.75;

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

struct IndexedChunk {
    chunk: Chunk,
    term_freqs: HashMap<String, u32>,
    len: usize,
}

pub struct Bm25Index {
    docs: Vec<IndexedChunk>,
    doc_freqs: HashMap<String, u32>,
    avg_len: f32,
}

impl Bm25Index {
    pub fn build(chunks: Vec<Chunk>) -> Self {
        let mut doc_freqs: HashMap<String, u32> = HashMap::new();
        let mut total_len = 0usize;

        let docs: Vec<IndexedChunk> = chunks
            .into_iter()
            .map(|chunk| {
                let tokens = tokenize(&chunk.content);
                let mut term_freqs: HashMap<String, u32> = HashMap::new();
                for token in &tokens {
                    *term_freqs.entry(token.clone()).or_insert(0) += 1;
                }
                for term in term_freqs.keys() {
                    *doc_freqs.entry(term.clone()).or_insert(0) += 1;
                }
                total_len += tokens.len();

                IndexedChunk {
                    chunk,
                    term_freqs,
                    len: tokens.len(),
                }
            })
            .collect();

        let avg_len = if docs.is_empty() {
            0.0
        } else {
            total_len as f32 / docs.len() as f32
        };

        Self {
            docs,
            doc_freqs,
            avg_len,
        }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    fn idf(&self, term: &str) -> f32 {
        let n = self.docs.len() as f32;
        let df = self.doc_freqs.get(term).copied().unwrap_or(0) as f32;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    /// Top `k` chunks sharing at least one term with the query, best first
    pub fn search(&self, query: &str, k: usize) -> Vec<Chunk> {
        let terms = tokenize(query);
        if terms.is_empty() || self.docs.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = self
            .docs
            .iter()
            .enumerate()
            .filter_map(|(i, doc)| {
                let score: f32 = terms
                    .iter()
                    .filter_map(|term| {
                        let tf = *doc.term_freqs.get(term)? as f32;
                        let norm = 1.0 - B + B * (doc.len as f32 / self.avg_len.max(1.0));
                        Some(self.idf(term) * tf * (K1 + 1.0) / (tf + K1 * norm))
                    })
                    .sum();
                (score > 0.0).then_some((i, score))
            })
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored
            .into_iter()
            .take(k)
            .map(|(i, _)| self.docs[i].chunk.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(index: u32, content: &str) -> Chunk {
        Chunk {
            doc_id: "h1".to_string(),
            user_id: "u1".to_string(),
            chunk_index: index,
            file_name: "code.pdf".to_string(),
            page: 0,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_keyword_match_ranks_first() {
        let index = Bm25Index::build(vec![
            chunk(0, "The right to property is guaranteed."),
            chunk(1, "Homicide: penalty of six to twenty years of imprisonment."),
            chunk(2, "Theft: penalty of one to four years, and a fine."),
        ]);

        let results = index.search("homicide penalty", 3);

        let order: Vec<u32> = results.iter().map(|c| c.chunk_index).collect();
        assert_eq!(order, vec![1, 2]);
    }

    #[test]
    fn test_no_overlap_is_empty() {
        let index = Bm25Index::build(vec![chunk(0, "alpha beta")]);
        assert!(index.search("gamma", 3).is_empty());
        assert!(index.search("  ?! ", 3).is_empty());
    }

    #[test]
    fn test_respects_k() {
        let index = Bm25Index::build((0..10).map(|i| chunk(i, "penalty clause")).collect());
        assert_eq!(index.search("penalty", 3).len(), 3);
        assert_eq!(index.len(), 10);
    }

    #[test]
    fn test_case_insensitive() {
        let index = Bm25Index::build(vec![chunk(0, "HABEAS CORPUS")]);
        assert_eq!(index.search("habeas", 1).len(), 1);
    }
}
