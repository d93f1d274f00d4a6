use anyhow::Result;
use async_trait::async_trait;
use folio_llm::EmbeddingClient;
use std::sync::atomic::{AtomicUsize, Ordering};

const DIMS: usize = 32;

/// Bag-of-words embedder: each token lands in one of `DIMS` buckets
#[derive(Default)]
pub struct HashingEmbedder {
    pub batch_calls: AtomicUsize,
    pub query_calls: AtomicUsize,
}

impl HashingEmbedder {
    pub fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0; DIMS];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let bucket = token
                .to_lowercase()
                .bytes()
                .fold(7usize, |h, b| h.wrapping_mul(31).wrapping_add(b as usize));
            v[bucket % DIMS] += 1.0;
        }
        v
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingClient for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }
}

pub fn legal_text() -> String {
    let mut text = String::new();
    text.push_str("Article 121. Homicide: killing someone carries a penalty of six to twenty years of imprisonment. ");
    text.push_str("Article 155. Theft: taking movable property of another carries a penalty of one to four years and a fine. ");
    text.push_str("Article 157. Robbery: theft committed with violence carries a penalty of four to ten years. ");
    text.push_str("Article 171. Fraud: obtaining unlawful advantage by deceit carries a penalty of one to five years. ");
    // Long enough to produce several windows
    for i in 0..20 {
        text.push_str(&format!("Paragraph {} restates general provisions on procedure and jurisdiction. ", i));
    }
    text
}
