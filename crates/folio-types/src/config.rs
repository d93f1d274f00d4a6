use serde::{Deserialize, Serialize};

/// Runner guardrails
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Upper bound on node transitions per run
    pub max_iterations: usize,
    /// Capacity of the event channel between runner and consumer
    pub event_buffer: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_iterations: 64,
            event_buffer: 1000,
        }
    }
}

impl GraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_event_buffer(mut self, size: usize) -> Self {
        self.event_buffer = size;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl LLMConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: Some(0.0),
            max_tokens: None,
        }
    }
}

/// Retrieval, grading and memory tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub embed_batch_size: usize,
    /// Lexical top-k
    pub lexical_k: usize,
    /// Dense top-k
    pub dense_k: usize,
    /// Results kept after fusion
    pub fused_top_n: usize,
    /// RRF smoothing constant
    pub rrf_k: f32,
    pub lexical_weight: f32,
    pub dense_weight: f32,
    pub grade_excerpt_chars: usize,
    /// Inclusive lower bound for skipping the corrective retry
    pub confidence_threshold: f32,
    pub retry_budget: u32,
    /// Compact once human turns exceed this
    pub summarize_after_turns: usize,
    /// Messages kept verbatim after compaction
    pub keep_recent_messages: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            embed_batch_size: 50,
            lexical_k: 3,
            dense_k: 4,
            fused_top_n: 4,
            rrf_k: 60.0,
            lexical_weight: 1.0,
            dense_weight: 2.0,
            grade_excerpt_chars: 1000,
            confidence_threshold: 0.25,
            retry_budget: 1,
            summarize_after_turns: 3,
            keep_recent_messages: 2,
        }
    }
}

impl RagConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chunking(mut self, size: usize, overlap: usize) -> Self {
        self.chunk_size = size;
        self.chunk_overlap = overlap;
        self
    }

    pub fn with_embed_batch_size(mut self, size: usize) -> Self {
        self.embed_batch_size = size;
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_retry_budget(mut self, budget: u32) -> Self {
        self.retry_budget = budget;
        self
    }

    pub fn with_summarize_after_turns(mut self, turns: usize) -> Self {
        self.summarize_after_turns = turns;
        self
    }
}
