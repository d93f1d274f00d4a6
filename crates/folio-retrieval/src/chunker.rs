//! Overlapping chunks over page text, split at paragraph, line and word
//! boundaries before falling back to characters.

use folio_types::RagConfig;
use text_splitter::{ChunkConfig, TextSplitter};
use tracing::debug;

use crate::loader::PageText;

#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl From<&RagConfig> for ChunkingConfig {
    fn from(config: &RagConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        }
    }
}

impl ChunkingConfig {
    /// Overlap must stay below the size; otherwise half the size is shared
    fn splitter(&self) -> TextSplitter<text_splitter::Characters> {
        let size = self.chunk_size.max(1);
        let overlap = if self.chunk_overlap < size {
            self.chunk_overlap
        } else {
            size / 2
        };
        let config = ChunkConfig::new(size)
            .with_overlap(overlap)
            .unwrap_or_else(|_| ChunkConfig::new(size));
        TextSplitter::new(config)
    }
}

/// A chunk of page text, before provenance is attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageChunk {
    pub page: u32,
    pub content: String,
}

/// Split every page into overlapping chunks. Chunks never span pages, so
/// each keeps a single page number. Output order is page order.
pub fn chunk_pages(pages: &[PageText], config: &ChunkingConfig) -> Vec<PageChunk> {
    let splitter = config.splitter();
    let mut chunks = Vec::new();

    for page in pages {
        for content in splitter.chunks(&page.text) {
            let content = content.trim();
            if content.is_empty() {
                continue;
            }
            chunks.push(PageChunk {
                page: page.page,
                content: content.to_string(),
            });
        }
    }

    debug!(
        pages = pages.len(),
        chunk_count = chunks.len(),
        chunk_size = config.chunk_size,
        "Pages chunked"
    );
    chunks
}
