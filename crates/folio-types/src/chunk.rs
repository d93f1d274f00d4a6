use serde::{Deserialize, Serialize};

/// A bounded slice of a document's text with its provenance.
///
/// Immutable once created; addressed by `(doc_id, chunk_index)` and owned by
/// `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub doc_id: String,
    pub user_id: String,
    pub chunk_index: u32,
    pub file_name: String,
    pub page: u32,
    pub content: String,
}

impl Chunk {
    /// Citation header used when rendering context
    pub fn citation(&self) -> String {
        format!("[Source: {}, page {}]", self.file_name, self.page)
    }

    /// First `max_chars` characters of the content
    pub fn excerpt(&self, max_chars: usize) -> &str {
        match self.content.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => &self.content[..byte_idx],
            None => &self.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(content: &str) -> Chunk {
        Chunk {
            doc_id: "h1".to_string(),
            user_id: "u1".to_string(),
            chunk_index: 0,
            file_name: "penal_code.pdf".to_string(),
            page: 3,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_citation() {
        assert_eq!(chunk("x").citation(), "[Source: penal_code.pdf, page 3]");
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        let c = chunk("ação penal");
        assert_eq!(c.excerpt(3), "açã");
        assert_eq!(c.excerpt(100), "ação penal");
    }
}
