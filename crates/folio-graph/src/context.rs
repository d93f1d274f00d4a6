use folio_types::Chunk;

/// Render chunks, in retrieval order, each under its citation header and
/// separated by a blank line. Empty input gives an empty block.
pub fn assemble_context(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(|c| format!("{}\n{}", c.citation(), c.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(page: u32, content: &str) -> Chunk {
        Chunk {
            doc_id: "h1".to_string(),
            user_id: "u1".to_string(),
            chunk_index: page,
            file_name: "code.pdf".to_string(),
            page,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_assemble_in_order_with_citations() {
        let context = assemble_context(&[chunk(2, "Art. 121"), chunk(0, "Art. 1")]);
        assert_eq!(
            context,
            "[Source: code.pdf, page 2]\nArt. 121\n\n[Source: code.pdf, page 0]\nArt. 1"
        );
    }

    #[test]
    fn test_empty() {
        assert_eq!(assemble_context(&[]), "");
    }
}
