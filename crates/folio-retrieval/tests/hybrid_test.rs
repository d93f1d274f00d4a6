mod common;

use common::HashingEmbedder;
use folio_persist::{InMemoryPersistenceClient, PersistenceClient};
use folio_retrieval::{HybridRetriever, InMemoryVectorIndex, VectorEntry, VectorIndex};
use folio_types::{Chunk, RagConfig};
use std::sync::Arc;

const ARTICLES: [&str; 6] = [
    "Homicide: killing someone carries a penalty of six to twenty years of imprisonment.",
    "Theft: taking movable property of another carries a penalty of one to four years.",
    "Robbery: theft committed with violence carries a penalty of four to ten years.",
    "Fraud: obtaining unlawful advantage by deceit carries a penalty of one to five years.",
    "Bodily injury: offending the physical integrity of another, three months to one year.",
    "Defamation: attributing an offensive fact to someone, three months to one year.",
];

async fn seeded(user_id: &str, doc_id: &str) -> HybridRetriever {
    let store = Arc::new(InMemoryPersistenceClient::new());
    let vectors = Arc::new(InMemoryVectorIndex::new());

    let chunks: Vec<Chunk> = ARTICLES
        .iter()
        .enumerate()
        .map(|(i, text)| Chunk {
            doc_id: doc_id.to_string(),
            user_id: user_id.to_string(),
            chunk_index: i as u32,
            file_name: "penal_code.pdf".to_string(),
            page: i as u32,
            content: text.to_string(),
        })
        .collect();

    let entries = chunks
        .iter()
        .cloned()
        .map(|chunk| VectorEntry {
            vector: HashingEmbedder::vector(&chunk.content),
            chunk,
        })
        .collect();
    vectors.upsert("penal_code", entries).await.unwrap();
    store.insert_chunks(chunks).await.unwrap();

    HybridRetriever::new(
        Arc::new(HashingEmbedder::default()),
        vectors,
        store,
        &RagConfig::default(),
    )
}

#[tokio::test]
async fn test_returns_at_most_four_including_match() {
    let retriever = seeded("u1", "h1").await;

    let results = retriever
        .retrieve("What is the penalty for homicide?", &["h1".to_string()], "u1", "penal_code")
        .await
        .unwrap();

    assert!(!results.is_empty());
    assert!(results.len() <= 4);
    assert!(results.iter().any(|c| c.content.starts_with("Homicide")));
}

#[tokio::test]
async fn test_results_are_unique_by_content() {
    let retriever = seeded("u1", "h1").await;

    let results = retriever
        .retrieve("theft penalty years", &["h1".to_string()], "u1", "penal_code")
        .await
        .unwrap();

    let mut contents: Vec<&str> = results.iter().map(|c| c.content.as_str()).collect();
    let total = contents.len();
    contents.sort();
    contents.dedup();
    assert_eq!(contents.len(), total);
}

#[tokio::test]
async fn test_empty_doc_ids_short_circuits() {
    let retriever = seeded("u1", "h1").await;
    let results = retriever
        .retrieve("homicide", &[], "u1", "penal_code")
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_other_owner_sees_nothing() {
    let retriever = seeded("u1", "h1").await;
    let results = retriever
        .retrieve("homicide penalty", &["h1".to_string()], "u2", "penal_code")
        .await
        .unwrap();
    assert!(results.is_empty());
}
