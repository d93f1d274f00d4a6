mod common;

use common::{GradeMode, ScriptedChat};
use folio_graph::{decide_to_generate, GradeDecision, RelevanceGrader};
use folio_types::{Chunk, LLMConfig, RagConfig};
use std::sync::Arc;

fn chunk(index: u32, content: &str) -> Chunk {
    Chunk {
        doc_id: "h1".to_string(),
        user_id: "u1".to_string(),
        chunk_index: index,
        file_name: "penal_code.pdf".to_string(),
        page: index,
        content: content.to_string(),
    }
}

fn grader(mode: GradeMode) -> (Arc<ScriptedChat>, RelevanceGrader) {
    let chat = Arc::new(ScriptedChat::new(mode));
    let grader = RelevanceGrader::new(chat.clone(), LLMConfig::default(), 1000);
    (chat, grader)
}

#[tokio::test]
async fn test_one_of_four_is_boundary_confidence() {
    let (chat, grader) = grader(GradeMode::Marker("MARK".to_string()));
    let chunks = vec![
        chunk(0, "Theft penalty"),
        chunk(1, "MARK homicide penalty"),
        chunk(2, "Fraud penalty"),
        chunk(3, "Robbery penalty"),
    ];

    let grading = grader.grade("penalty for killing", chunks).await.unwrap();

    assert_eq!(grading.confidence, 0.25);
    assert_eq!(grading.relevant.len(), 1);
    assert_eq!(grading.relevant[0].chunk_index, 1);
    assert_eq!(ScriptedChat::count(&chat.grades), 4);
    assert_eq!(
        decide_to_generate(grading.confidence, 0, &RagConfig::default()),
        GradeDecision::AssembleContext
    );
}

#[tokio::test]
async fn test_nothing_relevant_routes_to_transform() {
    let (_, grader) = grader(GradeMode::NoneRelevant);
    let grading = grader
        .grade("q", vec![chunk(0, "a"), chunk(1, "b")])
        .await
        .unwrap();

    assert_eq!(grading.confidence, 0.0);
    assert!(grading.relevant.is_empty());
    assert_eq!(
        decide_to_generate(grading.confidence, 0, &RagConfig::default()),
        GradeDecision::TransformQuery
    );
}

#[tokio::test]
async fn test_empty_input_grades_without_calls() {
    let (chat, grader) = grader(GradeMode::AllRelevant);
    let grading = grader.grade("q", Vec::new()).await.unwrap();

    assert_eq!(grading.confidence, 0.0);
    assert_eq!(ScriptedChat::count(&chat.grades), 0);
}

#[tokio::test]
async fn test_excerpt_caps_passage() {
    let chat = Arc::new(ScriptedChat::new(GradeMode::Marker("TAIL".to_string())));
    let grader = RelevanceGrader::new(chat, LLMConfig::default(), 10);

    // Marker lies beyond the excerpt, so the grader never sees it
    let long = format!("{}TAIL", "x".repeat(50));
    let grading = grader.grade("q", vec![chunk(0, &long)]).await.unwrap();
    assert!(grading.relevant.is_empty());
}
