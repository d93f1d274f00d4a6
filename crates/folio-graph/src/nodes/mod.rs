pub mod ingestion;
pub mod retrieval;
pub mod answer;

pub use ingestion::{CheckIngestedNode, DocumentIngestionNode, SetDocIdNode};
pub use retrieval::{GradeNode, QueryRewriteNode, RetrieveNode, TransformQueryNode};
pub use answer::{AssembleContextNode, GenerateNode, SummarizeNode};
