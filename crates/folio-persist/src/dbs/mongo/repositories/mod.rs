pub mod document;
pub mod thread;
pub mod usage;

pub use document::MongoDocumentRepository;
pub use thread::MongoThreadRepository;
pub use usage::MongoUsageRepository;

use mongodb::error::{ErrorKind, WriteFailure};

const DUPLICATE_KEY_CODE: i32 = 11000;

pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY_CODE,
        ErrorKind::InsertMany(e) => e
            .write_errors
            .as_ref()
            .map(|errors| errors.iter().any(|w| w.code == DUPLICATE_KEY_CODE))
            .unwrap_or(false),
        _ => false,
    }
}
