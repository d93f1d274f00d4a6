pub mod ask;
pub mod stream;
