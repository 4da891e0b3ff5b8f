pub mod error;
pub mod ingest;
pub mod repository;
