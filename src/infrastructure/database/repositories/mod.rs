//! Database repository implementations
//!
//! One generic SeaORM repository over the documents table + unified
//! RepositoryProvider.

pub mod document_repository;
pub mod repository_provider;

pub use document_repository::SeaOrmDocumentRepository;
pub use repository_provider::SeaOrmRepositoryProvider;
