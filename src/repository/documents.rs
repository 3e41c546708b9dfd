//! Quality documents with an uploaded file.

use std::sync::Arc;

use crate::backend::{BackendResult, ObjectStorage};
use crate::types::records::Document;

use super::{SharedBackend, TableRepository};

/// Storage bucket of document files.
pub const DOCUMENT_BUCKET: &str = "documents";

/// Documents table plus the bucket holding their files.
#[derive(Clone)]
pub struct DocumentRepository {
    table: TableRepository<Document>,
    storage: Arc<dyn ObjectStorage>,
}

impl DocumentRepository {
    /// Creates a repository over the documents table and `storage`.
    pub fn new(backend: SharedBackend, storage: Arc<dyn ObjectStorage>) -> Self {
        Self {
            table: TableRepository::new(backend),
            storage,
        }
    }

    /// Plain CRUD access to the documents table.
    pub fn table(&self) -> &TableRepository<Document> {
        &self.table
    }

    /// Uploads the file, then stores the document row pointing at its public URL.
    ///
    /// If the row insert fails the uploaded object stays in storage.
    pub async fn upload_and_create(
        &self,
        mut document: Document,
        file_name: &str,
        bytes: &[u8],
    ) -> BackendResult<Document> {
        let stored = self
            .storage
            .upload(DOCUMENT_BUCKET, file_name, bytes)
            .await?;

        document.file_path = Some(stored.path);
        document.file_url = Some(stored.public_url);

        self.table.create(&document).await
    }
}
