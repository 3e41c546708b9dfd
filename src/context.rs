//! Wiring of backend, storage, cache and repositories.

use std::sync::Arc;

use crate::backend::{Backend, LocalStorage, ObjectStorage};
use crate::cache::TtlCache;
use crate::repository::{
    AssessmentRepository, DocumentRepository, LookupRepository, SharedBackend, TableRepository,
};
use crate::types::config::Config;
use crate::types::records::{IncidentReport, LookupItem, PersonnelRole, QualityIndicator};
#[cfg(feature = "sqlite")]
use crate::QmsResult;

/// Every repository of the dashboard, sharing one backend and one cache.
///
/// Build one per process, or one per request when caches must not be shared.
#[derive(Clone)]
pub struct QmsContext {
    pub assessments: AssessmentRepository,
    pub documents: DocumentRepository,
    pub incidents: TableRepository<IncidentReport>,
    pub personnel: TableRepository<PersonnelRole>,
    pub indicators: TableRepository<QualityIndicator>,
    pub lookups: LookupRepository,
    pub cache: Arc<TtlCache<Vec<LookupItem>>>,
    backend: SharedBackend,
}

impl QmsContext {
    /// Builds the context on explicit collaborators.
    pub fn new(
        config: &Config,
        backend: Arc<dyn Backend>,
        storage: Arc<dyn ObjectStorage>,
        cache: Arc<TtlCache<Vec<LookupItem>>>,
    ) -> Self {
        let assessments = AssessmentRepository::new(backend.clone())
            .with_table(config.assessment.evaluation_table.clone())
            .with_precision(config.assessment.score_precision);

        Self {
            assessments,
            documents: DocumentRepository::new(backend.clone(), storage),
            incidents: TableRepository::new(backend.clone()),
            personnel: TableRepository::new(backend.clone()),
            indicators: TableRepository::new(backend.clone()),
            lookups: LookupRepository::new(backend.clone(), cache.clone(), config.cache.lookup_ttl()),
            cache,
            backend,
        }
    }

    /// Opens the SQLite database and local storage named in `config`.
    #[cfg(feature = "sqlite")]
    pub fn open(config: &Config) -> QmsResult<Self> {
        use crate::backend::SqliteBackend;

        let backend = Arc::new(SqliteBackend::open(&config.backend.db_path)?);
        let storage = Arc::new(LocalStorage::new(
            config.backend.storage_dir.clone(),
            config.backend.public_base_url.clone(),
        ));
        let cache = Arc::new(TtlCache::new(config.cache.capacity));

        tracing::debug!(db = %config.backend.db_path.display(), "Context opened");

        Ok(Self::new(config, backend, storage, cache))
    }

    /// Context on an in-memory backend, storing files under the configured directory.
    pub fn in_memory(config: &Config) -> Self {
        let backend = Arc::new(crate::backend::MemoryBackend::new());
        let storage = Arc::new(LocalStorage::new(
            config.backend.storage_dir.clone(),
            config.backend.public_base_url.clone(),
        ));
        let cache = Arc::new(TtlCache::new(config.cache.capacity));
        Self::new(config, backend, storage, cache)
    }

    /// Name of the underlying backend.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::LookupTable;
    use crate::types::evaluation::EvaluationRow;

    #[tokio::test]
    async fn test_in_memory_context() {
        let config = Config::default_config();
        let ctx = QmsContext::in_memory(&config);

        assert_eq!(ctx.backend_name(), "memory");

        ctx.assessments
            .insert_rows(&[EvaluationRow::new("P1", "A1.1").with_level("Mức 2")])
            .await
            .unwrap();
        let summaries = ctx.assessments.list_summaries().await.unwrap();
        assert_eq!(summaries[0].score, 2.0);

        ctx.lookups.get(LookupTable::Departments).await.unwrap();
        assert_eq!(ctx.cache.stats().size, 1);

        ctx.lookups.reset();
        assert_eq!(ctx.cache.stats().size, 0);
    }
}
