//! Reference tables read through the TTL cache.

use std::sync::Arc;
use std::time::Duration;

use crate::backend::BackendResult;
use crate::cache::{keys, TtlCache};
use crate::types::records::LookupItem;

use super::{decode, encode, SharedBackend};

/// Reference tables that rarely change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupTable {
    Departments,
    Positions,
    IndicatorGroups,
    Criteria,
}

impl LookupTable {
    /// Every lookup table.
    pub const ALL: [LookupTable; 4] = [
        LookupTable::Departments,
        LookupTable::Positions,
        LookupTable::IndicatorGroups,
        LookupTable::Criteria,
    ];

    /// Backend table name.
    pub fn table(self) -> &'static str {
        match self {
            LookupTable::Departments => "khoa_phong",
            LookupTable::Positions => "chuc_vu",
            LookupTable::IndicatorGroups => "nhom_chi_so",
            LookupTable::Criteria => "tieu_chi",
        }
    }

    /// Cache key of the table.
    pub fn cache_key(self) -> &'static str {
        match self {
            LookupTable::Departments => keys::DEPARTMENTS,
            LookupTable::Positions => keys::POSITIONS,
            LookupTable::IndicatorGroups => keys::INDICATOR_GROUPS,
            LookupTable::Criteria => keys::CRITERIA,
        }
    }
}

impl std::fmt::Display for LookupTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupTable::Departments => write!(f, "departments"),
            LookupTable::Positions => write!(f, "positions"),
            LookupTable::IndicatorGroups => write!(f, "indicator_groups"),
            LookupTable::Criteria => write!(f, "criteria"),
        }
    }
}

/// Lookup reads go through an injected cache; writes invalidate the table's key.
#[derive(Clone)]
pub struct LookupRepository {
    backend: SharedBackend,
    cache: Arc<TtlCache<Vec<LookupItem>>>,
    ttl: Duration,
}

impl LookupRepository {
    /// Creates a repository using `cache` with entries living for `ttl`.
    pub fn new(backend: SharedBackend, cache: Arc<TtlCache<Vec<LookupItem>>>, ttl: Duration) -> Self {
        Self {
            backend,
            cache,
            ttl,
        }
    }

    /// Items of a lookup table, from the cache while fresh.
    pub async fn get(&self, table: LookupTable) -> BackendResult<Vec<LookupItem>> {
        let backend = self.backend.clone();
        self.cache
            .cached_fetch(
                table.cache_key(),
                move || async move {
                    let rows = backend.select_all(table.table()).await?;
                    decode::<LookupItem>(rows)
                },
                self.ttl,
            )
            .await
    }

    /// Adds an item and drops the cached table.
    pub async fn add(&self, table: LookupTable, item: &LookupItem) -> BackendResult<LookupItem> {
        let stored = self.backend.insert(table.table(), encode(item)?).await?;
        self.cache.invalidate(table.cache_key());
        Ok(serde_json::from_value(stored)?)
    }

    /// Removes an item and drops the cached table.
    pub async fn remove(&self, table: LookupTable, id: &str) -> BackendResult<()> {
        self.backend.delete_by_id(table.table(), id).await?;
        self.cache.invalidate(table.cache_key());
        Ok(())
    }

    /// Drops every cached lookup table.
    pub fn refresh_all(&self) {
        self.cache.invalidate_by_prefix(keys::LOOKUP_PREFIX);
    }

    /// Empties the whole cache, e.g. on logout.
    pub fn reset(&self) {
        self.cache.clear_all();
    }
}
