use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::catalog::{CatalogSource, ResolvedVersion};
use super::pragma::VersionConstraint;
use crate::error::{EstimateError, Result};

/// Catalog answer for one key. `None` records that the catalog was fetched and did not
/// list the key.
type CacheSlot = Arc<OnceCell<Option<ResolvedVersion>>>;

/// Resolves constraints to compiler builds, memoizing per catalog key for the lifetime of
/// the resolver.
///
/// Concurrent resolutions of the same key share one catalog fetch: the first caller
/// initializes the slot and the others await it. A key absent from a successfully fetched
/// catalog is cached as a miss. A failed fetch leaves the slot empty so the next call
/// tries the network again.
pub struct VersionResolver {
    catalog: Arc<dyn CatalogSource>,
    cache: Mutex<HashMap<String, CacheSlot>>,
}

impl VersionResolver {
    pub fn new(catalog: Arc<dyn CatalogSource>) -> Self {
        Self {
            catalog,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub async fn resolve(&self, constraint: &VersionConstraint) -> Result<ResolvedVersion> {
        let key = constraint.key();
        let slot = self.slot(key);

        if let Some(cached) = slot.get() {
            debug!("Version cache hit for {}", key);
            return cached.clone().ok_or_else(|| not_found(constraint));
        }

        let resolved = slot
            .get_or_try_init(|| async {
                info!("Resolving compiler {} via {}", key, self.catalog.location());
                let catalog = self.catalog.fetch().await?;
                Ok::<_, EstimateError>(catalog.lookup(key))
            })
            .await?;

        resolved.clone().ok_or_else(|| not_found(constraint))
    }

    /// Number of keys with a settled answer, hits and misses alike.
    pub fn cached_len(&self) -> usize {
        self.cache
            .lock()
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    fn slot(&self, key: &str) -> CacheSlot {
        self.cache.lock().entry(key.to_string()).or_default().clone()
    }
}

fn not_found(constraint: &VersionConstraint) -> EstimateError {
    EstimateError::VersionNotFound {
        constraint: constraint.declared().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::StaticCatalog;

    fn constraint(declared: &str) -> VersionConstraint {
        VersionConstraint::parse(declared).unwrap()
    }

    fn catalog() -> Arc<StaticCatalog> {
        Arc::new(StaticCatalog::with_releases([(
            "0.8.19",
            "solc-linux-amd64-v0.8.19+commit.7dd6d404",
        )]))
    }

    #[tokio::test]
    async fn test_second_resolution_hits_cache() {
        let catalog = catalog();
        let resolver = VersionResolver::new(catalog.clone());

        let first = resolver.resolve(&constraint("^0.8.19")).await.unwrap();
        let second = resolver.resolve(&constraint("^0.8.19")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.build(), "v0.8.19+commit.7dd6d404");
        assert_eq!(catalog.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_prefix_variants_share_a_key() {
        let catalog = catalog();
        let resolver = VersionResolver::new(catalog.clone());

        resolver.resolve(&constraint("^0.8.19")).await.unwrap();
        resolver.resolve(&constraint("0.8.19")).await.unwrap();

        assert_eq!(catalog.fetch_count(), 1);
        assert_eq!(resolver.cached_len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_version_is_not_found_and_cached() {
        let catalog = catalog();
        let resolver = VersionResolver::new(catalog.clone());

        for _ in 0..2 {
            let err = resolver.resolve(&constraint("^0.4.99")).await.unwrap_err();
            assert!(matches!(err, EstimateError::VersionNotFound { ref constraint } if constraint == "^0.4.99"));
        }
        assert_eq!(catalog.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_outage_is_not_cached() {
        let catalog = Arc::new(StaticCatalog::unreachable());
        let resolver = VersionResolver::new(catalog.clone());

        for _ in 0..2 {
            let err = resolver.resolve(&constraint("0.8.19")).await.unwrap_err();
            assert!(matches!(err, EstimateError::CatalogUnreachable { .. }));
        }
        assert_eq!(catalog.fetch_count(), 2);
        assert_eq!(resolver.cached_len(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_resolutions_share_one_fetch() {
        let catalog = Arc::new(
            StaticCatalog::with_releases([("0.8.19", "solc-linux-amd64-v0.8.19+commit.7dd6d404")])
                .with_delay(std::time::Duration::from_millis(50)),
        );
        let resolver = Arc::new(VersionResolver::new(catalog.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let resolver = resolver.clone();
                tokio::spawn(async move { resolver.resolve(&constraint("^0.8.19")).await })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
        assert_eq!(catalog.fetch_count(), 1);
    }
}
