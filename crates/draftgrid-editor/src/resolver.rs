//! Record-field resolution for lookup display names
//!
//! [`CachedResolver`] fronts any [`RecordResolver`] with a `moka` cache keyed
//! by `(record id, field)`, so re-rendering a grid full of lookups does not
//! re-fetch the same names.

use crate::error::ResolveError;
use async_trait::async_trait;
use draftgrid_model::{FieldValue, RecordId};
use moka::future::Cache;
use std::sync::Arc;

/// Resolves one field of a referenced record
#[async_trait]
pub trait RecordResolver: Send + Sync {
    /// Value of `field` on record `id`; `Ok(None)` when the record has no such field
    async fn resolve_field(
        &self,
        id: &RecordId,
        field: &str,
    ) -> Result<Option<FieldValue>, ResolveError>;
}

#[async_trait]
impl<R: RecordResolver + ?Sized> RecordResolver for Arc<R> {
    async fn resolve_field(
        &self,
        id: &RecordId,
        field: &str,
    ) -> Result<Option<FieldValue>, ResolveError> {
        (**self).resolve_field(id, field).await
    }
}

/// Caching wrapper around a resolver
///
/// Only successful resolutions are cached.
#[derive(Debug, Clone)]
pub struct CachedResolver<R> {
    inner: R,
    cache: Cache<(RecordId, String), Option<FieldValue>>,
}

impl<R: RecordResolver> CachedResolver<R> {
    /// Wrap `inner` with a cache of `max_capacity` entries
    #[inline]
    #[must_use]
    pub fn new(inner: R, max_capacity: u64) -> Self {
        Self {
            inner,
            cache: Cache::new(max_capacity),
        }
    }

    /// Forget one cached field
    #[inline]
    pub async fn invalidate(&self, id: &RecordId, field: &str) {
        self.cache.invalidate(&(id.clone(), field.to_string())).await;
    }

    /// Forget everything
    #[inline]
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Approximate entry count
    #[inline]
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[async_trait]
impl<R: RecordResolver> RecordResolver for CachedResolver<R> {
    async fn resolve_field(
        &self,
        id: &RecordId,
        field: &str,
    ) -> Result<Option<FieldValue>, ResolveError> {
        let key = (id.clone(), field.to_string());
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let resolved = self.inner.resolve_field(id, field).await?;
        self.cache.insert(key, resolved.clone()).await;
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingResolver {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RecordResolver for CountingResolver {
        async fn resolve_field(
            &self,
            id: &RecordId,
            field: &str,
        ) -> Result<Option<FieldValue>, ResolveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match (id.as_str(), field) {
                ("001X", "Name") => Ok(Some(FieldValue::from("Acme"))),
                ("down", _) => Err(ResolveError::Unavailable("offline".to_string())),
                _ => Ok(None),
            }
        }
    }

    #[tokio::test]
    async fn cached_resolver_hits_inner_once() {
        let inner = Arc::new(CountingResolver::default());
        let resolver = CachedResolver::new(Arc::clone(&inner), 100);
        let id = RecordId::new("001X");

        for _ in 0..3 {
            let name = resolver.resolve_field(&id, "Name").await.unwrap();
            assert_eq!(name, Some(FieldValue::from("Acme")));
        }
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cached_resolver_does_not_cache_errors() {
        let inner = Arc::new(CountingResolver::default());
        let resolver = CachedResolver::new(Arc::clone(&inner), 100);
        let id = RecordId::new("down");

        assert!(resolver.resolve_field(&id, "Name").await.is_err());
        assert!(resolver.resolve_field(&id, "Name").await.is_err());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let inner = Arc::new(CountingResolver::default());
        let resolver = CachedResolver::new(Arc::clone(&inner), 100);
        let id = RecordId::new("001X");

        resolver.resolve_field(&id, "Name").await.unwrap();
        resolver.invalidate(&id, "Name").await;
        resolver.resolve_field(&id, "Name").await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }
}
