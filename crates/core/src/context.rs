//! Context providers registry and aggregation.

use crate::error::AssistantError;
use crate::interfaces::{ContextCollector, ContextProvider};
use crate::types::ContextData;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Zero-argument constructor for a context provider.
pub type ProviderFactory = Arc<dyn Fn() -> Box<dyn ContextProvider> + Send + Sync>;

/// Creates context providers from symbolic names.
///
/// Populated once at startup; later registrations under the same name
/// replace earlier ones.
#[derive(Clone, Default)]
pub struct ContextProviderRegistry {
    factories: HashMap<String, ProviderFactory>,
}

impl ContextProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn ContextProvider> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn ContextProvider>, AssistantError> {
        match self.factories.get(name) {
            Some(factory) => Ok(factory()),
            None => Err(AssistantError::UnknownProvider {
                name: name.to_string(),
                available: self.names(),
            }),
        }
    }

    /// Create providers in exactly the requested order.
    pub fn create_many<I, S>(&self, names: I) -> Result<Vec<Box<dyn ContextProvider>>, AssistantError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| self.create(name.as_ref()))
            .collect()
    }
}

/// Runs providers in order and merges their fields under
/// `"{provider}.{field}"` keys. Later providers win on collision.
pub struct CompositeContextCollector {
    providers: Vec<Box<dyn ContextProvider>>,
}

impl CompositeContextCollector {
    pub fn new(providers: Vec<Box<dyn ContextProvider>>) -> Self {
        Self { providers }
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }
}

#[async_trait]
impl ContextCollector for CompositeContextCollector {
    async fn collect(&self) -> Result<ContextData, AssistantError> {
        let mut merged = ContextData::new();
        for provider in &self.providers {
            let started = Instant::now();
            let values = provider.collect().await?;
            debug!(
                provider = provider.name(),
                fields = values.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Context provider collected"
            );
            for (field, value) in values {
                merged.insert(format!("{}.{}", provider.name(), field), value);
            }
        }
        Ok(merged)
    }
}

/// Current UTC time.
#[derive(Debug, Clone, Default)]
pub struct TimestampContextProvider;

#[async_trait]
impl ContextProvider for TimestampContextProvider {
    fn name(&self) -> &str {
        "timestamp"
    }

    async fn collect(&self) -> Result<ContextData, AssistantError> {
        let now = Utc::now();
        let mut values = ContextData::new();
        values.insert("iso_utc".to_string(), now.to_rfc3339());
        values.insert("epoch_seconds".to_string(), now.timestamp().to_string());
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticProvider {
        name: &'static str,
        values: Vec<(&'static str, &'static str)>,
    }

    #[async_trait]
    impl ContextProvider for StaticProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn collect(&self) -> Result<ContextData, AssistantError> {
            Ok(self
                .values
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect())
        }
    }

    fn provider(
        name: &'static str,
        values: Vec<(&'static str, &'static str)>,
    ) -> Box<dyn ContextProvider> {
        Box::new(StaticProvider { name, values })
    }

    #[tokio::test]
    async fn test_collector_namespaces_fields() {
        let collector = CompositeContextCollector::new(vec![
            provider("alpha", vec![("one", "1"), ("two", "2")]),
            provider("beta", vec![("one", "b1")]),
        ]);
        let merged = collector.collect().await.unwrap();
        assert_eq!(merged.len(), 3);
        assert_eq!(merged["alpha.one"], "1");
        assert_eq!(merged["alpha.two"], "2");
        assert_eq!(merged["beta.one"], "b1");
    }

    #[tokio::test]
    async fn test_collector_later_provider_wins_on_collision() {
        let collector = CompositeContextCollector::new(vec![
            provider("same", vec![("field", "first")]),
            provider("same", vec![("field", "second")]),
        ]);
        let merged = collector.collect().await.unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged["same.field"], "second");
    }

    #[tokio::test]
    async fn test_collector_empty_provider_contributes_nothing() {
        let collector = CompositeContextCollector::new(vec![
            provider("empty", vec![]),
            provider("full", vec![("k", "v")]),
        ]);
        let merged = collector.collect().await.unwrap();
        assert_eq!(merged.len(), 1);
        assert!(merged.contains_key("full.k"));
    }

    #[test]
    fn test_registry_unknown_provider_lists_sorted_names() {
        let mut registry = ContextProviderRegistry::new();
        registry.register("timestamp", || Box::new(TimestampContextProvider));
        registry.register("alpha", || provider("alpha", vec![]));

        let err = registry.create("missing").err().unwrap();
        match err {
            AssistantError::UnknownProvider { name, available } => {
                assert_eq!(name, "missing");
                assert_eq!(available, vec!["alpha", "timestamp"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_registry_create_many_preserves_order() {
        let mut registry = ContextProviderRegistry::new();
        registry.register("a", || provider("a", vec![]));
        registry.register("b", || provider("b", vec![]));
        registry.register("c", || provider("c", vec![]));

        let providers = registry.create_many(["c", "a", "b"]).unwrap();
        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_registry_last_registration_wins() {
        let mut registry = ContextProviderRegistry::new();
        registry.register("clock", || Box::new(TimestampContextProvider));
        registry.register("clock", || provider("override", vec![]));

        let created = registry.create("clock").unwrap();
        assert_eq!(created.name(), "override");
        assert_eq!(registry.names(), vec!["clock"]);
    }

    #[tokio::test]
    async fn test_timestamp_provider_fields() {
        let values = TimestampContextProvider.collect().await.unwrap();
        assert!(values.contains_key("iso_utc"));
        let epoch: i64 = values["epoch_seconds"].parse().unwrap();
        assert!(epoch > 0);
    }
}
