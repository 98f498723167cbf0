use super::interface::ToolProvider;
use crate::domain::types::ToolDescriptor;
use crate::infrastructure::mcp::McpClientError;
use crate::infrastructure::model::ToolDeclaration;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, warn};

pub const DEFAULT_CATALOG_TTL: Duration = Duration::from_secs(3600);

/// Fields that describe the schema document itself rather than an accepted
/// argument. Forwarding them would corrupt function-declaration translation.
const SCHEMA_META_FIELDS: &[&str] = &["$schema"];

/// Read-mostly cache of the provider's tool catalog.
///
/// Descriptors are immutable once fetched; the whole catalog is refreshed
/// when its TTL lapses. The refresh happens outside the cache lock, and a
/// failed refresh serves the stale catalog instead of failing the caller.
pub struct ToolCatalog {
    provider: Arc<dyn ToolProvider>,
    ttl: Duration,
    cached: AsyncMutex<Option<CachedCatalog>>,
}

struct CachedCatalog {
    fetched_at: Instant,
    tools: Arc<Vec<ToolDescriptor>>,
}

impl ToolCatalog {
    pub fn new(provider: Arc<dyn ToolProvider>) -> Self {
        Self {
            provider,
            ttl: DEFAULT_CATALOG_TTL,
            cached: AsyncMutex::new(None),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub async fn tools(&self) -> Result<Arc<Vec<ToolDescriptor>>, McpClientError> {
        let stale = {
            let guard = self.cached.lock().await;
            match guard.as_ref() {
                Some(entry) if entry.fetched_at.elapsed() < self.ttl => {
                    debug!(count = entry.tools.len(), "Serving cached tool catalog");
                    return Ok(entry.tools.clone());
                }
                Some(entry) => Some(entry.tools.clone()),
                None => None,
            }
        };

        match self.provider.list_tools().await {
            Ok(tools) => {
                let tools = Arc::new(tools);
                let mut guard = self.cached.lock().await;
                *guard = Some(CachedCatalog {
                    fetched_at: Instant::now(),
                    tools: tools.clone(),
                });
                Ok(tools)
            }
            Err(err) => match stale {
                Some(tools) => {
                    warn!(error = %err, "Catalog refresh failed, serving stale catalog");
                    Ok(tools)
                }
                None => Err(err),
            },
        }
    }
}

/// Translate descriptors into backend declarations, stripping schema
/// meta-fields from the argument contract.
pub fn to_declarations(tools: &[ToolDescriptor]) -> Vec<ToolDeclaration> {
    tools
        .iter()
        .map(|tool| ToolDeclaration {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: strip_schema_meta(tool.input_schema.clone()),
        })
        .collect()
}

fn strip_schema_meta(mut schema: Value) -> Value {
    match &mut schema {
        Value::Object(map) => {
            for field in SCHEMA_META_FIELDS {
                map.remove(*field);
            }
            for value in map.values_mut() {
                let owned = std::mem::take(value);
                *value = strip_schema_meta(owned);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                let owned = std::mem::take(item);
                *item = strip_schema_meta(owned);
            }
        }
        _ => {}
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        fetches: AtomicUsize,
        fail_after_first: bool,
    }

    impl CountingProvider {
        fn new(fail_after_first: bool) -> Arc<Self> {
            Arc::new(Self {
                fetches: AtomicUsize::new(0),
                fail_after_first,
            })
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ToolProvider for CountingProvider {
        async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, McpClientError> {
            let previous = self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_after_first && previous > 0 {
                return Err(McpClientError::malformed("provider unavailable"));
            }
            Ok(vec![ToolDescriptor {
                name: "search_datasets".into(),
                description: "Recherche de jeux de données".into(),
                input_schema: json!({"type": "object"}),
            }])
        }

        async fn call_tool(&self, _name: &str, _arguments: Value) -> String {
            String::new()
        }
    }

    #[tokio::test]
    async fn catalog_is_reused_within_ttl() {
        let provider = CountingProvider::new(false);
        let catalog = ToolCatalog::new(provider.clone());

        let first = catalog.tools().await.expect("first fetch");
        let second = catalog.tools().await.expect("cached fetch");
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(provider.fetches(), 1);
    }

    #[tokio::test]
    async fn expired_catalog_is_refetched() {
        let provider = CountingProvider::new(false);
        let catalog = ToolCatalog::new(provider.clone()).with_ttl(Duration::ZERO);

        catalog.tools().await.expect("first fetch");
        catalog.tools().await.expect("second fetch");
        assert_eq!(provider.fetches(), 2);
    }

    #[tokio::test]
    async fn failed_refresh_serves_stale_catalog() {
        let provider = CountingProvider::new(true);
        let catalog = ToolCatalog::new(provider.clone()).with_ttl(Duration::ZERO);

        let fresh = catalog.tools().await.expect("initial fetch");
        let stale = catalog.tools().await.expect("stale catalog served");
        assert_eq!(fresh, stale);
        assert_eq!(provider.fetches(), 2);
    }

    #[tokio::test]
    async fn failed_first_fetch_propagates() {
        struct FailingProvider;

        #[async_trait]
        impl ToolProvider for FailingProvider {
            async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, McpClientError> {
                Err(McpClientError::malformed("down"))
            }

            async fn call_tool(&self, _name: &str, _arguments: Value) -> String {
                String::new()
            }
        }

        let catalog = ToolCatalog::new(Arc::new(FailingProvider));
        assert!(catalog.tools().await.is_err());
    }

    #[test]
    fn declarations_drop_schema_meta_fields() {
        let tools: Vec<ToolDescriptor> = (0..3)
            .map(|i| ToolDescriptor {
                name: format!("tool_{i}"),
                description: "desc".into(),
                input_schema: json!({
                    "$schema": "https://json-schema.org/draft/2020-12/schema",
                    "type": "object",
                    "properties": {
                        "query": {"$schema": "nested", "type": "string"},
                    },
                }),
            })
            .collect();

        let declarations = to_declarations(&tools);
        assert_eq!(declarations.len(), 3);
        for declaration in &declarations {
            let rendered =
                serde_json::to_string(&declaration.parameters).expect("serialize parameters");
            assert!(!rendered.contains("$schema"));
            assert_eq!(declaration.parameters["type"], "object");
            assert_eq!(declaration.parameters["properties"]["query"]["type"], "string");
        }
    }
}
