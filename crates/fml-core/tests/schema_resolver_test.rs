//! Integration tests for schema resolution by collaborators

use async_trait::async_trait;
use dashmap::DashMap;
use fml_core::{
    InMemorySchemaResolver, SchemaDefinition, SchemaResolver, parse, resolve_parameters, serialize,
};
use serde_json::json;
use std::sync::Arc;

const SOURCE: &str = r#"map "http://example.org/map/patient" = patient

uses "http://example.org/fhir/StructureDefinition/Patient" as source
uses "http://example.org/fhir/StructureDefinition/Person" alias Who as target

group patient(source src : Patient, target tgt : Who) {
  src.name -> tgt.name;
}
"#;

/// Resolver that records every lookup it serves
#[derive(Default)]
struct RecordingResolver {
    inner: InMemorySchemaResolver,
    lookups: DashMap<String, usize>,
}

#[async_trait]
impl SchemaResolver for RecordingResolver {
    async fn resolve(&self, url: &str, version: Option<&str>) -> Option<Arc<SchemaDefinition>> {
        *self.lookups.entry(url.to_string()).or_insert(0) += 1;
        self.inner.resolve(url, version).await
    }
}

#[tokio::test]
async fn test_parameters_resolve_by_url_segment_and_alias() {
    let resolver = RecordingResolver::default();
    for name in ["Patient", "Person"] {
        resolver.inner.insert(
            SchemaDefinition::from_json(json!({
                "url": format!("http://example.org/fhir/StructureDefinition/{name}"),
                "name": name,
            }))
            .unwrap(),
        );
    }

    let mut document = parse(SOURCE).unwrap();
    assert_eq!(resolve_parameters(&resolver, &mut document).await, 2);

    let parameters = &document.groups[0].parameters;
    let names: Vec<_> = parameters
        .iter()
        .map(|parameter| {
            parameter
                .resolved
                .as_ref()
                .and_then(|resolved| resolved.definition.name.clone())
        })
        .collect();
    assert_eq!(names, [Some("Patient".to_string()), Some("Person".to_string())]);
    assert_eq!(resolver.lookups.len(), 2);

    assert_eq!(serialize(&document), SOURCE);
}

#[tokio::test]
async fn test_unknown_schemas_are_not_errors() {
    let resolver = InMemorySchemaResolver::new();
    let mut document = parse(SOURCE).unwrap();
    assert_eq!(resolve_parameters(&resolver, &mut document).await, 0);
    assert!(
        document.groups[0]
            .parameters
            .iter()
            .all(|parameter| parameter.resolved.is_none())
    );
}

#[tokio::test]
async fn test_resolver_is_shareable_across_tasks() {
    let resolver = Arc::new(InMemorySchemaResolver::new());
    resolver.insert(
        SchemaDefinition::new("http://example.org/A", json!({})).with_version("1.0.0"),
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            tokio::spawn(async move {
                resolver
                    .resolve("http://example.org/A", Some("1.0.0"))
                    .await
                    .is_some()
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap());
    }
}
