//! Schema resolution seam for collaborators
//!
//! Parsing and serialization never look up schemas. Validators and
//! generators that need to know what a group parameter refers to implement
//! [`SchemaResolver`] (or use [`InMemorySchemaResolver`]) and attach the
//! result with [`resolve_parameters`].

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::model::{Document, ResolvedElement, Structure};

/// A schema (structure definition) identified by canonical URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub url: String,
    pub version: Option<String>,
    pub name: Option<String>,
    /// Raw definition as published
    pub content: Value,
}

impl SchemaDefinition {
    pub fn new(url: impl Into<String>, content: Value) -> Self {
        Self {
            url: url.into(),
            version: None,
            name: None,
            content,
        }
    }

    /// Build a definition from its JSON, reading `url`, `version` and `name`
    ///
    /// Returns `None` when the resource carries no `url`.
    pub fn from_json(content: Value) -> Option<Self> {
        let url = content.get("url")?.as_str()?.to_string();
        let text = |key: &str| content.get(key).and_then(Value::as_str).map(str::to_string);
        let version = text("version");
        let name = text("name");
        Some(Self {
            url,
            version,
            name,
            content,
        })
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Whether an element with this path is listed in the snapshot or differential
    pub fn has_element(&self, path: &str) -> bool {
        ["snapshot", "differential"].iter().any(|view| {
            self.content
                .get(*view)
                .and_then(|view| view.get("element"))
                .and_then(Value::as_array)
                .is_some_and(|elements| {
                    elements
                        .iter()
                        .any(|element| element.get("path").and_then(Value::as_str) == Some(path))
                })
        })
    }
}

/// Asynchronous lookup of schema definitions by canonical URL
///
/// A definition that cannot be found is `None`, never an error.
#[async_trait]
pub trait SchemaResolver: Send + Sync {
    async fn resolve(&self, url: &str, version: Option<&str>) -> Option<Arc<SchemaDefinition>>;
}

/// Resolver backed by a concurrent map, for tests and embedding
#[derive(Debug, Default)]
pub struct InMemorySchemaResolver {
    definitions: DashMap<String, Arc<SchemaDefinition>>,
}

impl InMemorySchemaResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition under its URL, and under `url|version` when versioned
    pub fn insert(&self, definition: SchemaDefinition) {
        let definition = Arc::new(definition);
        if let Some(version) = &definition.version {
            self.definitions
                .insert(versioned_key(&definition.url, version), definition.clone());
        }
        self.definitions.insert(definition.url.clone(), definition);
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[async_trait]
impl SchemaResolver for InMemorySchemaResolver {
    async fn resolve(&self, url: &str, version: Option<&str>) -> Option<Arc<SchemaDefinition>> {
        let key = match version {
            Some(version) => versioned_key(url, version),
            None => url.to_string(),
        };
        let found = self.definitions.get(&key).map(|entry| entry.value().clone());
        trace!("Resolving {} -> {}", key, found.is_some());
        found
    }
}

fn versioned_key(url: &str, version: &str) -> String {
    format!("{url}|{version}")
}

/// Attach resolved schemas to every typed group parameter of `document`
///
/// A parameter type names a `uses` declaration by alias, or by the last
/// segment of its URL. Parameters whose type matches no declaration, or
/// whose declaration the resolver does not know, are left untouched.
/// Returns the number of parameters resolved.
pub async fn resolve_parameters(resolver: &dyn SchemaResolver, document: &mut Document) -> usize {
    let mut resolved = 0;
    let structures = document.structures.clone();

    for group in &mut document.groups {
        for parameter in &mut group.parameters {
            let Some(type_name) = parameter.type_name.as_deref() else {
                continue;
            };
            let Some(structure) = find_structure(&structures, type_name) else {
                continue;
            };
            if let Some(definition) = resolver.resolve(&structure.url, None).await {
                parameter.resolved = Some(ResolvedElement {
                    definition,
                    element: None,
                });
                resolved += 1;
            }
        }
    }

    debug!("Resolved {} group parameter(s)", resolved);
    resolved
}

fn find_structure<'s>(structures: &'s [Structure], type_name: &str) -> Option<&'s Structure> {
    structures
        .iter()
        .find(|structure| structure.alias.as_deref() == Some(type_name))
        .or_else(|| {
            structures
                .iter()
                .find(|structure| structure.url.rsplit('/').next() == Some(type_name))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PATIENT: &str = "http://hl7.org/fhir/StructureDefinition/Patient";

    fn patient() -> SchemaDefinition {
        SchemaDefinition::from_json(json!({
            "resourceType": "StructureDefinition",
            "url": PATIENT,
            "version": "4.0.1",
            "name": "Patient",
            "snapshot": { "element": [{ "path": "Patient" }, { "path": "Patient.gender" }] }
        }))
        .unwrap()
    }

    #[test]
    fn test_definition_from_json() {
        let definition = patient();
        assert_eq!(definition.url, PATIENT);
        assert_eq!(definition.version.as_deref(), Some("4.0.1"));
        assert_eq!(definition.name.as_deref(), Some("Patient"));
        assert!(definition.has_element("Patient.gender"));
        assert!(!definition.has_element("Patient.colour"));
        assert!(SchemaDefinition::from_json(json!({ "name": "NoUrl" })).is_none());
    }

    #[tokio::test]
    async fn test_missing_definition_is_none() {
        let resolver = InMemorySchemaResolver::new();
        assert!(resolver.is_empty());
        assert!(resolver.resolve(PATIENT, None).await.is_none());
    }

    #[tokio::test]
    async fn test_resolve_by_url_and_version() {
        let resolver = InMemorySchemaResolver::new();
        resolver.insert(patient());
        assert_eq!(resolver.len(), 2);

        let latest = resolver.resolve(PATIENT, None).await.unwrap();
        assert_eq!(latest.name.as_deref(), Some("Patient"));
        assert!(resolver.resolve(PATIENT, Some("4.0.1")).await.is_some());
        assert!(resolver.resolve(PATIENT, Some("5.0.0")).await.is_none());
    }

    #[tokio::test]
    async fn test_resolve_parameters() {
        let source = concat!(
            "map \"http://x/y\" = y\n",
            "\n",
            "uses \"http://hl7.org/fhir/StructureDefinition/Patient\" alias Pat as source\n",
            "\n",
            "group g(source s : Pat, target t : Other, source u) {\n",
            "}\n",
        );
        let mut document = crate::parser::parse(source).unwrap();
        let resolver = InMemorySchemaResolver::new();
        resolver.insert(patient());

        assert_eq!(resolve_parameters(&resolver, &mut document).await, 1);
        let parameters = &document.groups[0].parameters;
        let resolved = parameters[0].resolved.as_ref().unwrap();
        assert_eq!(resolved.definition.url, PATIENT);
        assert_eq!(resolved.element, None);
        assert!(parameters[1].resolved.is_none());
        assert!(parameters[2].resolved.is_none());

        // resolution does not change the text
        assert_eq!(crate::parser::serialize(&document), source);
    }
}
