//! Document-level types.

use super::{Block, Entity, EntityKind, Inline};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The complete documentation model of one project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Project metadata
    pub project: ProjectInfo,

    /// Documented entities, in extraction order
    pub entities: Vec<Entity>,

    /// Example programs referenced by the documentation
    pub examples: Vec<Example>,

    /// Extractor ids folded into another entity (typedef alias id -> entity id)
    pub aliases: BTreeMap<String, String>,

    /// Group ids in declaration order
    pub group_order: Vec<String>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a document previously written with [`to_json`](crate::render::to_json).
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::Render(format!("JSON deserialization error: {}", e)))
    }

    /// Add an entity.
    pub fn add_entity(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    /// Add an entity and return self.
    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.add_entity(entity);
        self
    }

    /// Get an entity by extractor id.
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Get an entity by kind and name.
    pub fn find(&self, kind: EntityKind, name: &str) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| e.kind == kind && e.name == name)
    }

    /// Get an example by extractor id.
    pub fn example(&self, id: &str) -> Option<&Example> {
        self.examples.iter().find(|e| e.id == id)
    }

    /// Get the number of entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Check if the document has no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Count entities per kind.
    pub fn count_by_kind(&self) -> BTreeMap<EntityKind, usize> {
        let mut counts = BTreeMap::new();
        for entity in &self.entities {
            *counts.entry(entity.kind).or_insert(0) += 1;
        }
        counts
    }
}

/// Project metadata taken from the extractor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    /// Project name
    pub name: Option<String>,

    /// One-line project description
    pub brief: Option<String>,

    /// Project version
    pub version: Option<String>,
}

/// An example program (`\example`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    /// Extractor id
    pub id: String,

    /// Example file name
    pub name: String,

    /// One-line description
    pub brief: Vec<Inline>,

    /// Long description, usually including the listing
    pub description: Vec<Block>,
}
