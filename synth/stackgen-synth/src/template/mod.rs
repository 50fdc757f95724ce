pub mod refs;
pub mod token;

pub use refs::*;
pub use token::*;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::SynthError;

pub const FORMAT_VERSION: &str = "2010-09-09";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeletionPolicy {
    Delete,
    Retain,
    Snapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub properties: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<DeletionPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<DeletionPolicy>,
}

impl Resource {
    pub fn new(resource_type: &str, properties: Value) -> Self {
        Self {
            resource_type: resource_type.to_string(),
            properties,
            depends_on: Vec::new(),
            deletion_policy: None,
            update_replace_policy: None,
        }
    }

    pub fn depends_on(mut self, logical_id: &str) -> Self {
        self.depends_on.push(logical_id.to_string());
        self
    }

    /// Applies the policy on both deletion and replacement.
    pub fn retain_with(mut self, policy: DeletionPolicy) -> Self {
        self.deletion_policy = Some(policy);
        self.update_replace_policy = Some(policy);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Export {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    pub value: Token,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<Export>,
}

/// A deployment template for one stack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub resources: BTreeMap<String, Resource>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, Output>,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            description: None,
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }
}

impl Template {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Default::default()
        }
    }

    pub fn add_resource(
        &mut self,
        logical_id: &str,
        resource: Resource,
    ) -> Result<(), SynthError> {
        if self.resources.contains_key(logical_id) || self.outputs.contains_key(logical_id) {
            return Err(SynthError::DuplicateLogicalId(logical_id.to_string()));
        }
        self.resources.insert(logical_id.to_string(), resource);
        Ok(())
    }

    pub fn add_output(&mut self, logical_id: &str, output: Output) -> Result<(), SynthError> {
        if self.outputs.contains_key(logical_id) || self.resources.contains_key(logical_id) {
            return Err(SynthError::DuplicateLogicalId(logical_id.to_string()));
        }
        self.outputs.insert(logical_id.to_string(), output);
        Ok(())
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }

    /// Resources of a given type, in logical id order.
    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a Resource)> + 'a {
        self.resources
            .iter()
            .filter(move |(_, r)| r.resource_type == resource_type)
    }

    /// Export names declared by this template.
    pub fn exports(&self) -> BTreeSet<&str> {
        self.outputs
            .values()
            .filter_map(|o| o.export.as_ref().map(|e| e.name.as_str()))
            .collect()
    }

    /// Export names this template consumes.
    pub fn imports(&self) -> BTreeSet<String> {
        let mut refs = Vec::new();
        for resource in self.resources.values() {
            collect_references(&resource.properties, &mut refs);
        }
        for output in self.outputs.values() {
            collect_references(output.value.as_value(), &mut refs);
        }
        refs.into_iter()
            .filter_map(|r| match r {
                Reference::Import(name) => Some(name),
                Reference::Logical(_) => None,
            })
            .collect()
    }

    /// Every `Ref`, `Fn::GetAtt`, `Fn::Sub` variable and `DependsOn` entry
    /// must name a resource of this template.
    pub fn check_references(&self, stack: &str) -> Result<(), SynthError> {
        let dangling = |from: &str, target: &str| SynthError::DanglingReference {
            stack: stack.to_string(),
            from: from.to_string(),
            target: target.to_string(),
        };
        for (id, resource) in &self.resources {
            let mut refs = Vec::new();
            collect_references(&resource.properties, &mut refs);
            for r in refs {
                if let Reference::Logical(target) = r {
                    if !self.resources.contains_key(&target) {
                        return Err(dangling(id, &target));
                    }
                }
            }
            for target in &resource.depends_on {
                if !self.resources.contains_key(target) {
                    return Err(dangling(id, target));
                }
            }
        }
        for (id, output) in &self.outputs {
            let mut refs = Vec::new();
            collect_references(output.value.as_value(), &mut refs);
            for r in refs {
                if let Reference::Logical(target) = r {
                    if !self.resources.contains_key(&target) {
                        return Err(dangling(id, &target));
                    }
                }
            }
        }
        Ok(())
    }
}
