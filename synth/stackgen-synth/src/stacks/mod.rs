mod dashboard;
mod database;
mod network;
mod service;

pub use dashboard::*;
pub use database::*;
pub use network::*;
pub use service::*;

use crate::SynthError;
use crate::template::{Export, Output, Resource, Template, Token};

/// Name under which a stack publishes one of its outputs.
pub fn export_name(stack: &str, output_id: &str) -> String {
    format!("{}:{}", stack, output_id)
}

/// A template together with the outputs downstream stacks consume.
#[derive(Debug, Clone)]
pub struct Synthesized<O> {
    pub template: Template,
    pub outputs: O,
}

/// A stack that can be turned into a template.
pub trait StackDescriptor {
    type Outputs;

    fn stack_name(&self) -> &str;

    fn synthesize(&self) -> Result<Synthesized<Self::Outputs>, SynthError>;
}

/// Accumulates resources and outputs for one stack.
#[derive(Debug)]
pub struct StackBuilder {
    name: String,
    template: Template,
}

impl StackBuilder {
    pub fn new(name: &str, description: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            template: Template::new(description),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a resource and return a `Ref` to it.
    pub fn add(&mut self, logical_id: &str, resource: Resource) -> Result<Token, SynthError> {
        self.template.add_resource(logical_id, resource)?;
        Ok(Token::reference(logical_id))
    }

    pub fn output(
        &mut self,
        logical_id: &str,
        value: Token,
        description: &str,
    ) -> Result<(), SynthError> {
        self.template.add_output(
            logical_id,
            Output {
                value,
                description: Some(description.to_string()),
                export: None,
            },
        )
    }

    /// Publish an output and return the import other stacks use to read it.
    pub fn export(
        &mut self,
        logical_id: &str,
        value: Token,
        description: &str,
    ) -> Result<Token, SynthError> {
        let name = export_name(&self.name, logical_id);
        self.template.add_output(
            logical_id,
            Output {
                value,
                description: Some(description.to_string()),
                export: Some(Export { name: name.clone() }),
            },
        )?;
        Ok(Token::import(&name))
    }

    pub fn finish(self) -> Result<Template, SynthError> {
        self.template.check_references(&self.name)?;
        Ok(self.template)
    }
}
