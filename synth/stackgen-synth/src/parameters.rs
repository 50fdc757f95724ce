use std::collections::BTreeMap;

use stackgen_models::{DeclaredParameter, ParameterKind, SecretRef};
use tracing::debug;

use crate::SynthError;
use crate::template::Token;

/// A secret reference known to exist in the parameter store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedParameter {
    pub secret: SecretRef,
    pub kind: ParameterKind,
}

impl ResolvedParameter {
    /// Resolved by the provisioning engine, never written as plain text.
    pub fn dynamic_reference(&self) -> String {
        self.secret.dynamic_reference()
    }

    pub fn arn(&self) -> Token {
        Token::sub(format!(
            "arn:${{AWS::Partition}}:ssm:${{AWS::Region}}:${{AWS::AccountId}}:{}",
            self.secret.arn_resource()
        ))
    }
}

/// Lookup of secret parameters ahead of synthesis.
pub trait ParameterStore {
    fn resolve(&self, secret: &SecretRef) -> Result<ResolvedParameter, SynthError>;
}

/// Parameters declared in configuration, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct DeclaredParameters {
    entries: BTreeMap<String, DeclaredParameter>,
}

impl DeclaredParameters {
    pub fn new(parameters: impl IntoIterator<Item = DeclaredParameter>) -> Self {
        let entries = parameters
            .into_iter()
            .map(|p| (p.name.clone(), p))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ParameterStore for DeclaredParameters {
    fn resolve(&self, secret: &SecretRef) -> Result<ResolvedParameter, SynthError> {
        let unresolved = |reason: String| SynthError::UnresolvedParameter {
            name: secret.parameter_name.clone(),
            version: secret.version,
            reason,
        };
        let declared = self
            .entries
            .get(&secret.parameter_name)
            .ok_or_else(|| unresolved("parameter is not declared".to_string()))?;
        if secret.version > declared.version {
            return Err(unresolved(format!(
                "latest declared version is {}",
                declared.version
            )));
        }
        debug!(
            name = %secret.parameter_name,
            version = secret.version,
            kind = ?declared.kind,
            "resolved parameter"
        );
        Ok(ResolvedParameter {
            secret: secret.clone(),
            kind: declared.kind,
        })
    }
}

/// Resolve a parameter that must be stored encrypted.
pub fn resolve_secure(
    store: &dyn ParameterStore,
    secret: &SecretRef,
) -> Result<ResolvedParameter, SynthError> {
    let resolved = store.resolve(secret)?;
    if resolved.kind != ParameterKind::SecureString {
        return Err(SynthError::UnresolvedParameter {
            name: secret.parameter_name.clone(),
            version: secret.version,
            reason: format!("expected a secure_string parameter, found {:?}", resolved.kind),
        });
    }
    Ok(resolved)
}
