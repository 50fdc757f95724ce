use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// A template value: either a literal or an intrinsic function the
/// provisioning engine resolves at deploy time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(Value);

pub const AWS_REGION: &str = "AWS::Region";
pub const AWS_ACCOUNT_ID: &str = "AWS::AccountId";
pub const AWS_PARTITION: &str = "AWS::Partition";

impl Token {
    pub fn literal(value: impl Into<String>) -> Self {
        Token(Value::String(value.into()))
    }

    /// `Ref` to a resource, parameter or pseudo parameter.
    pub fn reference(logical_id: &str) -> Self {
        Token(json!({ "Ref": logical_id }))
    }

    pub fn get_att(logical_id: &str, attribute: &str) -> Self {
        Token(json!({ "Fn::GetAtt": [logical_id, attribute] }))
    }

    pub fn import(export_name: &str) -> Self {
        Token(json!({ "Fn::ImportValue": export_name }))
    }

    /// `Fn::Sub` over a string that only refers to pseudo parameters or
    /// resources of the same template.
    pub fn sub(template: impl Into<String>) -> Self {
        Token(json!({ "Fn::Sub": template.into() }))
    }

    pub fn sub_with(template: impl Into<String>, vars: BTreeMap<String, Token>) -> Self {
        if vars.is_empty() {
            return Token::sub(template);
        }
        Token(json!({ "Fn::Sub": [template.into(), vars] }))
    }

    pub fn select(index: usize, list: Token) -> Self {
        Token(json!({ "Fn::Select": [index, list] }))
    }

    /// Availability zones of the deployment region.
    pub fn azs() -> Self {
        Token(json!({ "Fn::GetAZs": "" }))
    }

    /// `Fn::Join`, merging adjacent literal parts. A join of literals
    /// collapses to a literal.
    pub fn join(separator: &str, parts: impl IntoIterator<Item = Token>) -> Self {
        let mut merged: Vec<Token> = Vec::new();
        for part in parts {
            if separator.is_empty() {
                if let (Some(Token(Value::String(prev))), Some(next)) =
                    (merged.last_mut(), part.as_literal())
                {
                    prev.push_str(next);
                    continue;
                }
            }
            merged.push(part);
        }
        if merged.iter().all(|t| t.as_literal().is_some()) {
            let joined: Vec<&str> = merged.iter().filter_map(Token::as_literal).collect();
            return Token::literal(joined.join(separator));
        }
        Token(json!({ "Fn::Join": [separator, merged] }))
    }

    pub fn as_literal(&self) -> Option<&str> {
        self.0.as_str()
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Export name if this token is a cross-stack import.
    pub fn import_name(&self) -> Option<&str> {
        self.0.get("Fn::ImportValue").and_then(Value::as_str)
    }

    /// Evaluate literals, imports and joins against known export values.
    /// Returns `None` when the token depends on anything else.
    pub fn resolve(&self, exports: &BTreeMap<String, String>) -> Option<String> {
        resolve_value(&self.0, exports)
    }
}

fn resolve_value(value: &Value, exports: &BTreeMap<String, String>) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) if map.len() == 1 => {
            if let Some(name) = map.get("Fn::ImportValue").and_then(Value::as_str) {
                return exports.get(name).cloned();
            }
            let args = map.get("Fn::Join")?.as_array()?;
            let separator = args.first()?.as_str()?;
            let parts = args.get(1)?.as_array()?;
            let resolved: Option<Vec<String>> =
                parts.iter().map(|p| resolve_value(p, exports)).collect();
            Some(resolved?.join(separator))
        }
        _ => None,
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Token::literal(value)
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Token::literal(value)
    }
}

impl From<Token> for Value {
    fn from(value: Token) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intrinsics_serialize_in_template_shape() {
        assert_eq!(
            serde_json::to_value(Token::reference("Vpc")).unwrap(),
            json!({"Ref": "Vpc"})
        );
        assert_eq!(
            serde_json::to_value(Token::get_att("Db", "Endpoint.Address")).unwrap(),
            json!({"Fn::GetAtt": ["Db", "Endpoint.Address"]})
        );
        assert_eq!(
            serde_json::to_value(Token::select(1, Token::azs())).unwrap(),
            json!({"Fn::Select": [1, {"Fn::GetAZs": ""}]})
        );
    }

    #[test]
    fn join_merges_adjacent_literals() {
        let token = Token::join(
            "",
            [
                Token::literal("jdbc:mysql://"),
                Token::import("db:EndpointAddress"),
                Token::literal(":3306"),
                Token::literal("/notes_app"),
            ],
        );
        assert_eq!(
            token.as_value(),
            &json!({"Fn::Join": ["", [
                "jdbc:mysql://",
                {"Fn::ImportValue": "db:EndpointAddress"},
                ":3306/notes_app"
            ]]})
        );
    }

    #[test]
    fn join_of_literals_is_literal() {
        let token = Token::join("-", [Token::literal("a"), Token::literal("b")]);
        assert_eq!(token.as_literal(), Some("a-b"));
    }

    #[test]
    fn resolve_follows_imports() {
        let token = Token::join(
            "",
            [Token::literal("host="), Token::import("db:EndpointAddress")],
        );
        let mut exports = BTreeMap::new();
        assert_eq!(token.resolve(&exports), None);
        exports.insert("db:EndpointAddress".to_string(), "db.local".to_string());
        assert_eq!(token.resolve(&exports).as_deref(), Some("host=db.local"));
        assert_eq!(Token::reference("X").resolve(&exports), None);
    }
}
