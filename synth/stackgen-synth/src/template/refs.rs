use serde_json::Value;

/// Something a template value points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// A resource of the same template.
    Logical(String),
    /// An export of another stack.
    Import(String),
}

/// Walk a template value and collect every reference it makes.
/// Pseudo parameters (`AWS::*`) are not references.
pub fn collect_references(value: &Value, out: &mut Vec<Reference>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_references(item, out);
            }
        }
        Value::Object(map) => {
            if map.len() == 1 {
                if let Some(target) = map.get("Ref").and_then(Value::as_str) {
                    push_logical(target, out);
                    return;
                }
                if let Some(att) = map.get("Fn::GetAtt") {
                    let target = match att {
                        Value::Array(args) => args.first().and_then(Value::as_str),
                        Value::String(dotted) => dotted.split('.').next(),
                        _ => None,
                    };
                    if let Some(target) = target {
                        push_logical(target, out);
                    }
                    return;
                }
                if let Some(name) = map.get("Fn::ImportValue").and_then(Value::as_str) {
                    out.push(Reference::Import(name.to_string()));
                    return;
                }
                if let Some(sub) = map.get("Fn::Sub") {
                    collect_sub(sub, out);
                    return;
                }
            }
            for v in map.values() {
                collect_references(v, out);
            }
        }
        _ => {}
    }
}

fn push_logical(target: &str, out: &mut Vec<Reference>) {
    if !target.starts_with("AWS::") {
        out.push(Reference::Logical(target.to_string()));
    }
}

fn collect_sub(sub: &Value, out: &mut Vec<Reference>) {
    let (body, vars) = match sub {
        Value::String(body) => (body.as_str(), None),
        Value::Array(args) => match (args.first(), args.get(1)) {
            (Some(Value::String(body)), Some(Value::Object(vars))) => (body.as_str(), Some(vars)),
            (Some(Value::String(body)), None) => (body.as_str(), None),
            _ => return,
        },
        _ => return,
    };
    for var in sub_variables(body) {
        let local = vars.is_some_and(|v| v.contains_key(var));
        if !local {
            let target = var.split('.').next().unwrap_or(var);
            push_logical(target, out);
        }
    }
    if let Some(vars) = vars {
        for v in vars.values() {
            collect_references(v, out);
        }
    }
}

/// Variable names of `${...}` placeholders, skipping `${!...}` literals.
pub fn sub_variables(body: &str) -> Vec<&str> {
    let mut vars = Vec::new();
    let mut rest = body;
    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                if !name.starts_with('!') {
                    vars.push(name.trim());
                }
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    vars
}

/// Escape literal text for use inside an `Fn::Sub` body.
pub fn escape_sub(text: &str) -> String {
    text.replace("${", "${!")
}
