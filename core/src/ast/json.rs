use serde_json::{Map, Value};

use super::{AstError, Node, Span};

type Object = Map<String, Value>;

impl Node {
    /// Convert the external parser's JSON tree (objects tagged with `type` and
    /// carrying `loc: { start, end }`) into a [`Node`].
    pub fn from_json(value: &Value) -> Result<Node, AstError> {
        let Some(obj) = value.as_object() else {
            return Err(AstError::new("<root>", "expected a JSON object"));
        };
        let Some(kind) = obj.get("type").and_then(Value::as_str) else {
            return Err(AstError::new("<root>", "missing `type` tag"));
        };
        convert_node(kind, obj)
    }
}

fn convert_node(kind: &str, obj: &Object) -> Result<Node, AstError> {
    let node = match kind {
        "Ruleset" => Node::Ruleset {
            rid: optional_node(obj, "rid")?,
            meta: optional_node(obj, "meta")?,
            global: nodes_in_field(obj, "global")?,
            rules: nodes_in_field(obj, "rules")?,
            span: optional_span(obj),
        },
        "RulesetID" => Node::RulesetId {
            value: string_field(kind, obj, "value")?,
            span: required_span(kind, obj)?,
        },
        "RulesetMeta" => Node::RulesetMeta {
            properties: nodes_in_field(obj, "properties")?,
            span: required_span(kind, obj)?,
        },
        "RulesetMetaProperty" => {
            let key = obj
                .get("key")
                .and_then(Value::as_object)
                .ok_or_else(|| AstError::new(kind, "missing `key`"))?;
            Node::RulesetMetaProperty {
                key: string_field(kind, key, "value")?,
                key_span: required_span(kind, key)?,
                value: optional_node(obj, "value")?,
                span: optional_span(obj),
            }
        }
        "Declaration" => Node::Declaration {
            left: required_node(kind, obj, "left")?,
            right: required_node(kind, obj, "right")?,
            span: required_span(kind, obj)?,
        },
        "DefAction" => Node::DefAction {
            id: required_node(kind, obj, "id")?,
            children: nodes_in_fields_except(obj, &["id"])?,
            span: required_span(kind, obj)?,
        },
        "Function" => Node::Function {
            children: nodes_in_fields_except(obj, &[])?,
            span: optional_span(obj),
        },
        "Rule" => Node::Rule {
            name: required_node(kind, obj, "name")?,
            children: nodes_in_fields_except(obj, &["name"])?,
            span: required_span(kind, obj)?,
        },
        "Identifier" => Node::Identifier {
            value: string_field(kind, obj, "value")?,
            span: optional_span(obj),
        },
        _ => Node::Other {
            kind: kind.to_string(),
            children: nodes_in_fields_except(obj, &[])?,
            span: optional_span(obj),
        },
    };
    Ok(node)
}

fn span_of(loc: &Value) -> Option<Span> {
    let start = loc.get("start")?.as_u64()?;
    let end = loc.get("end")?.as_u64()?;
    Some(Span::new(start as usize, end as usize))
}

fn optional_span(obj: &Object) -> Option<Span> {
    obj.get("loc").and_then(span_of)
}

fn required_span(kind: &str, obj: &Object) -> Result<Span, AstError> {
    optional_span(obj).ok_or_else(|| AstError::new(kind, "missing `loc` span"))
}

fn string_field(kind: &str, obj: &Object, field: &str) -> Result<String, AstError> {
    obj.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AstError::new(kind, format!("missing string field `{field}`")))
}

fn optional_node(obj: &Object, field: &str) -> Result<Option<Box<Node>>, AstError> {
    match obj.get(field) {
        Some(value) if typed_object(value).is_some() => Node::from_json(value).map(|n| Some(Box::new(n))),
        _ => Ok(None),
    }
}

fn required_node(kind: &str, obj: &Object, field: &str) -> Result<Box<Node>, AstError> {
    optional_node(obj, field)?.ok_or_else(|| AstError::new(kind, format!("missing node field `{field}`")))
}

fn typed_object(value: &Value) -> Option<(&str, &Object)> {
    let obj = value.as_object()?;
    let kind = obj.get("type")?.as_str()?;
    Some((kind, obj))
}

/// Typed nodes reachable from `value`: a typed object is one node, arrays are
/// flattened, anything else (numbers, `loc` objects, null) contributes nothing.
fn collect_nodes(value: &Value, out: &mut Vec<Node>) -> Result<(), AstError> {
    if let Some((kind, obj)) = typed_object(value) {
        out.push(convert_node(kind, obj)?);
    } else if let Some(items) = value.as_array() {
        for item in items {
            collect_nodes(item, out)?;
        }
    }
    Ok(())
}

fn nodes_in_field(obj: &Object, field: &str) -> Result<Vec<Node>, AstError> {
    let mut out = Vec::new();
    if let Some(value) = obj.get(field) {
        collect_nodes(value, &mut out)?;
    }
    Ok(out)
}

fn nodes_in_fields_except(obj: &Object, skip: &[&str]) -> Result<Vec<Node>, AstError> {
    let mut out = Vec::new();
    for (key, value) in obj {
        if key == "type" || key == "loc" || skip.contains(&key.as_str()) {
            continue;
        }
        collect_nodes(value, &mut out)?;
    }
    Ok(out)
}
