use michelson_types::{Annot, AnnotKind, Ast};
use serde_json::{Map, Value};

use crate::parser::ParseErrors;

/// Parses a J-form (JSON-like) script node into the unified AST.
///
/// Accepts either `[...]` (a sequence) or `{"int"|"string"|"bytes"|"prim": ...}`
/// objects, recursively, mirroring the shapes produced by [`crate::print_json`].
pub fn parse_json(value: &Value) -> Result<Ast, ParseErrors> {
    let mut errors = Vec::new();
    let ast = parse_node(value, &mut errors);
    if errors.is_empty() {
        Ok(ast)
    } else {
        Err(ParseErrors(errors))
    }
}

fn parse_node(value: &Value, errors: &mut Vec<String>) -> Ast {
    match value {
        Value::Array(items) => Ast::seq(items.iter().map(|item| parse_node(item, errors)).collect()),
        Value::Object(map) => parse_object(map, errors),
        other => {
            errors.push(format!("unrecognized J-form node: {other}"));
            Ast::seq(Vec::new())
        }
    }
}

fn parse_object(map: &Map<String, Value>, errors: &mut Vec<String>) -> Ast {
    if let Some(v) = map.get("int") {
        return Ast::int(text_of(v, errors));
    }
    if let Some(v) = map.get("string") {
        return Ast::string(text_of(v, errors));
    }
    if let Some(v) = map.get("bytes") {
        return Ast::bytes(text_of(v, errors));
    }
    if let Some(v) = map.get("prim") {
        let head = text_of(v, errors);
        let args = map
            .get("args")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(|item| parse_node(item, errors)).collect())
            .unwrap_or_default();
        let annots = map
            .get("annots")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|text| parse_annot(text, errors))
                    .collect()
            })
            .unwrap_or_default();
        return Ast::prim(head, annots, args);
    }
    errors.push("J-form object must contain one of int, string, bytes or prim".to_string());
    Ast::seq(Vec::new())
}

fn parse_annot(text: &str, errors: &mut Vec<String>) -> Annot {
    Annot::new(text).unwrap_or_else(|err| {
        errors.push(err.to_string());
        Annot {
            kind: AnnotKind::Field,
            text: text.to_string(),
            pos: None,
        }
    })
}

fn text_of(value: &Value, errors: &mut Vec<String>) -> String {
    match value.as_str() {
        Some(text) => text.to_string(),
        None => {
            errors.push(format!("expected a string value, got: {value}"));
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_int_node() {
        let ast = parse_json(&json!({"int": "1"})).unwrap();
        assert_eq!(ast.to_debug_string(), "Int(1)");
    }

    #[test]
    fn parses_prim_with_args_and_annots() {
        let value = json!({
            "prim": "Pair",
            "annots": ["%from", "%to"],
            "args": [{"int": "1"}, {"string": "abc"}],
        });
        let ast = parse_json(&value).unwrap();
        assert_eq!(
            ast.to_debug_string(),
            "Prim(Pair, [%from, %to], [Int(1), String(abc)])"
        );
    }

    #[test]
    fn parses_sequence() {
        let value = json!([{"int": "1"}, {"int": "2"}]);
        let ast = parse_json(&value).unwrap();
        assert_eq!(ast.to_debug_string(), "Sequence([Int(1), Int(2)])");
    }

    #[test]
    fn malformed_object_is_an_error() {
        assert!(parse_json(&json!({"unknown": "x"})).is_err());
    }
}
