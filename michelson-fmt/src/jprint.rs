use michelson_types::Ast;
use serde_json::{json, Value};

/// Prints an AST node in J-form (the structured JSON representation).
///
/// Empty `args`/`annots` are omitted from a `prim` object rather than
/// serialized as empty arrays, matching what the sandbox client emits.
pub fn print_json(node: &Ast) -> Value {
    match node {
        Ast::Int { digits, .. } => json!({ "int": digits }),
        Ast::Bytes { hex, .. } => json!({ "bytes": hex }),
        Ast::Str { value, .. } => json!({ "string": value }),
        Ast::Prim {
            head, annots, args, ..
        } => {
            let mut obj = serde_json::Map::new();
            obj.insert("prim".to_string(), json!(head));
            if !annots.is_empty() {
                let annots: Vec<Value> = annots.iter().map(|a| json!(a.text)).collect();
                obj.insert("annots".to_string(), Value::Array(annots));
            }
            if !args.is_empty() {
                let args: Vec<Value> = args.iter().map(print_json).collect();
                obj.insert("args".to_string(), Value::Array(args));
            }
            Value::Object(obj)
        }
        Ast::Seq { elements, .. } => Value::Array(elements.iter().map(print_json).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use michelson_parse::{parse, parse_json};
    use serde_json::json;

    #[test]
    fn prints_nullary_prim_without_args_or_annots() {
        let ast = parse("None").unwrap();
        assert_eq!(print_json(&ast), json!({"prim": "None"}));
    }

    #[test]
    fn prints_prim_with_annots_and_args() {
        let ast = parse("(Pair %from %to 1 2)").unwrap();
        assert_eq!(
            print_json(&ast),
            json!({
                "prim": "Pair",
                "annots": ["%from", "%to"],
                "args": [{"int": "1"}, {"int": "2"}],
            })
        );
    }

    #[test]
    fn round_trips_through_j_form() {
        let ast = parse("(Pair (Some 1) { 1 ; 2 })").unwrap();
        let printed = print_json(&ast);
        let reparsed = parse_json(&printed).unwrap();
        assert_eq!(ast, reparsed);
    }

    #[test]
    fn bytes_print_without_prefix() {
        let ast = parse("0x00aa").unwrap();
        assert_eq!(print_json(&ast), json!({"bytes": "00aa"}));
    }
}
