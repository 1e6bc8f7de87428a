use michelson_types::Ast;

/// Extracts the `storage` type declaration from a contract's top-level code
/// sequence: the argument of its `Prim{head="storage", args=[t]}` entry.
pub fn find_storage_type(code: &Ast) -> Option<Ast> {
    let Ast::Seq { elements, .. } = code else {
        return None;
    };
    elements.iter().find_map(|node| match node {
        Ast::Prim { head, args, .. } if head == "storage" => args.first().cloned(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use michelson_parse::parse;

    #[test]
    fn extracts_storage_type_from_code() {
        let code = parse("{ parameter unit; storage nat; code { CDR; NIL operation; PAIR } }").unwrap();
        let storage_type = find_storage_type(&code).unwrap();
        assert_eq!(storage_type.to_debug_string(), "Prim(nat, [], [])");
    }

    #[test]
    fn missing_storage_entry_yields_none() {
        let code = Ast::seq(vec![]);
        assert!(find_storage_type(&code).is_none());
    }
}
