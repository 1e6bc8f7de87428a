use std::sync::OnceLock;

use michelson_types::Ast;
use regex::Regex;

/// Reserved top-level heads that are never parenthesized, regardless of
/// argument or annotation count.
const RESERVED_WORDS: &[&str] = &["storage", "parameter", "code", "view"];

fn instruction_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("^[0-9A-Z_]+$").unwrap())
}

/// Whether `head` is an uppercase-instruction identifier, e.g. `PUSH`, `FAILWITH`.
fn is_instruction(head: &str) -> bool {
    instruction_re().is_match(head)
}

fn is_reserved_word(head: &str) -> bool {
    RESERVED_WORDS.contains(&head)
}

/// Prints an AST node as S-form text.
///
/// `indent` is the string repeated once per nesting depth before each
/// sequence child; an empty indent prints everything on a single line with
/// single spaces between elements, matching the compact form the sandbox
/// client itself accepts.
pub fn print(node: &Ast, indent: &str) -> String {
    print_node(node, indent, 0, true)
}

fn print_node(node: &Ast, indent: &str, depth: usize, allow_parens: bool) -> String {
    match node {
        Ast::Int { digits, .. } => digits.clone(),
        Ast::Bytes { hex, .. } => format!("0x{hex}"),
        Ast::Str { value, .. } => format!("\"{value}\""),
        Ast::Prim {
            head, annots, args, ..
        } => print_prim(head, annots, args, indent, depth, allow_parens),
        Ast::Seq { elements, .. } => print_seq(elements, indent, depth),
    }
}

fn print_prim(
    head: &str,
    annots: &[michelson_types::Annot],
    args: &[Ast],
    indent: &str,
    depth: usize,
    allow_parens: bool,
) -> String {
    let mut parts = vec![head.to_string()];
    parts.extend(annots.iter().map(|a| a.text.clone()));
    parts.extend(
        args.iter()
            .map(|arg| print_node(arg, indent, depth, true)),
    );
    let joined = parts.join(" ");

    let should_wrap = allow_parens
        && !is_reserved_word(head)
        && !is_instruction(head)
        && (!annots.is_empty() || !args.is_empty());

    if should_wrap {
        format!("({joined})")
    } else {
        joined
    }
}

fn print_seq(elements: &[Ast], indent: &str, depth: usize) -> String {
    let printed: Vec<String> = elements
        .iter()
        .map(|el| print_node(el, indent, depth + 1, false))
        .collect();

    if indent.is_empty() {
        if printed.is_empty() {
            "{}".to_string()
        } else {
            format!("{{ {} }}", printed.join(" ; "))
        }
    } else {
        let pad = indent.repeat(depth + 1);
        let closing_pad = indent.repeat(depth);
        if printed.is_empty() {
            "{}".to_string()
        } else {
            let body = printed
                .iter()
                .map(|el| format!("{pad}{el}"))
                .collect::<Vec<_>>()
                .join(" ;\n");
            format!("{{\n{body}\n{closing_pad}}}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use michelson_parse::parse;

    #[test]
    fn prints_reserved_word_without_parens() {
        let ast = parse("(storage nat)").unwrap();
        assert_eq!(print(&ast, ""), "storage nat");
    }

    #[test]
    fn prints_instruction_without_parens() {
        let ast = parse("(PUSH nat 1)").unwrap();
        assert_eq!(print(&ast, ""), "PUSH nat 1");
    }

    #[test]
    fn prints_value_primitive_with_parens_when_it_has_args() {
        let ast = parse("(Pair 1 2)").unwrap();
        assert_eq!(print(&ast, ""), "(Pair 1 2)");
    }

    #[test]
    fn prints_nullary_value_primitive_without_parens() {
        let ast = parse("None").unwrap();
        assert_eq!(print(&ast, ""), "None");
    }

    #[test]
    fn round_trips_through_compact_print() {
        let source = "(Pair %from %to 1 2)";
        let ast = parse(source).unwrap();
        let printed = print(&ast, "");
        let reparsed = parse(&printed).unwrap();
        assert_eq!(ast, reparsed);
    }

    #[test]
    fn prints_sequence_with_indent() {
        let ast = parse("{ 1 ; 2 }").unwrap();
        assert_eq!(print(&ast, "  "), "{\n  1 ;\n  2\n}");
    }
}
