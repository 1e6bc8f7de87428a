use std::sync::OnceLock;

use michelson_types::{Annot, AnnotKind, Ast, Pos};
use regex::Regex;

use crate::scanner::Scanner;
use crate::token::{Token, TokenKind};

fn bytes_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("^0x[0-9a-fA-F]+$").unwrap())
}

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("^-?[0-9]+$").unwrap())
}

/// The accumulated set of errors produced while parsing a script.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{}", .0.join("; "))]
pub struct ParseErrors(pub Vec<String>);

/// Recursive-descent parser turning S-form text into the unified AST.
///
/// Mirrors the sandbox's own Michelson reader closely enough that a
/// one-token lookahead is always sufficient: every production is decided
/// by the current token's kind alone.
pub struct Parser {
    scanner: Scanner,
    token: Token,
}

impl Parser {
    fn new(source: &str) -> Self {
        Self {
            scanner: Scanner::new(source),
            token: Token {
                pos: 0,
                kind: TokenKind::Nul,
                text: String::new(),
            },
        }
    }

    fn advance(&mut self) {
        self.token = self.scanner.scan();
    }

    fn expect(&mut self, kind: TokenKind) -> usize {
        if self.token.kind != kind {
            self.scanner.error(format!(
                "expected token kind ({kind}), but received ({})",
                self.token.kind
            ));
        }
        self.token.pos
    }

    fn parse_node(&mut self) -> Option<Ast> {
        self.advance();
        match self.token.kind {
            TokenKind::Bytes => Some(self.parse_bytes()),
            TokenKind::String => Some(self.parse_string()),
            TokenKind::Int => Some(self.parse_int()),
            TokenKind::OpenParen => Some(self.parse_parenthesis()),
            TokenKind::Identifier => Some(self.parse_prim()),
            TokenKind::OpenBrace => Some(self.parse_sequence()),
            other => {
                self.scanner
                    .error(format!("unexpected token ({other}) as sequence child"));
                None
            }
        }
    }

    fn parse_bytes(&mut self) -> Ast {
        let pos = self.expect(TokenKind::Bytes);
        let text = self.token.text.clone();
        let hex = if bytes_re().is_match(&text) {
            text[2..].to_string()
        } else {
            self.scanner.error(format!("invalid bytes: {text:?}"));
            text.clone()
        };
        let end = pos + text.chars().count().saturating_sub(1);
        self.advance();
        Ast::bytes(hex).with_pos(Pos::new(pos as u32, end as u32))
    }

    fn parse_string(&mut self) -> Ast {
        let pos = self.expect(TokenKind::String);
        let text = self.token.text.clone();
        let end = pos + text.chars().count() + 1;
        self.advance();
        Ast::string(text).with_pos(Pos::new(pos as u32, end as u32))
    }

    fn parse_int(&mut self) -> Ast {
        let pos = self.expect(TokenKind::Int);
        let text = self.token.text.clone();
        if !number_re().is_match(&text) {
            self.scanner.error(format!("invalid number: {text:?}"));
        }
        let end = pos + text.chars().count().saturating_sub(1);
        self.advance();
        Ast::int(text).with_pos(Pos::new(pos as u32, end as u32))
    }

    fn parse_sequence(&mut self) -> Ast {
        let begin = self.expect(TokenKind::OpenBrace);
        self.advance();

        let mut elements = Vec::new();
        while self.token.kind != TokenKind::CloseBrace {
            match self.token.kind {
                TokenKind::Bytes => elements.push(self.parse_bytes()),
                TokenKind::String => elements.push(self.parse_string()),
                TokenKind::Int => elements.push(self.parse_int()),
                TokenKind::Identifier => elements.push(self.parse_prim()),
                TokenKind::OpenBrace => elements.push(self.parse_sequence()),
                other => {
                    self.scanner
                        .error(format!("unexpected token ({other}) as sequence child"));
                    break;
                }
            }

            if self.token.kind != TokenKind::CloseBrace {
                self.expect(TokenKind::Semi);
                self.advance();
            }
        }
        let end = self.expect(TokenKind::CloseBrace);
        self.advance();

        // Sequences are not sorted here; ordering is preserved exactly as written.
        Ast::seq(elements).with_pos(Pos::new(begin as u32, end as u32))
    }

    fn parse_prim(&mut self) -> Ast {
        let begin = self.expect(TokenKind::Identifier);
        let head = self.token.text.clone();
        self.advance();

        let annots = self.parse_annotations();

        let mut args = Vec::new();
        loop {
            match self.token.kind {
                TokenKind::Bytes => {
                    args.push(self.parse_bytes());
                    continue;
                }
                TokenKind::String => {
                    args.push(self.parse_string());
                    continue;
                }
                TokenKind::Int => {
                    args.push(self.parse_int());
                    continue;
                }
                TokenKind::OpenParen => {
                    args.push(self.parse_parenthesis());
                    continue;
                }
                TokenKind::Identifier => {
                    // A bare identifier in argument position is a nullary
                    // primitive application, possibly annotated.
                    while self.token.kind == TokenKind::Identifier {
                        let ident_begin = self.token.pos;
                        let ident_text = self.token.text.clone();
                        self.advance();
                        let ident_annots = self.parse_annotations();
                        let ident_end =
                            ident_begin + ident_text.chars().count().saturating_sub(1);
                        args.push(
                            Ast::prim(ident_text, ident_annots, Vec::new())
                                .with_pos(Pos::new(ident_begin as u32, ident_end as u32)),
                        );
                    }
                    continue;
                }
                TokenKind::OpenBrace => {
                    args.push(self.parse_sequence());
                    continue;
                }
                _ => {}
            }
            break;
        }

        let end = self.token.pos;
        Ast::prim(head, annots, args).with_pos(Pos::new(begin as u32, end as u32))
    }

    fn parse_parenthesis(&mut self) -> Ast {
        let begin = self.expect(TokenKind::OpenParen);
        self.advance();
        if self.token.kind != TokenKind::Identifier {
            self.scanner.error(format!(
                "expected token ({}), but received ({})",
                TokenKind::Identifier,
                self.token.kind
            ));
        }
        let node = self.parse_prim();
        let end = self.expect(TokenKind::CloseParen);
        self.advance();
        node.with_pos(Pos::new(begin as u32, end as u32))
    }

    fn parse_annotations(&mut self) -> Vec<Annot> {
        let mut annots = Vec::new();
        while self.token.kind == TokenKind::Annot {
            annots.push(self.parse_annotation());
            self.advance();
        }
        annots
    }

    fn parse_annotation(&mut self) -> Annot {
        let pos = self.expect(TokenKind::Annot);
        let text = self.token.text.clone();
        match Annot::new(text.clone()) {
            Ok(annot) => {
                let end = pos + text.chars().count().saturating_sub(1);
                annot.with_pos(Pos::new(pos as u32, end as u32))
            }
            Err(err) => {
                self.scanner.error(err.to_string());
                Annot {
                    kind: AnnotKind::Field,
                    text,
                    pos: None,
                }
            }
        }
    }
}

/// Parses an S-form script into the unified AST.
///
/// Errors accumulate rather than short-circuit; a single malformed token
/// does not prevent the rest of the script from being diagnosed.
pub fn parse(source: &str) -> Result<Ast, ParseErrors> {
    let mut parser = Parser::new(source);
    let node = parser.parse_node();
    if parser.scanner.errors().is_empty() {
        Ok(node.unwrap_or_else(|| Ast::seq(Vec::new())))
    } else {
        Err(ParseErrors(parser.scanner.errors().to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flat_primitive() {
        let ast = parse("(Pair 1 \"abc\")").unwrap();
        assert_eq!(ast.to_debug_string(), "Prim(Pair, [], [Int(1), String(abc)])");
    }

    #[test]
    fn parses_nested_sequence() {
        let ast = parse("{ 1 ; 2 ; 3 }").unwrap();
        assert_eq!(ast.to_debug_string(), "Sequence([Int(1), Int(2), Int(3)])");
    }

    #[test]
    fn parses_annotated_primitive() {
        let ast = parse("(Pair %from %to 1 2)").unwrap();
        assert_eq!(
            ast.to_debug_string(),
            "Prim(Pair, [%from, %to], [Int(1), Int(2)])"
        );
    }

    #[test]
    fn parses_bare_identifier_argument() {
        let ast = parse("(PUSH nat 1)").unwrap();
        assert_eq!(
            ast.to_debug_string(),
            "Prim(PUSH, [], [Prim(nat, [], []), Int(1)])"
        );
    }

    #[test]
    fn parses_bytes_literal() {
        let ast = parse("0x00aa").unwrap();
        assert_eq!(ast.to_debug_string(), "Bytes(00aa)");
    }

    #[test]
    fn invalid_bytes_is_an_error() {
        assert!(parse("0xzz").is_err());
    }

    #[test]
    fn unbalanced_parenthesis_is_an_error() {
        assert!(parse("(Pair 1 2").is_err());
    }
}
