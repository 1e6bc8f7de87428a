use std::fmt;

use crate::error::AstError;
use crate::pos::Pos;

/// Kind of a Michelson-style annotation, distinguished by its leading sigil.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotKind {
    /// `:name` — type annotation.
    Type,
    /// `@name` — variable annotation.
    Var,
    /// `%name` — field annotation.
    Field,
}

impl AnnotKind {
    /// Classifies an annotation by its first character, per the script-language grammar.
    pub fn classify(text: &str) -> Result<Self, AstError> {
        match text.chars().next() {
            None => Err(AstError::EmptyAnnotation),
            Some(':') => Ok(AnnotKind::Type),
            Some('@') => Ok(AnnotKind::Var),
            Some('%') => Ok(AnnotKind::Field),
            Some(_) => Err(AstError::UnexpectedAnnotation(text.to_string())),
        }
    }
}

/// A single annotation attached to a primitive application, e.g. `%from` or `@amount`.
#[derive(Debug, Clone)]
pub struct Annot {
    pub kind: AnnotKind,
    pub text: String,
    pub pos: Option<Pos>,
}

impl Annot {
    pub fn new(text: impl Into<String>) -> Result<Self, AstError> {
        let text = text.into();
        let kind = AnnotKind::classify(&text)?;
        Ok(Self {
            kind,
            text,
            pos: None,
        })
    }

    pub fn with_pos(mut self, pos: Pos) -> Self {
        self.pos = Some(pos);
        self
    }
}

impl PartialEq for Annot {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.text == other.text
    }
}

/// The unified script-language AST, shared by the S-form and J-form surfaces.
///
/// Two nodes are equal when their [`Ast::to_debug_string`] output matches; `Pos`
/// is carried for diagnostics only and never affects equality.
#[derive(Debug, Clone)]
pub enum Ast {
    Int {
        digits: String,
        pos: Option<Pos>,
    },
    Bytes {
        hex: String,
        pos: Option<Pos>,
    },
    Str {
        value: String,
        pos: Option<Pos>,
    },
    Prim {
        head: String,
        annots: Vec<Annot>,
        args: Vec<Ast>,
        pos: Option<Pos>,
    },
    Seq {
        elements: Vec<Ast>,
        pos: Option<Pos>,
    },
}

impl Ast {
    pub fn int(digits: impl Into<String>) -> Self {
        Ast::Int {
            digits: digits.into(),
            pos: None,
        }
    }

    pub fn bytes(hex: impl Into<String>) -> Self {
        Ast::Bytes {
            hex: hex.into(),
            pos: None,
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Ast::Str {
            value: value.into(),
            pos: None,
        }
    }

    pub fn prim(head: impl Into<String>, annots: Vec<Annot>, args: Vec<Ast>) -> Self {
        Ast::Prim {
            head: head.into(),
            annots,
            args,
            pos: None,
        }
    }

    pub fn seq(elements: Vec<Ast>) -> Self {
        Ast::Seq {
            elements,
            pos: None,
        }
    }

    pub fn pos(&self) -> Option<Pos> {
        match self {
            Ast::Int { pos, .. }
            | Ast::Bytes { pos, .. }
            | Ast::Str { pos, .. }
            | Ast::Prim { pos, .. }
            | Ast::Seq { pos, .. } => *pos,
        }
    }

    pub fn with_pos(mut self, new_pos: Pos) -> Self {
        match &mut self {
            Ast::Int { pos, .. }
            | Ast::Bytes { pos, .. }
            | Ast::Str { pos, .. }
            | Ast::Prim { pos, .. }
            | Ast::Seq { pos, .. } => *pos = Some(new_pos),
        }
        self
    }

    /// Canonical debug rendering, used both for display and as the basis of
    /// structural equality (`Pos` is deliberately excluded).
    pub fn to_debug_string(&self) -> String {
        match self {
            Ast::Int { digits, .. } => format!("Int({digits})"),
            Ast::Bytes { hex, .. } => format!("Bytes({hex})"),
            Ast::Str { value, .. } => format!("String({value})"),
            Ast::Prim {
                head, annots, args, ..
            } => {
                let annots = annots
                    .iter()
                    .map(|a| a.text.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                let args = args
                    .iter()
                    .map(Ast::to_debug_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Prim({head}, [{annots}], [{args}])")
            }
            Ast::Seq { elements, .. } => {
                let elements = elements
                    .iter()
                    .map(Ast::to_debug_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Sequence([{elements}])")
            }
        }
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_debug_string())
    }
}

impl PartialEq for Ast {
    fn eq(&self, other: &Self) -> bool {
        self.to_debug_string() == other.to_debug_string()
    }
}

impl Eq for Ast {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_string_matches_canonical_form() {
        let node = Ast::prim(
            "Pair",
            vec![Annot::new("%from").unwrap()],
            vec![Ast::int("1"), Ast::string("tz1abc")],
        );
        assert_eq!(
            node.to_debug_string(),
            "Prim(Pair, [%from], [Int(1), String(tz1abc)])"
        );
    }

    #[test]
    fn equality_ignores_position() {
        let a = Ast::int("42").with_pos(Pos::new(0, 2));
        let b = Ast::int("42").with_pos(Pos::new(10, 12));
        assert_eq!(a, b);
    }

    #[test]
    fn inequality_on_different_annots() {
        let a = Ast::prim("Pair", vec![Annot::new("%from").unwrap()], vec![]);
        let b = Ast::prim("Pair", vec![Annot::new("%to").unwrap()], vec![]);
        assert_ne!(a, b);
    }

    #[test]
    fn annot_kind_classification() {
        assert_eq!(AnnotKind::classify(":nat").unwrap(), AnnotKind::Type);
        assert_eq!(AnnotKind::classify("@x").unwrap(), AnnotKind::Var);
        assert_eq!(AnnotKind::classify("%from").unwrap(), AnnotKind::Field);
        assert!(AnnotKind::classify("?oops").is_err());
        assert!(AnnotKind::classify("").is_err());
    }
}
