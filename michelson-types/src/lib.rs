//! Core AST and fixed-point money types shared by the script-language
//! front end, the action pipeline and the sandbox client.

mod ast;
mod error;
mod money;
mod pos;

pub use ast::{Annot, AnnotKind, Ast};
pub use error::{AstError, MoneyError};
pub use money::{BaseUnit, DisplayUnit};
pub use pos::Pos;
