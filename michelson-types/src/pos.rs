/// Byte-offset span within the source text that produced a node.
///
/// Purely diagnostic: two nodes compare equal regardless of their `Pos`,
/// see [`crate::ast::Ast`]'s `PartialEq` impl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
    pub start: u32,
    pub end: u32,
}

impl Pos {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}
