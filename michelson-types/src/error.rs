use thiserror::Error;

/// Errors raised while constructing or classifying AST nodes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AstError {
    #[error("unexpected annotation: {0:?}")]
    UnexpectedAnnotation(String),
    #[error("empty annotation")]
    EmptyAnnotation,
}

/// Errors raised while parsing or converting fixed-point money amounts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("invalid quantity: {0:?}")]
    InvalidQuantity(String),
    #[error("quantity {0:?} cannot be represented without loss of precision")]
    Precision(String),
}
