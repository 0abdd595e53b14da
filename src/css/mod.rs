//! The style system: tokenizer, parser, specificity, cascade resolution.

pub mod model;
pub mod parser;
pub mod properties;
pub mod scalar;
pub mod specificity;
pub mod styles;
pub mod stylesheet;
pub mod tokenizer;
