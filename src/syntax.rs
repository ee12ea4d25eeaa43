//! Syntax layer: text to a categorized forest of syntax nodes.
//!
//! The pipeline is tokenize, merge operators, then categorize. The result is
//! consumed by the expression builder.

pub mod categorizer;
pub mod category;
pub mod node;
pub mod tokenizer;

pub use categorizer::categorize;
pub use category::Category;
pub use node::{NodeId, NodeVariant, SyntaxNode, SyntaxTree};
pub use tokenizer::{merge_operators, Tokenizer};
