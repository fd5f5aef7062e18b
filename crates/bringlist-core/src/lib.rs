//! Bringlist Core Types and Evaluation
//!
//! This crate provides the foundational types for compiled bringlist
//! documents and the expression evaluator that decides visibility. It
//! includes:
//!
//! - **Expressions**: The tag-expression tree ([`expr::TagExpr`])
//! - **Documents**: Items, categories and the compiled list ([`document`] module)
//! - **Filters**: The active tag set / nights pair and the match
//!   evaluator ([`filter`] module)

pub mod document;
pub mod expr;
pub mod filter;

pub use document::{BringList, Category, Item, LOWEST_POSSIBLE_NIGHTS};
pub use expr::{BinOp, TagExpr};
pub use filter::{evaluate, ExprMatch, Filter};
