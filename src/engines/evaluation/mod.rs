pub mod expression;
pub mod objective;

pub use expression::{parse, Expr};
pub use objective::Objective;
