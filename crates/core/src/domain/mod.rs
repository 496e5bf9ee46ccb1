pub mod product;
pub mod quote;
pub mod rule;
pub mod validation;
