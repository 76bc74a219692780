pub mod evaluator;
pub mod results;
