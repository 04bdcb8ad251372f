pub mod expr;
pub mod operator;
pub mod planner;
