pub mod expr;
pub mod plan;
pub mod planner;
