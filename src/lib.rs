pub mod runner;
pub mod specification;
pub mod trace;
