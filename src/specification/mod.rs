pub mod ltl;
pub mod render;
pub mod result;
pub mod syntax;
pub mod table;

#[cfg(test)]
mod ltl_equivalences;
