pub mod scope;
pub mod tables;
