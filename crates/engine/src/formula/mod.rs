// Formula parsing and reference extraction

pub mod parser;
pub mod refs;
