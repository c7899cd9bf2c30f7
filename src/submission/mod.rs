pub mod origin;
pub mod parser;
pub mod pipeline;
