pub mod chain;
pub mod position;
pub mod scheme;
