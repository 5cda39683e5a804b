pub mod resolver;
pub mod table;
