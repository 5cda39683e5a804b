pub mod aggregate;
pub mod collector;
pub mod enrich;
pub mod frequency;
pub mod model;
pub mod rank;
pub mod related;
