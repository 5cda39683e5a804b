pub mod byte_length;
pub mod category;
pub mod config;
pub mod entitlement;
pub mod export;
pub mod generation;
pub mod keywords;
pub mod pipeline;
pub mod sources;

pub mod error;
