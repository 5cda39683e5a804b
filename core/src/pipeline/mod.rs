pub mod batch;
pub mod edit;
pub mod orchestrator;
pub mod stage;
