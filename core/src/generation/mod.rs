pub mod interface;
pub mod openai;
pub mod parse;
pub mod prompts;
