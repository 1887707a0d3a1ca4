// Library interface for blogsum modules
// This allows tests and other binaries to import modules

pub mod dictionary;
pub mod errors;
pub mod extraction;
pub mod fetcher;
pub mod persistence;
pub mod pipeline;
pub mod server;
pub mod storage;
pub mod summarizer;
pub mod translator;
