// Extraction backend protocol: request submission, response decoding,
// confidence classification
pub mod client;
pub mod confidence;
pub mod protocol;

pub use client::ExtractionClient;
pub use protocol::ExtractionResult;
