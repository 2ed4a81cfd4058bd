pub mod encoding;
pub mod source_reader;

pub use encoding::{resolve_label, EncodingPolicy};
pub use source_reader::{LoadReport, SourceReader};
