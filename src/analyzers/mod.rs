pub mod summary;

pub use summary::{AccidentAnalyzer, AccidentStatistics, Casualties};
