pub mod categories;
pub mod config;
pub mod table;

pub use categories::{InvolvementTier, TimeOfDay};
pub use config::{ColumnNames, OutputFormat, PipelineConfig, SourceGroup};
pub use table::{concat_frames, date_view, dates, null_counts, numeric_view, text_view, ColumnNulls};
