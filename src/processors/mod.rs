pub mod coherence_filter;
pub mod consolidator;
pub mod deduplicator;
pub mod feature_enricher;
pub mod null_imputer;
pub mod pipeline;

pub use coherence_filter::{
    CoherenceFilter, CoherenceReport, CoherenceRule, RuleCheck, RuleCost, RuleDrops,
};
pub use consolidator::{parse_date, parse_date_column, Consolidator, FileLoad};
pub use deduplicator::Deduplicator;
pub use feature_enricher::FeatureEnricher;
pub use null_imputer::{ColumnFill, FillStrategy, ImputationReport, NullImputer};
pub use pipeline::{AccidentPipeline, Consolidation, ConsolidationReport};
