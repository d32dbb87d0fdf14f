//! Core business logic: dividend normalization and instrument ranking

pub mod config;
pub mod detect;
pub mod frequency;
pub mod history;
pub mod log;
pub mod normalize;
pub mod range;
pub mod ranking;
pub mod record;
pub mod report;
pub mod yearly;
pub mod zscore;

// Re-export main types for cleaner imports
pub use frequency::Frequency;
pub use history::{CorporateActionProvider, DividendHistoryProvider, SymbolHistory};
pub use range::TimeRange;
pub use ranking::{InstrumentKind, RankingError, RankingWeights, Timeframe};
pub use record::{DividendRecord, PaymentType, RawDividendRecord};
