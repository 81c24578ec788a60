//! APG Landmark Engine
//!
//! Locates the five canonical APG landmarks (A, B, C, D, E) with a sequential, windowed
//! peak/trough/inflection search, plus the peak-finding primitives it is built from.

mod landmarks;
mod peaks;
mod statistics;

pub use landmarks::{
    ExtractorConfig, ExtractorError, ExtractorVariant, Landmark, LandmarkExtractor,
    LandmarkRole, LandmarkSet, RobustParams,
};
pub use peaks::{
    argmin, find_peaks, first_upturn, gradient, local_maxima, peak_summary, prominence,
    PeakCriteria, PeakSummary,
};
pub use statistics::WaveStatistics;
