pub mod affinity;
pub mod feedback;
pub mod profile;
pub mod recommend;

pub use affinity::{analyze_similarity, AffinityParams, AffinityReport, UserMatch};
pub use feedback::FeedbackSummary;
pub use profile::{GenreProfile, GenreScore};
pub use recommend::{recommend, Recommendations, ScoredItem, DEFAULT_TOP_N};
