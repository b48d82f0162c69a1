// Request pipeline: store in, pure computation, store out.
//
// The only place that talks to both the rating store and the scoring
// functions. Transports (CLI, web) call into `Recommender` and never reach
// the store or the scorer on their own.

pub mod recommender;

pub use recommender::Recommender;
