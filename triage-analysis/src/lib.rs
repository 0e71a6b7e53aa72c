//! Review and vision-alignment analyzers.
//!
//! Both analyzers are two-variant enums: a deterministic heuristic branch
//! for runs without a configured model, and an LLM branch that builds a
//! prompt, extracts a JSON shape from the raw response, and falls back to
//! the heuristic result when the output is unusable. The pipeline consumes
//! their reports opaquely.

pub mod extract;
pub mod review;
pub mod vision;

pub use review::ReviewAnalyzer;
pub use vision::VisionAnalyzer;
