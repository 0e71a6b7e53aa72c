//! Public entry for the triage pipeline.
//!
//! Single high-level type to triage one PR or issue end to end:
//!
//! 1. **Stage 1 — fetch**: item snapshot from the code host. A fetch
//!    failure is terminal for the item (`failed` outcome).
//! 2. **Stage 2 — dedup**: candidate pool of recent open items plus
//!    optional neighbor-index hits, classified against two thresholds.
//! 3. **Stage 3 — base detection**: only when dedup found similar items;
//!    the pool narrows to exactly those and the five-signal scorer ranks
//!    them.
//! 4. **Stage 4 — review**: diff + item to the review analyzer.
//! 5. **Stage 5 — vision**: item + truncated review summary to the
//!    alignment analyzer.
//! 6. **Synthesis**: executive summary, priority, recommended action.
//!
//! Stages 2–5 are individually caught and recorded; one stage's failure
//! never erases another's result. The pipeline uses `tracing` for
//! per-stage debug logging and avoids `async-trait` and heap trait
//! objects — collaborators are enum-dispatched.

pub mod errors;
pub mod pipeline;
pub mod report;
pub mod synthesize;
pub mod worker;

pub use errors::{PipelineError, PipelineResult};
pub use pipeline::{StageToggles, TriagePipeline};
pub use report::format_comment;
pub use worker::{BatchSummary, Worker};
