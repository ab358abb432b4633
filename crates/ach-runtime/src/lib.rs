//! Queue Driver orchestration glue, the Event Pipeline, and the Supervisor
//! Loop: the single cooperative worker that ties `ach-db`, `ach-eval`, and
//! `ach-render` together.

mod pipeline;
mod supervisor;

pub use pipeline::process_event;
pub use supervisor::Supervisor;
