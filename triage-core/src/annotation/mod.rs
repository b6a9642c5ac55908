//! Interactive annotation of the candidate queue.
//!
//! An [`AnnotationSession`] walks the queue in rank order, asking an
//! [`Operator`] for one [`Command`] per record. Labeled records end up in
//! per-category buckets; everything else stays in the working pool.

mod command;
mod operator;
mod session;
mod store;

pub use command::Command;
pub use operator::{Operator, Prompt, ScriptedOperator};
pub use session::{
    AnnotationSession, Decision, DecisionKind, DecisionLog, PresentReason, SessionOutcome,
    SessionState, SessionSummary, Transition,
};
pub use store::{append_bucket, persist, PoolFile};
