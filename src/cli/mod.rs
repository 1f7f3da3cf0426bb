pub mod orchestration;

pub use orchestration::{
    run_changelog, ChangelogWorkflow, DeliveryStatus, ReleaseRequest, RunOptions, WorkflowOutcome,
};
