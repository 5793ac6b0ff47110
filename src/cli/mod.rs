//! Release workflow behind the command line

pub mod orchestration;

pub use orchestration::{
    prepare_package, run_release_workflow, ReleaseWorkflowArgs, WorkflowResult,
};
