//! Automation hooks for CodeCommit repositories: per-branch deployment
//! pipelines managed through CloudFormation, and CodeBuild runs for
//! pushed commits.

pub mod branch;
pub mod client;
pub mod conf;
pub mod error;
pub mod event;
pub mod pipeline;
pub mod remote;
pub mod response;
pub mod trigger;

/// Install the global tracing subscriber. Timestamps and targets are
/// left out since CloudWatch already records them.
pub fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(conf::log_level()?)
        .with_target(false)
        .without_time()
        .init();
    Ok(())
}
