use anyhow::{anyhow, Result};
use codecommit_pipeline_hooks::conf::{self, BuildSettings};
use codecommit_pipeline_hooks::event::RepositoryEvent;
use codecommit_pipeline_hooks::init_tracing;
use codecommit_pipeline_hooks::response::Response;
use codecommit_pipeline_hooks::trigger::BuildTrigger;
use lambda_runtime::{run, service_fn, LambdaEvent};

/// Start a build for the commit in the event
async fn function_handler(
    event: LambdaEvent<RepositoryEvent>,
    trigger: &BuildTrigger<aws_sdk_codebuild::Client>,
) -> Result<Option<Response>> {
    trigger.handle(&event.payload).await
}

/// Run an AWS Lambda function that listens to CodeCommit push events,
/// and that starts a CodeBuild run for each pushed commit.
#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;
    let settings = BuildSettings::from_env()?;
    let aws_config = conf::aws_service_config().await;
    let trigger = BuildTrigger::new(settings, aws_sdk_codebuild::Client::new(&aws_config));

    run(service_fn(|event| function_handler(event, &trigger)))
        .await
        .map_err(|e| anyhow!("{:?}", e))
}
