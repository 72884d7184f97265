use anyhow::{anyhow, Result};
use codecommit_pipeline_hooks::conf::{self, PipelineSettings};
use codecommit_pipeline_hooks::event::RepositoryEvent;
use codecommit_pipeline_hooks::init_tracing;
use codecommit_pipeline_hooks::pipeline::PipelineManager;
use codecommit_pipeline_hooks::response::Response;
use lambda_runtime::{run, service_fn, LambdaEvent};

type Manager = PipelineManager<aws_sdk_cloudformation::Client, aws_sdk_s3::Client>;

/// Create or delete the deployment pipeline of the branch in the event
async fn function_handler(
    event: LambdaEvent<RepositoryEvent>,
    manager: &Manager,
) -> Result<Response> {
    manager.handle(&event.payload).await
}

/// Run an AWS Lambda function that listens to CodeCommit branch
/// creation and deletion events, and that creates or deletes the
/// CloudFormation stack holding the branch's deployment pipeline.
#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;
    let settings = PipelineSettings::from_env()?;
    let aws_config = conf::aws_service_config().await;
    let manager = PipelineManager::new(
        settings,
        aws_sdk_cloudformation::Client::new(&aws_config),
        aws_sdk_s3::Client::new(&aws_config),
    );

    run(service_fn(|event| function_handler(event, &manager)))
        .await
        .map_err(|e| anyhow!("{:?}", e))
}
