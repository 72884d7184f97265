use anyhow::{bail, Context, Result};
use codecommit_pipeline_hooks::conf::{self, BuildSettings, PipelineSettings};
use codecommit_pipeline_hooks::event::RepositoryEvent;
use codecommit_pipeline_hooks::init_tracing;
use codecommit_pipeline_hooks::pipeline::PipelineManager;
use codecommit_pipeline_hooks::trigger::BuildTrigger;
use std::env::args;
use tokio::io::{stdin, AsyncReadExt};

/// Run one of the handlers outside of Lambda, against an event read
/// from stdin. The handler is selected by the first argument, either
/// `pipeline` or `build`. The result is printed as JSON.
#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;
    let handler = args()
        .nth(1)
        .context("usage: replay <pipeline|build> < event.json")?;

    let mut raw_event = String::new();
    stdin()
        .read_to_string(&mut raw_event)
        .await
        .context("Failed to read the event from stdin")?;
    let event: RepositoryEvent =
        serde_json::from_str(&raw_event).context("Failed to parse the event")?;

    let aws_config = conf::aws_service_config().await;
    let result = match handler.as_str() {
        "pipeline" => {
            let manager = PipelineManager::new(
                PipelineSettings::from_env()?,
                aws_sdk_cloudformation::Client::new(&aws_config),
                aws_sdk_s3::Client::new(&aws_config),
            );
            serde_json::to_string(&manager.handle(&event).await?)?
        }
        "build" => {
            let trigger = BuildTrigger::new(
                BuildSettings::from_env()?,
                aws_sdk_codebuild::Client::new(&aws_config),
            );
            serde_json::to_string(&trigger.handle(&event).await?)?
        }
        other => bail!("Unknown handler {:?}; expected pipeline or build", other),
    };
    println!("{}", result);
    Ok(())
}
