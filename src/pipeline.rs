//! Provisions and tears down per-branch deployment pipelines.
//!
//! When a branch is created, a stack is created from the pipeline
//! template, which in turn deploys a pipeline for the branch. When a
//! branch is deleted, the stack is deleted and the branch's build
//! artifacts are purged.

use crate::branch::{self, BranchNameOptions, Stage};
use crate::conf::PipelineSettings;
use crate::event::{RefChange, RepositoryEvent};
use crate::remote::{
    Capability, ObjectStore, OnFailure, StackOrchestrator, StackParameter, StackSpec,
};
use crate::response::Response;
use anyhow::Result;
use tracing::{debug, info, instrument, warn};

/// Body of the response to events that require no action.
pub const NOTHING_TO_DO: &str = "Nothing to do!";

/// Name of the pipeline stack of a branch.
pub fn stack_name(project: &str, branch: &str) -> String {
    format!("{}-{}-DeploymentPipeline", project, branch)
}

/// Storage prefix holding every artifact of a branch.
pub fn artifact_prefix(project: &str, branch: &str) -> String {
    format!("{}/{}/", project, branch)
}

/// Location of the packaged stack the pipeline deploys.
pub fn stack_artifact_location(project: &str, branch: &str) -> String {
    format!("{}/{}/latest/cloudformation/stack.zip", project, branch)
}

/// Name of the policies granted to every pipeline of a project.
pub fn project_policies(project: &str) -> String {
    format!("{}-Policies", project)
}

/// The result of trying to delete a branch's pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted { status_code: u16, message: String },
    DeleteFailed { message: String },
}

impl From<DeleteOutcome> for Response {
    fn from(outcome: DeleteOutcome) -> Self {
        match outcome {
            DeleteOutcome::Deleted {
                status_code,
                message,
            } => Response::new(status_code, message),
            DeleteOutcome::DeleteFailed { message } => Response::new(500, message),
        }
    }
}

/// Handles branch creation and deletion events.
pub struct PipelineManager<C, S> {
    settings: PipelineSettings,
    stacks: C,
    storage: S,
}

impl<C, S> PipelineManager<C, S>
where
    C: StackOrchestrator,
    S: ObjectStore,
{
    /// Build a manager over the given services.
    pub fn new(settings: PipelineSettings, stacks: C, storage: S) -> Self {
        Self {
            settings,
            stacks,
            storage,
        }
    }

    /// Handle a repository event. Malformed events and failures to
    /// create a stack are returned as errors; failures to delete are
    /// reported through the response.
    #[instrument(skip(self))]
    pub async fn handle(&self, event: &RepositoryEvent) -> Result<Response> {
        let reference = event.single_record()?.single_reference()?;
        let branch = branch::resolve(&reference.reference, &BranchNameOptions::pipeline())?;
        let response = match reference.change(&branch)? {
            RefChange::Created => self.create(&branch).await?,
            RefChange::Deleted => self.attempt_delete(&branch).await.into(),
            RefChange::Updated => Response::ok(NOTHING_TO_DO),
        };
        debug!("Return: ({}) {}", response.status_code, response.body);
        Ok(response)
    }

    /// The stack creation request for a branch.
    pub fn stack_spec(&self, branch: &str) -> StackSpec {
        let project = &self.settings.project_name;
        StackSpec {
            name: stack_name(project, branch),
            template_url: self.settings.template_url.clone(),
            parameters: vec![
                StackParameter::new(
                    "BuildArtifactsBucket",
                    &self.settings.build_artifacts_bucket,
                ),
                StackParameter::new("StackS3Location", stack_artifact_location(project, branch)),
                StackParameter::new("ProjectName", project),
                StackParameter::new("ProjectPolicyArns", project_policies(project)),
                StackParameter::new("BranchName", branch),
                StackParameter::new("Stage", Stage::of(branch).as_str()),
            ],
            capabilities: vec![Capability::Iam, Capability::NamedIam, Capability::AutoExpand],
            on_failure: OnFailure::Rollback,
        }
    }

    async fn create(&self, branch: &str) -> Result<Response> {
        let project = &self.settings.project_name;
        info!(
            "Creating deployment pipeline for {}/{} from template file {}",
            project, branch, self.settings.template_url
        );
        let status_code = self.stacks.create_stack(&self.stack_spec(branch)).await?;
        Ok(Response::new(
            status_code,
            format!(
                "Deployment pipeline for branch {}/{} was successfully created",
                project, branch
            ),
        ))
    }

    /// Delete the pipeline stack of a branch and purge its artifacts.
    /// Stops at the first failure.
    pub async fn attempt_delete(&self, branch: &str) -> DeleteOutcome {
        let project = &self.settings.project_name;
        info!("Deleting deployment pipeline for {}/{}", project, branch);
        match self.delete(branch).await {
            Ok(status_code) => DeleteOutcome::Deleted {
                status_code,
                message: format!(
                    "Code pipeline and directories for {}/{} deleted successfully",
                    project, branch
                ),
            },
            Err(e) => {
                let message = format!(
                    "Pipeline stack named {}/{} could not be deleted: {:#}",
                    project, branch, e
                );
                warn!("{}", message);
                DeleteOutcome::DeleteFailed { message }
            }
        }
    }

    async fn delete(&self, branch: &str) -> Result<u16> {
        let project = &self.settings.project_name;
        let status_code = self
            .stacks
            .delete_stack(&stack_name(project, branch))
            .await?;
        self.purge(&artifact_prefix(project, branch)).await?;
        Ok(status_code)
    }

    async fn purge(&self, prefix: &str) -> Result<()> {
        let bucket = &self.settings.build_artifacts_bucket;
        info!("Deleting {}/{}", bucket, prefix);
        let keys = self.storage.list_keys(bucket, prefix).await?;
        debug!("Received the following object list: {:?}", keys);
        if keys.is_empty() {
            return Ok(());
        }
        self.storage.delete_keys(bucket, &keys).await
    }
}
