//! Starts builds for pushed commits.

use crate::branch::{self, BranchNameOptions};
use crate::conf::BuildSettings;
use crate::error::HookError;
use crate::event::RepositoryEvent;
use crate::remote::{ArtifactOverride, BuildRequest, BuildService, BuildVariable};
use crate::response::Response;
use anyhow::Result;
use tracing::{debug, info, instrument};

/// Path under the artifacts bucket receiving a branch's build outputs.
pub fn build_artifact_path(project: &str, branch: &str) -> String {
    format!("{}/{}", project, branch)
}

/// Handles push events by starting a build of the pushed commit.
pub struct BuildTrigger<B> {
    settings: BuildSettings,
    builds: B,
}

impl<B: BuildService> BuildTrigger<B> {
    /// Build a trigger over the given build service.
    pub fn new(settings: BuildSettings, builds: B) -> Self {
        Self { settings, builds }
    }

    /// Handle a repository event. Branch deletions are ignored and
    /// produce no response.
    #[instrument(skip(self))]
    pub async fn handle(&self, event: &RepositoryEvent) -> Result<Option<Response>> {
        let reference = event.single_record()?.single_reference()?;
        if reference.deleted {
            info!("Ignoring branch deleted event");
            return Ok(None);
        }
        let branch = branch::resolve(&reference.reference, &BranchNameOptions::build())?;
        if reference.commit.is_empty() {
            return Err(HookError::MalformedEvent(format!(
                "reference {} carries no commit",
                reference.reference
            ))
            .into());
        }
        let request = self.build_request(&branch, &reference.commit)?;
        info!(
            "Starting build for {}/{} for commit {}",
            request.project, branch, reference.commit
        );
        let build_id = self.builds.start_build(&request).await?;
        debug!("Started build {:?}", build_id);
        Ok(Some(Response::ok(format!(
            "Successfully triggered CodeBuild for branch {} on commit {}",
            branch, reference.commit
        ))))
    }

    /// The build request for a commit on a branch.
    pub fn build_request(&self, branch: &str, commit: &str) -> Result<BuildRequest, HookError> {
        let project = self
            .settings
            .project_name
            .as_deref()
            .ok_or(HookError::MissingSetting("ProjectName"))?;
        let bucket = self
            .settings
            .build_artifacts_bucket
            .as_deref()
            .ok_or(HookError::MissingSetting("BuildArtifactsBucket"))?;
        Ok(BuildRequest {
            project: project.to_string(),
            source_version: commit.to_string(),
            variables: vec![
                BuildVariable::plaintext("branch_name", branch),
                BuildVariable::plaintext("build_artifacts_bucket", bucket),
            ],
            artifacts: ArtifactOverride {
                location: bucket.to_string(),
                path: build_artifact_path(project, branch),
                name: String::from("/"),
            },
        })
    }
}
