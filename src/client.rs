//! Implements the remote services on top of the AWS SDK clients.

use crate::remote::{BuildRequest, BuildService, ObjectStore, StackOrchestrator, StackSpec};
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_cloudformation::types as cfn;
use aws_sdk_codebuild::types as codebuild;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use tracing::debug;

/// The largest amount of keys S3 accepts in a single delete request.
const MAX_DELETE_BATCH: usize = 1000;

/// The status reported for accepted orchestrator requests. The SDK
/// only yields an output for successful responses.
const ACCEPTED_STATUS: u16 = 200;

/// Lists all keys found in a bucket under a given prefix. Returns a
/// page of keys and a token that can be used for a subsequent fetch.
pub async fn list_keys_page(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    prefix: &str,
    next: &Option<String>,
) -> Result<(Vec<String>, Option<String>)> {
    let mut operation = client.list_objects_v2().bucket(bucket).prefix(prefix);
    if let Some(continuation_token) = next {
        operation = operation.continuation_token(continuation_token)
    }
    let response = operation.send().await.with_context(|| {
        format!(
            "Failed to list keys under {:?} in bucket {:?} \
             using {} continuation token",
            prefix,
            bucket,
            if next.is_some() { "a" } else { "no" }
        )
    })?;
    Ok((
        response
            .contents()
            .unwrap_or_default()
            .iter()
            .filter_map(|o| o.key().map(String::from))
            .collect(),
        response.next_continuation_token().map(String::from),
    ))
}

#[async_trait]
impl ObjectStore for aws_sdk_s3::Client {
    async fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut next = None;
        loop {
            let (page, token) = list_keys_page(self, bucket, prefix, &next).await?;
            keys.extend(page);
            if token.is_none() {
                break;
            }
            next = token;
        }
        Ok(keys)
    }

    async fn delete_keys(&self, bucket: &str, keys: &[String]) -> Result<()> {
        for chunk in keys.chunks(MAX_DELETE_BATCH) {
            let objects = chunk
                .iter()
                .map(|key| ObjectIdentifier::builder().key(key).build())
                .collect();
            let result = self
                .delete_objects()
                .bucket(bucket)
                .delete(Delete::builder().set_objects(Some(objects)).quiet(true).build())
                .send()
                .await
                .with_context(|| {
                    format!(
                        "Failed to delete {} objects from bucket {:?}",
                        chunk.len(),
                        bucket
                    )
                })?;
            debug!("Delete objects result: {:?}", result);
        }
        Ok(())
    }
}

#[async_trait]
impl StackOrchestrator for aws_sdk_cloudformation::Client {
    async fn create_stack(&self, spec: &StackSpec) -> Result<u16> {
        let result = self
            .create_stack()
            .stack_name(&spec.name)
            .template_url(&spec.template_url)
            .set_parameters(Some(
                spec.parameters
                    .iter()
                    .map(|parameter| {
                        cfn::Parameter::builder()
                            .parameter_key(&parameter.key)
                            .parameter_value(&parameter.value)
                            .build()
                    })
                    .collect(),
            ))
            .set_capabilities(Some(
                spec.capabilities
                    .iter()
                    .map(|capability| cfn::Capability::from(capability.as_str()))
                    .collect(),
            ))
            .on_failure(cfn::OnFailure::from(spec.on_failure.as_str()))
            .send()
            .await
            .with_context(|| format!("Failed to create stack {:?}", spec.name))?;
        debug!("Create stack result: {:?}", result);
        Ok(ACCEPTED_STATUS)
    }

    async fn delete_stack(&self, name: &str) -> Result<u16> {
        let result = self
            .delete_stack()
            .stack_name(name)
            .send()
            .await
            .with_context(|| format!("Failed to delete stack {:?}", name))?;
        debug!("Delete stack result: {:?}", result);
        Ok(ACCEPTED_STATUS)
    }
}

#[async_trait]
impl BuildService for aws_sdk_codebuild::Client {
    async fn start_build(&self, request: &BuildRequest) -> Result<Option<String>> {
        let variables = request
            .variables
            .iter()
            .map(|variable| {
                codebuild::EnvironmentVariable::builder()
                    .name(&variable.name)
                    .value(&variable.value)
                    .r#type(codebuild::EnvironmentVariableType::from("PLAINTEXT"))
                    .build()
            })
            .collect();
        let artifacts = codebuild::ProjectArtifacts::builder()
            .r#type(codebuild::ArtifactsType::from("S3"))
            .location(&request.artifacts.location)
            .path(&request.artifacts.path)
            .namespace_type(codebuild::ArtifactNamespace::from("NONE"))
            .name(&request.artifacts.name)
            .override_artifact_name(true)
            .packaging(codebuild::ArtifactPackaging::from("NONE"))
            .build();
        let result = self
            .start_build()
            .project_name(&request.project)
            .source_version(&request.source_version)
            .set_environment_variables_override(Some(variables))
            .artifacts_override(artifacts)
            .send()
            .await
            .with_context(|| {
                format!(
                    "Failed to start a build of project {:?} for source version {:?}",
                    request.project, request.source_version
                )
            })?;
        debug!("Start build result: {:?}", result);
        Ok(result.build_value().and_then(|build| build.id()).map(String::from))
    }
}
