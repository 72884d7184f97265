//! Defines configuration as read from the environment.
//!
//! The environment variable names follow the parameter names of the
//! deployment template (`BuildArtifactsBucket`, `ProjectName`,
//! `TemplateURL`). Since variable names are matched case-insensitively,
//! fields are renamed to their lower-cased form.

use crate::error::HookError;
use anyhow::Result;
use aws_config::{from_env, SdkConfig};
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use tracing::Level;

/// Settings of the pipeline lifecycle handler. All of them are
/// required.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    /// The bucket holding build artifacts, from `BuildArtifactsBucket`.
    #[serde(rename = "buildartifactsbucket")]
    pub build_artifacts_bucket: String,

    /// The project every pipeline belongs to, from `ProjectName`.
    #[serde(rename = "projectname")]
    pub project_name: String,

    /// Location of the pipeline stack template, from `TemplateURL`.
    #[serde(rename = "templateurl")]
    pub template_url: String,
}

impl PipelineSettings {
    /// Read the settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(env::vars())
    }

    /// Read the settings from the given variables.
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let settings: Self = envy::from_iter(vars)?;
        if settings.project_name.is_empty() {
            return Err(HookError::InvalidSetting("ProjectName").into());
        }
        Ok(settings)
    }
}

/// Settings of the build trigger handler. These are only checked
/// when a build is about to start.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildSettings {
    /// The bucket receiving build outputs, from `BuildArtifactsBucket`.
    #[serde(rename = "buildartifactsbucket", default)]
    pub build_artifacts_bucket: Option<String>,

    /// The build project, from `ProjectName`.
    #[serde(rename = "projectname", default)]
    pub project_name: Option<String>,
}

impl BuildSettings {
    /// Read the settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(env::vars())
    }

    /// Read the settings from the given variables.
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::from_iter(vars)?)
    }
}

/// The maximum log level, read from `LOG_LEVEL`. Defaults to `info`.
pub fn log_level() -> Result<Level> {
    match env::var("LOG_LEVEL") {
        Ok(level) => Ok(Level::from_str(&level)?),
        Err(_) => Ok(Level::INFO),
    }
}

/// Build the shared AWS configuration. `AWS_ENDPOINT_URL` overrides
/// the endpoint of every service client.
pub async fn aws_service_config() -> SdkConfig {
    let endpoint_url_var = env::var("AWS_ENDPOINT_URL");
    if let Ok(endpoint_url) = endpoint_url_var {
        from_env()
            .endpoint_url(
                if endpoint_url.starts_with("http://") || endpoint_url.starts_with("https://") {
                    endpoint_url
                } else {
                    format!("https://{}", endpoint_url)
                },
            )
            .region("us-east-1") // should be OK since the endpoint was overridden
            .load()
    } else {
        from_env().load()
    }
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn reads_pipeline_settings_by_template_parameter_names() {
        let settings = PipelineSettings::from_vars(vars(&[
            ("BuildArtifactsBucket", "artifacts"),
            ("ProjectName", "shop"),
            ("TemplateURL", "https://s3.amazonaws.com/templates/pipeline.yaml"),
            ("UNRELATED", "ignored"),
        ]))
        .unwrap();
        assert_eq!(settings.build_artifacts_bucket, "artifacts");
        assert_eq!(settings.project_name, "shop");
        assert_eq!(
            settings.template_url,
            "https://s3.amazonaws.com/templates/pipeline.yaml"
        );
    }

    #[test]
    fn pipeline_settings_are_required() {
        assert!(PipelineSettings::from_vars(vars(&[
            ("BuildArtifactsBucket", "artifacts"),
            ("ProjectName", "shop"),
        ]))
        .is_err());
    }

    #[test]
    fn pipeline_project_name_cannot_be_empty() {
        let error = PipelineSettings::from_vars(vars(&[
            ("BuildArtifactsBucket", "artifacts"),
            ("ProjectName", ""),
            ("TemplateURL", "https://example.com/t.yaml"),
        ]))
        .unwrap_err();
        assert_eq!(
            error.downcast_ref::<HookError>(),
            Some(&HookError::InvalidSetting("ProjectName"))
        );
    }

    #[test]
    fn build_settings_are_optional() {
        let settings = BuildSettings::from_vars(vars(&[("ProjectName", "shop")])).unwrap();
        assert_eq!(settings.project_name.as_deref(), Some("shop"));
        assert_eq!(settings.build_artifacts_bucket, None);
    }
}
