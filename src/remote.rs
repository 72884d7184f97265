//! Defines the remote services the handlers talk to, independently of
//! the AWS SDK. Implementations for the SDK clients live in
//! [`crate::client`].

use anyhow::Result;
use async_trait::async_trait;

/// A named stack template parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackParameter {
    pub key: String,
    pub value: String,
}

impl StackParameter {
    /// Build a parameter from its key and value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Grants a stack needs to be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Iam,
    NamedIam,
    AutoExpand,
}

impl Capability {
    /// The capability's name as the orchestrator spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Iam => "CAPABILITY_IAM",
            Capability::NamedIam => "CAPABILITY_NAMED_IAM",
            Capability::AutoExpand => "CAPABILITY_AUTO_EXPAND",
        }
    }
}

/// What the orchestrator does with a stack whose creation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    Rollback,
}

impl OnFailure {
    /// The policy's name as the orchestrator spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            OnFailure::Rollback => "ROLLBACK",
        }
    }
}

/// A stack creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSpec {
    pub name: String,
    pub template_url: String,
    pub parameters: Vec<StackParameter>,
    pub capabilities: Vec<Capability>,
    pub on_failure: OnFailure,
}

/// A plaintext environment variable override for a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildVariable {
    pub name: String,
    pub value: String,
}

impl BuildVariable {
    /// Build a plaintext variable.
    pub fn plaintext(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Where a build uploads its outputs. Outputs land unpackaged under
/// `{location}/{path}/{name}` without an extra namespace directory,
/// overwriting previous outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactOverride {
    pub location: String,
    pub path: String,
    pub name: String,
}

/// A build start request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub project: String,
    pub source_version: String,
    pub variables: Vec<BuildVariable>,
    pub artifacts: ArtifactOverride,
}

/// The infrastructure-as-code orchestrator. Both calls return the
/// HTTP status the orchestrator answered with.
#[async_trait]
pub trait StackOrchestrator: Sync {
    async fn create_stack(&self, spec: &StackSpec) -> Result<u16>;

    async fn delete_stack(&self, name: &str) -> Result<u16>;
}

/// The object store holding build artifacts.
#[async_trait]
pub trait ObjectStore: Sync {
    /// Lists every key under `prefix`.
    async fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>>;

    /// Deletes the given keys in quiet mode: per-key failures are not
    /// reported, only failures of the whole call.
    async fn delete_keys(&self, bucket: &str, keys: &[String]) -> Result<()>;
}

/// The build service. Returns the id of the started build, if the
/// service reported one.
#[async_trait]
pub trait BuildService: Sync {
    async fn start_build(&self, request: &BuildRequest) -> Result<Option<String>>;
}
