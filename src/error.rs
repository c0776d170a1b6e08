use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("either --xds-address or --xds-label, not both")]
    ConflictingTarget,
    #[error("flag --{} is not registered", name)]
    MissingFlag { name: String },
    #[error("invalid value for --{}: {}", name, msg)]
    InvalidFlag { name: String, msg: String },
    #[error("control plane target is not determined: set --xds-address or --xds-label")]
    UndeterminedTarget,
    #[error("pod discovery is required for label selector {}", selector)]
    DiscoveryRequired { selector: String },
    #[error("invalid endpoint")]
    InvalidEndpoint(#[source] tonic::transport::Error),
    #[error("failed to serialize")]
    Serialize(#[source] serde_json::Error),
    #[error(transparent)]
    Parse(#[from] clap::Error),
    #[error("failed to initialize tracing: {0}")]
    Trace(String),
}
