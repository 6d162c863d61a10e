use lp_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid routing configuration: {0}")]
    Config(#[from] CoreError),

    #[error("failed to spawn path finder worker: {0}")]
    Spawn(#[source] std::io::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
