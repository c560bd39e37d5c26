use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Network {network:?} not attached to container {container}")]
    NetworkNotFound { container: String, network: String },

    #[error("Invalid port: {0:?}")]
    InvalidPort(String),
}
