use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlayoutError {
    #[error("AMCP error: {0}")]
    Amcp(String),
    #[error("AMCP command '{0}' rejected with code {1}")]
    AmcpRejected(String, u16),
    #[error("Invalid AMCP response: {0}")]
    AmcpBadResponse(String),
}

impl PlayoutError {
    pub fn amcp(message: impl Into<String>) -> Self {
        PlayoutError::Amcp(message.into())
    }
}
