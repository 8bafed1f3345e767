use std::fmt;

#[derive(Debug)]
pub enum ProviderError {
    Request(String),
    UnexpectedStatus { provider: &'static str, status: u16 },
    Decode(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProviderError::Request(msg) => write!(f, "Request error: {}", msg),
            ProviderError::UnexpectedStatus { provider, status } => {
                write!(f, "{} responded with status {}", provider, status)
            }
            ProviderError::Decode(msg) => write!(f, "Decode error: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}
