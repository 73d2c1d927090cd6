use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Markup writer error: {0}")]
    Markup(String),
    #[error("Reference to unresolved label {0}")]
    UnresolvedReference(String),
    #[error("Failed to write unit '{path}': {message}")]
    Sink { path: String, message: String },
    #[error("Other rendering error: {0}")]
    Other(String),
}

impl Clone for RenderError {
    fn clone(&self) -> Self {
        match self {
            RenderError::Io(err) => RenderError::Io(std::io::Error::new(err.kind(), err.to_string())),
            RenderError::Markup(m) => RenderError::Markup(m.clone()),
            RenderError::UnresolvedReference(l) => RenderError::UnresolvedReference(l.clone()),
            RenderError::Sink { path, message } => RenderError::Sink {
                path: path.clone(),
                message: message.clone(),
            },
            RenderError::Other(m) => RenderError::Other(m.clone()),
        }
    }
}

impl From<&str> for RenderError {
    fn from(s: &str) -> Self {
        RenderError::Other(s.to_string())
    }
}

impl From<std::string::FromUtf8Error> for RenderError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        RenderError::Markup(err.to_string())
    }
}
