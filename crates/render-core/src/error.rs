use thiserror::Error;

/// Failure while turning laid-out pages into PDF bytes.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("could not write document: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF object error: {0}")]
    Pdf(String),
    #[error("image '{name}' could not be embedded: {message}")]
    Image { name: String, message: String },
    #[error(transparent)]
    Layout(#[from] kolreport_layout::LayoutError),
    #[error("{0}")]
    Other(String),
}

impl From<lopdf::Error> for RenderError {
    fn from(err: lopdf::Error) -> Self {
        RenderError::Pdf(err.to_string())
    }
}
