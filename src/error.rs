/// Everything that can keep the background from showing up.
///
/// None of these reach the user: boot paths log them and leave the page
/// without the decoration.
#[derive(Debug, thiserror::Error)]
pub enum BackgroundError {
    #[error("page has no anchor element for the rendering surface")]
    MissingAnchor,

    #[error("rendering backend unavailable: {0}")]
    Renderer(String),

    #[error("invalid terrain configuration: {0}")]
    InvalidConfig(String),
}

impl BackgroundError {
    pub fn renderer<T: ToString>(msg: T) -> Self {
        BackgroundError::Renderer(msg.to_string())
    }

    pub fn invalid_config<T: ToString>(msg: T) -> Self {
        BackgroundError::InvalidConfig(msg.to_string())
    }
}

pub type BackgroundResult<T> = Result<T, BackgroundError>;
