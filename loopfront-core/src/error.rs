use thiserror::Error;

#[derive(Error, Debug)]
pub enum ThumbError {
    #[error("not a valid video URL")]
    InvalidSource,

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("composition failed: {0}")]
    Composition(String),

    #[error("object store error: {0}")]
    Storage(String),

    #[error("record store error: {0}")]
    Record(String),

    #[error("video load timed out")]
    Timeout,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[cfg(feature = "ffmpeg")]
    #[error("FFmpeg error: {0}")]
    Ffmpeg(#[from] ffmpeg_next::Error),
}

pub type Result<T> = std::result::Result<T, ThumbError>;
