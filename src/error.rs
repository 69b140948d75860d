// error.rs - Engine error type
//
// Nothing here ever reaches a running frame. Errors surface at mount or
// configuration time; afterwards every failure degrades to "no animation".

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("degenerate surface {width}x{height}")]
    DegenerateSurface { width: f32, height: f32 },

    #[error("drawing context unavailable: {0}")]
    Context(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
