use thiserror::Error;

#[derive(Debug, Error)]
pub enum WavetabError {
    #[error(
        "wave {wave_id}: configured source column(s) {missing:?} not found; columns present: {present:?}"
    )]
    MissingColumns {
        wave_id: String,
        missing: Vec<String>,
        present: Vec<String>,
    },
    #[error("wave {wave_id}: no usable {signal} signal after all fallbacks")]
    MissingSignal {
        wave_id: String,
        signal: &'static str,
    },
    #[error("no usable wave inputs supplied")]
    NoWaves,
    #[error("cohort scheme {name:?}: {reason}")]
    InvalidScheme { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, WavetabError>;
