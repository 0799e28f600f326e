use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("audio device error: {0}")]
    Device(#[from] DeviceError),

    #[error("recognition error: {0}")]
    Decode(#[from] DecodeError),

    #[error("text dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Capture stream open/close/runtime failures. Open failures abort the
/// Active transition; runtime and close failures are reported and the
/// controller keeps going.
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("input device not found: {name:?}")]
    NotFound { name: Option<String> },

    #[error("no input device available")]
    NoInputDevice,

    #[error("format not supported: {format}")]
    FormatNotSupported { format: String },

    #[error("stream error: {0}")]
    Stream(#[from] cpal::StreamError),

    #[error("build stream error: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("play stream error: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("supported stream configs error: {0}")]
    SupportedStreamConfigs(#[from] cpal::SupportedStreamConfigsError),

    #[error("capture thread error: {0}")]
    Thread(String),
}

/// Decoder failure on a single frame or at model load. Per-frame failures
/// never terminate the recognition worker.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("failed to load model: {0}")]
    Model(String),

    #[error("decoder rejected frame: {0}")]
    Frame(String),
}

/// Output sink failure for one injection or clipboard write. Isolated per
/// utterance; the transcript advances regardless.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("clipboard error: {0}")]
    Clipboard(String),

    #[error("paste keystroke failed: {0}")]
    Keystroke(String),

    #[error("no injection backend available")]
    Unavailable,
}
