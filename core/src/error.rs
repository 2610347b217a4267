use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModemError {
    #[error("Unsupported sample rate: {0}")]
    UnsupportedRate(u32),

    #[error("Unsupported operation mode: {0}")]
    UnsupportedMode(u8),

    #[error("Unsupported frequency offset: {0} Hz")]
    UnsupportedOffset(i32),

    #[error("Frequency offset must be divisible by 50")]
    OffsetNotDivisible(i32),

    #[error("Unsupported call sign")]
    InvalidCallSign,

    #[error("Unsupported channel count: {0}")]
    UnsupportedChannels(u16),

    #[error("Payload too large: {0} bytes")]
    PayloadTooLarge(usize),

    #[error("PCM sink failure: {0}")]
    Sink(String),
}

pub type Result<T> = std::result::Result<T, ModemError>;
