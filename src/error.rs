use thiserror::Error;

/// Type Alias: A rebranding of the `Result` enum from the standard library which focuses on errors
/// raised while configuring, stepping, or persisting a simulation.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the simulator can report. All of them are recoverable by the caller: supplying
/// corrected input is enough to continue.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid reference sequence: {0}")]
    InvalidSequence(String),
    #[error("frame count must be an integer between {min} and {max}, got {value}")]
    InvalidCapacity { value: usize, min: usize, max: usize },
    #[error("unknown replacement policy '{0}'")]
    UnknownPolicy(String),
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),
    #[error("reference sequence exhausted after {0} steps")]
    SequenceExhausted(usize),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::MalformedSnapshot(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(test)]
    mod error_tests {
        use super::*;

        #[test]
        fn capacity_message() {
            let err = Error::InvalidCapacity {
                value: 11,
                min: 1,
                max: 10,
            };
            assert_eq!(
                err.to_string(),
                "frame count must be an integer between 1 and 10, got 11"
            );
        }

        #[test]
        fn from_json() {
            let err: Error = serde_json::from_str::<u32>("{").unwrap_err().into();
            assert!(matches!(err, Error::MalformedSnapshot(_)));
        }
    }
}
