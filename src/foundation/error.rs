pub type GridShiftResult<T> = Result<T, GridShiftError>;

#[derive(thiserror::Error, Debug)]
pub enum GridShiftError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("infeasible layout: {0}")]
    InfeasibleLayout(String),

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("sample {index}: {source}")]
    Sample {
        index: u64,
        #[source]
        source: Box<GridShiftError>,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GridShiftError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn infeasible(msg: impl Into<String>) -> Self {
        Self::InfeasibleLayout(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Attach the batch index of the sample that failed.
    pub fn in_sample(self, index: u64) -> Self {
        match self {
            // Already tagged (e.g. by a nested helper); keep the innermost index.
            e @ Self::Sample { .. } => e,
            e => Self::Sample {
                index,
                source: Box::new(e),
            },
        }
    }

    /// Configuration errors abort a batch before any artifact is written.
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::Configuration(_) => true,
            Self::Sample { source, .. } => source.is_configuration(),
            _ => false,
        }
    }
}
