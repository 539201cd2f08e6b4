use thiserror::Error;

/// Fatal errors raised while loading, filtering or scoring a dataset.
///
/// Every variant is detected before the scoring stages start, so a run either
/// yields a complete ranking or one of these and nothing else.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset is missing required columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("dataset has no rows")]
    EmptyInput,

    #[error(
        "no data after filters (competitions: {competitions}, positions: {positions}, min nineties: {min_nineties})"
    )]
    FilterEmpty {
        competitions: String,
        positions: String,
        min_nineties: f64,
    },

    #[error("invalid scoring config: {}", .0.join("; "))]
    Config(Vec<String>),
}

impl ScoreError {
    /// Input-side failures: the dataset itself is unusable.
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            ScoreError::Io { .. }
                | ScoreError::Csv(_)
                | ScoreError::MissingColumns { .. }
                | ScoreError::EmptyInput
        )
    }
}
