use thiserror::Error;

/// Errors returned by the checked interval tree constructors
#[allow(clippy::module_name_repetitions)] // this-error generate code false-positive
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntervalTreeError {
    /// The input of a sorted constructor is not ascending by start
    #[error("values are not sorted by start: value at index {index} starts at {start}, before its predecessor at {previous_start}")]
    Unsorted {
        /// Index of the first out-of-order value
        index: usize,
        /// Start of the out-of-order value
        start: usize,
        /// Start of the value preceding it
        previous_start: usize,
    },
    /// The configuration cannot be used to build a tree
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
