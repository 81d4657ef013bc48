extern crate serde_json;

use std::error::Error;
use std::fmt;

/// Raised when training is started on data that cannot produce a model.
#[derive(Debug, PartialEq)]
pub enum TrainingError {
    EmptyTrainingData,
    /// Non-finite entries showed up in the factor matrices, typically
    /// caused by a too large learning rate.
    NumericalInstability { epoch: u32 },
}

impl fmt::Display for TrainingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            TrainingError::EmptyTrainingData =>
                write!(f, "training requires at least one interaction between a user and an item"),
            TrainingError::NumericalInstability { epoch } =>
                write!(
                    f,
                    "factor matrices contain non-finite values after epoch {}, \
                     try a smaller learn rate",
                    epoch,
                ),
        }
    }
}

impl Error for TrainingError {}

/// Asking a mapping for an internal index that was never assigned. Always a
/// programming or data bug, not recoverable for the calling operation.
#[derive(Debug, PartialEq)]
pub struct LookupError {
    pub internal_id: u32,
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "no external identifier assigned to internal index {}", self.internal_id)
    }
}

impl Error for LookupError {}

#[derive(Debug)]
pub enum ModelError {
    NotTrained,
    UnknownMethod(String),
    Serde(serde_json::Error),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ModelError::NotTrained =>
                write!(f, "the model must be trained before it can be saved"),
            ModelError::UnknownMethod(ref method) =>
                write!(f, "unknown learning method '{}' in model file", method),
            ModelError::Serde(ref error) =>
                write!(f, "unable to read or write model: {}", error),
        }
    }
}

impl Error for ModelError {}

impl From<serde_json::Error> for ModelError {
    fn from(error: serde_json::Error) -> Self {
        ModelError::Serde(error)
    }
}
