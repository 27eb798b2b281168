//! Two-variant result returned by every datasource call

use serde::{Deserialize, Serialize};

/// Either a failure `F` or a success value `T`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome<F, T> {
    Success(T),
    Failure(F),
}

impl<F, T> Outcome<F, T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    /// Success value, if any
    pub fn success(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    /// Failure value, if any
    pub fn failure(self) -> Option<F> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(error) => Some(error),
        }
    }

    pub fn as_ref(&self) -> Outcome<&F, &T> {
        match self {
            Outcome::Success(value) => Outcome::Success(value),
            Outcome::Failure(error) => Outcome::Failure(error),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<F, U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Failure(error) => Outcome::Failure(error),
        }
    }

    pub fn map_failure<G>(self, f: impl FnOnce(F) -> G) -> Outcome<G, T> {
        match self {
            Outcome::Success(value) => Outcome::Success(value),
            Outcome::Failure(error) => Outcome::Failure(f(error)),
        }
    }

    /// Chain another fallible step on success
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Outcome<F, U>) -> Outcome<F, U> {
        match self {
            Outcome::Success(value) => f(value),
            Outcome::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Collapse both sides into a single value
    pub fn fold<R>(self, on_failure: impl FnOnce(F) -> R, on_success: impl FnOnce(T) -> R) -> R {
        match self {
            Outcome::Success(value) => on_success(value),
            Outcome::Failure(error) => on_failure(error),
        }
    }

    pub fn into_result(self) -> Result<T, F> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(error) => Err(error),
        }
    }
}

impl<F, T> From<Result<T, F>> for Outcome<F, T> {
    fn from(result: Result<T, F>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(error) => Outcome::Failure(error),
        }
    }
}
