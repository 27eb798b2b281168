//! Panicking accessors for outcomes in tests

use rocket_network::Outcome;
use std::fmt::Debug;

pub trait OutcomeExt<F, T> {
    /// The failure; panics on success
    fn l(self) -> F;

    /// The success value; panics on failure
    fn r(self) -> T;
}

impl<F: Debug, T: Debug> OutcomeExt<F, T> for Outcome<F, T> {
    #[track_caller]
    fn l(self) -> F {
        match self {
            Outcome::Failure(failure) => failure,
            Outcome::Success(value) => panic!("expected a failure, got success: {:?}", value),
        }
    }

    #[track_caller]
    fn r(self) -> T {
        match self {
            Outcome::Success(value) => value,
            Outcome::Failure(failure) => panic!("expected a success, got failure: {:?}", failure),
        }
    }
}
