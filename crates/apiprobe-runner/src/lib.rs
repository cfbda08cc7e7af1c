//! apiprobe-runner: test case preparators and the suite that drives them

pub mod assert;
pub mod credentials;
pub mod datagen;
pub mod definition;
pub mod fixtures;
pub mod preparator;
pub mod suite;

pub use assert::{HttpResponse, Mismatch, check};
pub use definition::{load_api, parse_api};
pub use fixtures::{Fixture, FixtureError, load_fixtures};
pub use preparator::Preparator;
pub use suite::{CaseResult, Outcome, Requester, Suite, SuiteError, SuiteReport};
