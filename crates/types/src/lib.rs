mod error;
pub use error::FixtureError;

pub mod fixture;
pub use fixture::{FixtureField, FixtureSource, InlineFixture, ProofFixture, Tamper, TamperOp};

pub mod utils;
