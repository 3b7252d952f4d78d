use std::{collections::HashSet, fmt, path::Path};

use alloy_primitives::Bytes;
use groth16_harness_types::{FixtureError, FixtureSource, ProofFixture, Tamper};
use groth16_harness_verifier::{Error, VerifyOutcome};
use serde::{Deserialize, Serialize};

/// Outcome a case expects from `verify`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    /// The contract must return `true`.
    #[default]
    Accept,
    /// The contract must return `false` or revert.
    Reject,
}

/// One entry of the suite table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    /// Disabled cases stay in the table and are reported as skipped.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub source: FixtureSource,
    /// Single-byte mutation applied after loading the fixture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tamper: Option<Tamper>,
    #[serde(default)]
    pub expect: Expectation,
}

fn enabled_by_default() -> bool {
    true
}

impl TestCase {
    /// An enabled case expecting the fixture to verify.
    pub fn new(name: impl Into<String>, source: FixtureSource) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            source,
            tamper: None,
            expect: Expectation::Accept,
        }
    }

    /// Tamper with the fixture and expect it to be rejected.
    pub fn tampered(mut self, tamper: Tamper) -> Self {
        self.tamper = Some(tamper);
        self.expect = Expectation::Reject;
        self
    }

    pub fn expect(mut self, expect: Expectation) -> Self {
        self.expect = expect;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Load the case's fixture, tampered if configured.
    pub fn fixture(&self, testdata_dir: impl AsRef<Path>) -> Result<ProofFixture, FixtureError> {
        let fixture = self.source.load(testdata_dir)?;
        match &self.tamper {
            Some(tamper) => fixture.tamper(tamper),
            None => Ok(fixture),
        }
    }
}

/// Ordered table of test cases.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suite {
    #[serde(rename = "case", default)]
    pub cases: Vec<TestCase>,
}

impl Suite {
    pub fn new(cases: Vec<TestCase>) -> eyre::Result<Self> {
        let suite = Self { cases };
        suite.validate()?;
        Ok(suite)
    }

    /// Read a suite manifest, a TOML file with one `[[case]]` table per case.
    pub fn from_toml_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("failed to read suite {path:?}: {e}"))?;
        let suite: Self =
            toml::from_str(&text).map_err(|e| eyre::eyre!("invalid suite {path:?}: {e}"))?;
        suite.validate()?;
        Ok(suite)
    }

    /// Case names must be unique so reports can be looked up by name.
    fn validate(&self) -> eyre::Result<()> {
        let mut seen = HashSet::new();
        for case in &self.cases {
            eyre::ensure!(
                seen.insert(case.name.as_str()),
                "duplicate case name {:?}",
                case.name
            );
        }
        Ok(())
    }

    pub fn enabled(&self) -> impl Iterator<Item = &TestCase> {
        self.cases.iter().filter(|case| case.enabled)
    }
}

/// Reasons a case could not produce a verdict.
#[derive(thiserror::Error, Debug)]
pub enum CaseError {
    /// The fixture could not be loaded, no call was made.
    #[error(transparent)]
    Fixture(#[from] FixtureError),
    #[error("verify call reverted: output={output:#x}")]
    Reverted { output: Bytes },
    #[error("verify call halted: {reason}")]
    Halted { reason: String },
    #[error("verify returned undecodable data {output:#x}: {reason}")]
    InvalidReturn { output: Bytes, reason: String },
}

/// State of a case, `Pending` until the harness reaches it.
#[derive(Debug)]
pub enum CaseStatus {
    Pending,
    Skipped,
    /// The expected outcome was observed.
    Passed(VerifyOutcome),
    /// The contract returned the opposite verdict.
    Failed {
        expected: Expectation,
        outcome: VerifyOutcome,
    },
    Errored(CaseError),
}

impl CaseStatus {
    /// Judge the outcome of a `verify` call against the case's expectation.
    pub fn judge(expected: Expectation, outcome: VerifyOutcome) -> Self {
        match (expected, outcome) {
            (_, VerifyOutcome::Undecodable { output, reason, .. }) => {
                Self::Errored(CaseError::InvalidReturn { output, reason })
            }
            (Expectation::Accept, outcome @ VerifyOutcome::Returned { verified: true, .. })
            | (Expectation::Reject, outcome @ VerifyOutcome::Returned { verified: false, .. })
            | (
                Expectation::Reject,
                outcome @ (VerifyOutcome::Reverted { .. } | VerifyOutcome::Halted { .. }),
            ) => Self::Passed(outcome),
            (expected, outcome @ VerifyOutcome::Returned { .. }) => {
                Self::Failed { expected, outcome }
            }
            (Expectation::Accept, VerifyOutcome::Reverted { output, .. }) => {
                Self::Errored(CaseError::Reverted { output })
            }
            (Expectation::Accept, VerifyOutcome::Halted { reason, .. }) => {
                Self::Errored(CaseError::Halted { reason })
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn is_errored(&self) -> bool {
        matches!(self, Self::Errored(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Skipped => f.write_str("skipped"),
            Self::Passed(outcome) => write!(f, "passed ({outcome:?})"),
            Self::Failed { expected, outcome } => {
                write!(f, "failed: expected {expected:?}, got {outcome:?}")
            }
            Self::Errored(e) => write!(f, "errored: {e}"),
        }
    }
}

#[derive(Debug)]
pub struct CaseReport {
    pub name: String,
    pub status: CaseStatus,
}

/// Per-case results of a harness run.
#[derive(Debug)]
pub struct SuiteReport {
    pub cases: Vec<CaseReport>,
    /// Set when a deployment or environment failure stopped the run. Cases not reached are
    /// left pending.
    pub aborted: Option<Error>,
}

impl SuiteReport {
    /// A report with every enabled case pending and every disabled one skipped.
    pub fn new(suite: &Suite) -> Self {
        let cases = suite
            .cases
            .iter()
            .map(|case| CaseReport {
                name: case.name.clone(),
                status: if case.enabled {
                    CaseStatus::Pending
                } else {
                    CaseStatus::Skipped
                },
            })
            .collect();

        Self {
            cases,
            aborted: None,
        }
    }

    pub fn status(&self, name: &str) -> Option<&CaseStatus> {
        self.cases
            .iter()
            .find(|case| case.name == name)
            .map(|case| &case.status)
    }

    pub fn count(&self, predicate: impl Fn(&CaseStatus) -> bool) -> usize {
        self.cases.iter().filter(|case| predicate(&case.status)).count()
    }

    /// No abort, and every enabled case passed.
    pub fn is_success(&self) -> bool {
        self.aborted.is_none()
            && self
                .cases
                .iter()
                .all(|case| case.status.is_passed() || case.status.is_skipped())
    }

    /// Turn the report into an error listing everything that did not pass.
    pub fn ensure_success(&self) -> eyre::Result<()> {
        if self.is_success() {
            return Ok(());
        }

        let mut summary = String::new();
        if let Some(reason) = &self.aborted {
            summary.push_str(&format!("\n  suite aborted: {reason}"));
        }
        for case in &self.cases {
            if !(case.status.is_passed() || case.status.is_skipped()) {
                summary.push_str(&format!("\n  {}: {}", case.name, case.status));
            }
        }

        Err(eyre::eyre!(
            "{} passed, {} failed, {} errored, {} pending:{summary}",
            self.count(CaseStatus::is_passed),
            self.count(CaseStatus::is_failed),
            self.count(CaseStatus::is_errored),
            self.count(CaseStatus::is_pending),
        ))
    }
}
