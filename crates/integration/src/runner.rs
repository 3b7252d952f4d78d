use alloy_primitives::Bytes;
use groth16_harness_types::ProofFixture;
use groth16_harness_verifier::{Error, EvmEnv, VerifierContract, VerifyOutcome, load_bytecode};
use tracing::instrument;

use crate::{CaseStatus, DeploymentMode, ENV_BYTECODE, HarnessConfig, Suite, SuiteReport, TestCase};

/// Drives a verifier contract through a [`Suite`].
pub struct Harness {
    config: HarnessConfig,
    env: EvmEnv,
    /// Creation code of the verifier.
    bytecode: Bytes,
    /// Verifier reused across cases, for [`DeploymentMode::Shared`] and
    /// [`DeploymentMode::Predeployed`].
    shared: Option<VerifierContract>,
}

impl Harness {
    /// Setup the harness with the verifier bytecode located by the config.
    #[instrument("Harness::setup", skip_all)]
    pub fn setup(config: HarnessConfig) -> eyre::Result<Self> {
        let path = config.verifier_bytecode_path().ok_or_else(|| {
            eyre::eyre!("no verifier bytecode configured, set verifier_bytecode or {ENV_BYTECODE}")
        })?;
        let bytecode = load_bytecode(path)?;
        Ok(Self::with_bytecode(config, bytecode)?)
    }

    /// Setup the harness with the verifier's creation code at hand.
    ///
    /// With [`DeploymentMode::Predeployed`], the verifier is installed at its address unless the
    /// environment already has code there.
    pub fn with_bytecode(config: HarnessConfig, bytecode: impl Into<Bytes>) -> Result<Self, Error> {
        let env = EvmEnv::new(config.caller, config.gas_limit);
        Self::with_env(config, env, bytecode)
    }

    /// Setup the harness over an existing environment.
    pub fn with_env(
        config: HarnessConfig,
        mut env: EvmEnv,
        bytecode: impl Into<Bytes>,
    ) -> Result<Self, Error> {
        let bytecode = bytecode.into();

        if let DeploymentMode::Predeployed(address) = config.deployment {
            if env.code_at(address).is_none() {
                let deployment = env.deploy(&bytecode)?;
                env.set_code(address, deployment.code);
                tracing::info!(%address, "installed verifier at pre-deployed address");
            }
        }

        Ok(Self {
            config,
            env,
            bytecode,
            shared: None,
        })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn env(&self) -> &EvmEnv {
        &self.env
    }

    /// The verifier the next case will call: the shared one, or a fresh deployment.
    pub fn verifier(&mut self) -> Result<VerifierContract, Error> {
        if let Some(verifier) = self.shared {
            return Ok(verifier);
        }

        let verifier = match self.config.deployment {
            DeploymentMode::PerCase | DeploymentMode::Shared => {
                VerifierContract::deploy(&mut self.env, &self.bytecode)?
            }
            DeploymentMode::Predeployed(address) => VerifierContract::at(&self.env, address)?,
        };
        tracing::debug!(address = %verifier.address, codehash = %verifier.codehash, "verifier ready");

        if self.config.deployment != DeploymentMode::PerCase {
            self.shared = Some(verifier);
        }

        Ok(verifier)
    }

    /// Call `verify` once with the given fixture.
    pub fn verify(&mut self, fixture: &ProofFixture) -> Result<VerifyOutcome, Error> {
        let verifier = self.verifier()?;
        verifier.verify(&mut self.env, fixture)
    }

    /// Run every enabled case of the suite in order.
    ///
    /// A deployment or environment failure stops the run: the error is recorded in
    /// [`SuiteReport::aborted`] and the remaining cases stay pending. Reverts and wrong verdicts
    /// only affect their own case.
    #[instrument("Harness::run", skip_all, fields(cases = suite.cases.len()))]
    pub fn run(&mut self, suite: &Suite) -> SuiteReport {
        let mut report = SuiteReport::new(suite);

        for (case, case_report) in suite.cases.iter().zip(report.cases.iter_mut()) {
            if !case.enabled {
                tracing::info!(case = %case.name, "skipped");
                continue;
            }

            match self.run_case(case) {
                Ok(status) => {
                    tracing::info!(case = %case.name, %status);
                    case_report.status = status;
                }
                Err(e) => {
                    tracing::error!(case = %case.name, "aborting suite: {e}");
                    report.aborted = Some(e);
                    break;
                }
            }
        }

        report
    }

    #[instrument("Harness::run_case", skip_all, fields(case = %case.name))]
    fn run_case(&mut self, case: &TestCase) -> Result<CaseStatus, Error> {
        let fixture = match case.fixture(&self.config.testdata_dir) {
            Ok(fixture) => fixture,
            Err(e) => {
                tracing::error!("failed to load fixture: {e}");
                return Ok(CaseStatus::Errored(e.into()));
            }
        };

        let outcome = self.verify(&fixture)?;

        Ok(CaseStatus::judge(case.expect, outcome))
    }
}
