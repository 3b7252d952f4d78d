use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy_primitives::Address;
use groth16_harness_verifier::evm::{DEFAULT_CALLER, DEFAULT_GAS_LIMIT};
use serde::{Deserialize, Serialize};

use crate::{ENV_BYTECODE, ENV_CONFIG, ENV_DEPLOYMENT, ENV_TESTDATA, testers::PATH_TESTDATA};

/// How the harness obtains the verifier contract it calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentMode {
    /// A fresh deployment for every case.
    #[default]
    PerCase,
    /// One deployment reused by every case of a suite.
    Shared,
    /// A verifier already living at a known address.
    Predeployed(Address),
}

impl FromStr for DeploymentMode {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "per-case" => Ok(Self::PerCase),
            "shared" => Ok(Self::Shared),
            other => other.parse().map(Self::Predeployed).map_err(|e| {
                eyre::eyre!(
                    "invalid deployment mode {other:?}: expected per-case, shared or an address ({e})"
                )
            }),
        }
    }
}

/// Configure the [`Harness`][crate::Harness].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Root directory against which fixture directories are resolved.
    pub testdata_dir: PathBuf,
    /// The verifier's creation code. Relative paths are resolved against `testdata_dir`.
    pub verifier_bytecode: Option<PathBuf>,
    pub deployment: DeploymentMode,
    /// Account signing the deployment and call transactions.
    pub caller: Address,
    /// Gas limit of every transaction.
    pub gas_limit: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            testdata_dir: PATH_TESTDATA.into(),
            verifier_bytecode: None,
            deployment: DeploymentMode::default(),
            caller: DEFAULT_CALLER,
            gas_limit: DEFAULT_GAS_LIMIT,
        }
    }
}

impl HarnessConfig {
    /// Read the config from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("failed to read harness config {path:?}: {e}"))?;
        toml::from_str(&text).map_err(|e| eyre::eyre!("invalid harness config {path:?}: {e}"))
    }

    /// Build the config from the process environment.
    ///
    /// Starts from the file at [`ENV_CONFIG`] if set, the defaults otherwise, then applies the
    /// individual overrides.
    pub fn from_env() -> eyre::Result<Self> {
        let mut config = match std::env::var(ENV_CONFIG) {
            Ok(path) => Self::from_toml_file(path)?,
            Err(_) => Self::default(),
        };

        if let Ok(dir) = std::env::var(ENV_TESTDATA) {
            config.testdata_dir = dir.into();
        }
        if let Ok(path) = std::env::var(ENV_BYTECODE) {
            config.verifier_bytecode = Some(path.into());
        }
        if let Ok(mode) = std::env::var(ENV_DEPLOYMENT) {
            config.deployment = mode.parse()?;
        }

        Ok(config)
    }

    /// Location of the verifier bytecode, if configured.
    pub fn verifier_bytecode_path(&self) -> Option<PathBuf> {
        self.verifier_bytecode
            .as_ref()
            .map(|path| self.testdata_dir.join(path))
    }
}
