use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

pub mod config;
pub use config::{DeploymentMode, HarnessConfig};

mod runner;
pub use runner::Harness;

pub mod suite;
pub use suite::{CaseError, CaseReport, CaseStatus, Expectation, Suite, SuiteReport, TestCase};

pub mod testers;

/// Environment variable pointing at a TOML [`HarnessConfig`].
pub const ENV_CONFIG: &str = "GROTH16_HARNESS_CONFIG";

/// Environment variable overriding [`HarnessConfig::testdata_dir`].
pub const ENV_TESTDATA: &str = "GROTH16_HARNESS_TESTDATA";

/// Environment variable overriding [`HarnessConfig::verifier_bytecode`].
pub const ENV_BYTECODE: &str = "GROTH16_HARNESS_BYTECODE";

/// Environment variable overriding [`HarnessConfig::deployment`].
pub const ENV_DEPLOYMENT: &str = "GROTH16_HARNESS_DEPLOYMENT";

/// File descriptor of the suite manifest inside the testdata directory.
pub const FD_SUITE: &str = "suite.toml";

static LOGGER: OnceCell<()> = OnceCell::new();

/// Install the tracing subscriber. Safe to call from every test.
pub fn setup_logger() -> eyre::Result<()> {
    LOGGER.get_or_try_init(|| {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_test_writer()
            .with_span_events(FmtSpan::CLOSE);

        #[cfg(feature = "limit-logs")]
        let filter = tracing_subscriber::filter::Targets::new()
            .with_target("groth16_harness_verifier", tracing::Level::INFO)
            .with_target("groth16_harness_integration", tracing::Level::DEBUG);

        #[cfg(not(feature = "limit-logs"))]
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(fmt_layer)
            .with(filter)
            .try_init()
    })?;

    Ok(())
}
