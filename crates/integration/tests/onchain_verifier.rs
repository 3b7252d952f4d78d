use std::path::Path;

use alloy_primitives::{B256, address, b256};
use groth16_harness_integration::{
    CaseError, CaseStatus, DeploymentMode, FD_SUITE, Harness, HarnessConfig, Suite, TestCase,
    setup_logger,
    testers::{DIR_BONSAI_FIBONACCI, PATH_TESTDATA, mock},
};
use groth16_harness_types::{
    FixtureError, FixtureField, FixtureSource, ProofFixture, Tamper, TamperOp,
};
use groth16_harness_verifier::{
    Error, EvmEnv, VerifierContract, VerifyOutcome, deploy_and_verify,
};

const IMAGE_ID: B256 = b256!("0xbe1c1c8a02bb78a05e294ade5ed1bf37cd3cbd0751053204fc4274eaa76b497a");

const POST_STATE_DIGEST: B256 =
    b256!("0x1ead55c6871eafce7ac0174f0e214d1db787760017d591c3e90eaf82722232d3");

fn bonsai_fibonacci() -> eyre::Result<ProofFixture> {
    Ok(ProofFixture::from_dir(
        Path::new(PATH_TESTDATA).join(DIR_BONSAI_FIBONACCI),
    )?)
}

fn bonsai_case(name: &str) -> TestCase {
    TestCase::new(name, FixtureSource::Dir(DIR_BONSAI_FIBONACCI.into()))
}

#[test]
fn bonsai_fibonacci_fixture() -> eyre::Result<()> {
    let fixture = bonsai_fibonacci()?;

    assert_eq!(fixture.image_id, IMAGE_ID);
    assert_eq!(fixture.post_state_digest, POST_STATE_DIGEST);
    assert_eq!(fixture.seal.len(), 256);
    assert_eq!(fixture.journal_hash.len(), 72);

    Ok(())
}

#[test]
fn pinned_verifier_accepts_fixture() -> eyre::Result<()> {
    setup_logger()?;

    let fixture = bonsai_fibonacci()?;
    let outcome = deploy_and_verify(&mock::digest_pinned_verifier(&fixture)?, &fixture)?;
    assert_eq!(outcome.verified(), Some(true));

    Ok(())
}

#[test]
fn tampered_fixtures_never_verify() -> eyre::Result<()> {
    setup_logger()?;

    let fixture = bonsai_fibonacci()?;
    let mut harness = Harness::with_bytecode(
        HarnessConfig {
            deployment: DeploymentMode::Shared,
            ..Default::default()
        },
        mock::digest_pinned_verifier(&fixture)?,
    )?;

    for field in FixtureField::ALL {
        let len = fixture.field(field).len();
        for index in [0, len / 2, len - 1] {
            for op in [TamperOp::Increment, TamperOp::Flip] {
                let tamper = Tamper {
                    field,
                    index: Some(index),
                    op,
                };
                let outcome = harness.verify(&fixture.tamper(&tamper)?)?;
                assert_ne!(outcome.verified(), Some(true), "{tamper:?} verified");
            }
        }
    }

    // The untampered fixture still verifies against the same deployment.
    assert_eq!(harness.verify(&fixture)?.verified(), Some(true));

    Ok(())
}

#[test]
fn image_id_incremented_is_rejected() -> eyre::Result<()> {
    let fixture = bonsai_fibonacci()?;
    let tampered = fixture.tamper(&Tamper::last_byte(FixtureField::ImageId))?;
    assert_eq!(tampered.image_id.0[31], IMAGE_ID.0[31] + 1);

    let outcome = deploy_and_verify(&mock::digest_pinned_verifier(&fixture)?, &tampered)?;
    assert_ne!(outcome.verified(), Some(true));

    Ok(())
}

#[test]
fn redeployment_is_deterministic() -> eyre::Result<()> {
    let fixture = bonsai_fibonacci()?;
    let tampered = fixture.tamper(&Tamper::last_byte(FixtureField::JournalHash))?;
    let code = mock::digest_pinned_verifier(&fixture)?;

    let mut env = EvmEnv::default();
    let first = VerifierContract::deploy(&mut env, &code)?;
    let second = VerifierContract::deploy(&mut env, &code)?;
    assert_ne!(first.address, second.address);
    assert_eq!(first.codehash, second.codehash);

    for fixture in [&fixture, &tampered] {
        let a = first.verify(&mut env, fixture)?;
        let b = second.verify(&mut env, fixture)?;
        assert_eq!(a, b);
    }
    assert_eq!(first.verify(&mut env, &fixture)?.verified(), Some(true));
    assert_eq!(first.verify(&mut env, &tampered)?.verified(), Some(false));

    // The harness deploys a fresh instance for every call by default.
    let mut harness = Harness::with_bytecode(HarnessConfig::default(), code)?;
    let outcomes = [harness.verify(&fixture)?, harness.verify(&fixture)?];
    assert_eq!(outcomes[0], outcomes[1]);
    assert_eq!(harness.env().nonce(), 4);

    Ok(())
}

#[test]
fn suite_manifest_against_pinned_verifier() -> eyre::Result<()> {
    setup_logger()?;

    let suite = Suite::from_toml_file(Path::new(PATH_TESTDATA).join(FD_SUITE))?;
    let mut harness = Harness::with_bytecode(
        HarnessConfig::default(),
        mock::digest_pinned_verifier(&bonsai_fibonacci()?)?,
    )?;

    let report = harness.run(&suite);
    report.ensure_success()?;

    assert_eq!(report.count(CaseStatus::is_passed), 5);
    assert!(report.status("bonsai-governor").unwrap().is_skipped());
    assert!(report.status("simple-contract-state").unwrap().is_skipped());

    Ok(())
}

#[test]
fn missing_fixture_errors_before_any_call() -> eyre::Result<()> {
    let suite = Suite::new(vec![TestCase::new(
        "missing",
        FixtureSource::Dir("fixtures/does-not-exist".into()),
    )])?;
    let mut harness = Harness::with_bytecode(HarnessConfig::default(), mock::constant_verifier(true)?)?;

    let report = harness.run(&suite);

    assert!(matches!(
        report.status("missing"),
        Some(CaseStatus::Errored(CaseError::Fixture(FixtureError::NotFound { .. })))
    ));
    assert!(report.aborted.is_none());
    // Neither a deployment nor a call was submitted.
    assert_eq!(harness.env().nonce(), 0);

    Ok(())
}

#[test]
fn revert_is_reported_apart_from_false() -> eyre::Result<()> {
    let suite = Suite::new(vec![
        bonsai_case("accept-reverts"),
        bonsai_case("reject-reverts").tampered(Tamper::last_byte(FixtureField::Seal)),
    ])?;
    let mut harness = Harness::with_bytecode(HarnessConfig::default(), mock::reverting_verifier()?)?;

    let report = harness.run(&suite);

    assert!(matches!(
        report.status("accept-reverts"),
        Some(CaseStatus::Errored(CaseError::Reverted { .. }))
    ));
    assert!(report.status("reject-reverts").unwrap().is_passed());
    assert!(report.aborted.is_none());

    Ok(())
}

#[test]
fn mismatch_does_not_abort_siblings() -> eyre::Result<()> {
    let suite = Suite::new(vec![
        bonsai_case("wrong-verdict"),
        bonsai_case("expected-false").tampered(Tamper::last_byte(FixtureField::ImageId)),
    ])?;
    let mut harness = Harness::with_bytecode(HarnessConfig::default(), mock::constant_verifier(false)?)?;

    let report = harness.run(&suite);

    assert!(matches!(
        report.status("wrong-verdict"),
        Some(CaseStatus::Failed {
            outcome: VerifyOutcome::Returned { verified: false, .. },
            ..
        })
    ));
    assert!(report.status("expected-false").unwrap().is_passed());
    assert!(report.ensure_success().is_err());

    Ok(())
}

#[test]
fn failed_deployment_aborts_suite() -> eyre::Result<()> {
    let suite = Suite::new(vec![
        bonsai_case("first"),
        bonsai_case("second"),
        bonsai_case("parked").disabled(),
    ])?;
    let mut harness = Harness::with_bytecode(HarnessConfig::default(), mock::failing_constructor())?;

    let report = harness.run(&suite);

    assert!(matches!(report.aborted, Some(Error::Deployment(_))), "{:?}", report.aborted);
    assert!(report.status("first").unwrap().is_pending());
    assert!(report.status("second").unwrap().is_pending());
    assert!(report.status("parked").unwrap().is_skipped());

    let err = report.ensure_success().unwrap_err().to_string();
    assert!(err.contains("verifier deployment failed"), "{err}");

    Ok(())
}

#[test]
fn environment_failure_aborts_suite() -> eyre::Result<()> {
    let suite = Suite::new(vec![bonsai_case("first"), bonsai_case("second")])?;
    let config = HarnessConfig {
        gas_limit: 1_000,
        ..Default::default()
    };
    let mut harness = Harness::with_bytecode(config, mock::constant_verifier(true)?)?;

    let report = harness.run(&suite);

    assert!(matches!(report.aborted, Some(Error::Environment(_))), "{:?}", report.aborted);
    assert_eq!(report.count(CaseStatus::is_pending), 2);

    Ok(())
}

#[test]
fn predeployed_verifier() -> eyre::Result<()> {
    let fixture = bonsai_fibonacci()?;
    let address = address!("0x00000000000000000000000000000000000c0de5");
    let config = HarnessConfig {
        deployment: DeploymentMode::Predeployed(address),
        ..Default::default()
    };
    let mut harness = Harness::with_bytecode(config, mock::digest_pinned_verifier(&fixture)?)?;

    let verifier = harness.verifier()?;
    assert_eq!(verifier.address, address);
    assert_eq!(harness.verifier()?, verifier);

    assert_eq!(harness.verify(&fixture)?.verified(), Some(true));

    Ok(())
}

#[test]
fn exported_fixture_round_trips_through_suite() -> eyre::Result<()> {
    let fixture = bonsai_fibonacci()?;
    let dir = std::env::temp_dir().join(format!("groth16-harness-export-{}", std::process::id()));
    fixture.write_to_dir(dir.join("exported"))?;

    let suite = Suite::new(vec![
        TestCase::new("exported", FixtureSource::Dir("exported".into())),
        TestCase::new("inline", FixtureSource::Inline((&fixture).into())),
    ])?;
    let config = HarnessConfig {
        testdata_dir: dir.clone(),
        deployment: DeploymentMode::Shared,
        ..Default::default()
    };
    let mut harness = Harness::with_bytecode(config, mock::digest_pinned_verifier(&fixture)?)?;

    harness.run(&suite).ensure_success()?;

    std::fs::remove_dir_all(dir)?;
    Ok(())
}

/// Runs the checked-in suite against the real Groth16 verifier.
///
/// Requires the verifier's creation code, e.g.
/// `GROTH16_HARNESS_BYTECODE=/path/to/RiscZeroGroth16Verifier.json`.
#[ignore = "need verifier bytecode"]
#[test]
fn onchain_verify_suite() -> eyre::Result<()> {
    setup_logger()?;

    let config = HarnessConfig::from_env()?;
    let suite = Suite::from_toml_file(config.testdata_dir.join(FD_SUITE))?;
    let mut harness = Harness::setup(config)?;

    harness.run(&suite).ensure_success()
}
