//! Library scenario tests - engine, background panel and codec together

mod common;

use common::{beam_session, BEAM_SESSION};
use sanity_lab::codec::{decode, encode, share_link, SessionCodec};
use sanity_lab::core::{LabConfig, Limits};
use sanity_lab::engine::{simulate, SimulationOptions, SimulationPanel};
use sanity_lab::entities::{Distribution, LabSession, Variable};
use sanity_lab::yaml::parse_yaml;
use sanity_lab::{ConfigurationError, FormulaError, LabError};
use std::time::Duration;

// ============================================================================
// Engine Scenarios
// ============================================================================

#[test]
fn test_beam_scenario() {
    let mut session = beam_session();
    let result = session
        .run(&SimulationOptions::default().retaining_samples())
        .unwrap();

    assert!((result.mean - 6.93).abs() < 0.25, "mean {}", result.mean);
    assert!((result.p50 - 10.0 / 1.5).abs() < 0.3, "p50 {}", result.p50);
    let samples = result.samples.as_ref().unwrap();
    assert_eq!(samples.len(), 1000);
    assert!(samples.iter().all(|&x| x > 5.0 && x <= 10.0));
}

#[test]
fn test_sample_count_out_of_range() {
    for count in [0, 10_000_001] {
        let mut session = beam_session();
        session.sample_count = count;
        let err = session.run(&SimulationOptions::default()).unwrap_err();
        assert!(
            matches!(
                err,
                LabError::Configuration(ConfigurationError::SampleCountOutOfRange { .. })
            ),
            "count {count}: {err:?}"
        );
        assert!(!session.has_results());
    }
}

#[test]
fn test_undeclared_variable_named() {
    let mut session = beam_session();
    session.formula = "L / d + unknown".to_string();
    let err = session.run(&SimulationOptions::default()).unwrap_err();
    assert_eq!(
        err.as_formula().and_then(FormulaError::undeclared_name),
        Some("unknown")
    );
}

#[test]
fn test_failed_run_clears_previous_results() {
    let mut session = beam_session();
    session.run(&SimulationOptions::default()).unwrap();
    assert!(session.has_results());

    session.formula = "L / (d - d)".to_string();
    assert!(session.run(&SimulationOptions::default()).is_err());
    assert!(!session.has_results());
}

#[test]
fn test_invalid_distribution_rejected() {
    let session = LabSession::new("x", 10).with_variable(Variable::distributed(
        "x",
        Distribution::Normal {
            mean: 0.0,
            stddev: -1.0,
        },
    ));
    let err = simulate(&session.request(), &SimulationOptions::default()).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_unseeded_runs_differ() {
    let mut session = beam_session();
    session.seed = None;
    let a = simulate(&session.request(), &SimulationOptions::default()).unwrap();
    let b = simulate(&session.request(), &SimulationOptions::default()).unwrap();
    assert_ne!(a.mean, b.mean);
}

#[test]
fn test_background_panel_matches_direct_run() {
    let session = beam_session();
    let options = session.options_for(&SimulationOptions::default());

    let mut panel = SimulationPanel::new().unwrap();
    panel.submit(session.request(), options.clone()).unwrap();
    let background = panel
        .wait_latest(Duration::from_secs(30))
        .unwrap()
        .unwrap();

    let direct = simulate(&session.request(), &options).unwrap();
    assert_eq!(background, direct);
}

// ============================================================================
// Codec Scenarios
// ============================================================================

#[test]
fn test_decode_rejects_invalid_input() {
    assert!(decode("").is_none());
    assert!(decode("not-a-valid-payload").is_none());

    let mut payload = encode(&beam_session());
    let last = payload.pop().unwrap();
    payload.push(if last == 'x' { 'y' } else { 'x' });
    assert!(decode(&payload).is_none());
}

#[test]
fn test_yaml_file_to_share_link_and_back() {
    let session: LabSession = parse_yaml(BEAM_SESSION, "beam.yaml").unwrap();
    assert_eq!(session, beam_session());

    let link = share_link("https://lab.example/", &encode(&session));
    assert_eq!(decode(&link), Some(session));
}

#[test]
fn test_codec_from_config_uses_limits() {
    let config = LabConfig {
        max_sample_count: 100,
        default_sample_count: 10,
        ..LabConfig::default()
    };
    assert_eq!(
        config.limits(),
        Limits {
            max_sample_count: 100,
            ..Limits::default()
        }
    );

    let payload = encode(&beam_session());
    assert!(SessionCodec::from_config(&config).decode(&payload).is_none());
    assert!(SessionCodec::default().decode(&payload).is_some());
}
