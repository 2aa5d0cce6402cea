//! Shared test helpers for integration tests

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sanity_lab::codec::WIRE_VERSION;
use sanity_lab::entities::{Distribution, LabSession, Variable};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// The beam example: 10 / d with d ~ U(1, 2)
pub const BEAM_SESSION: &str = r#"title: Beam check
formula: L / d
sample_count: 1000
seed: 42
variables:
  - name: L
    mode: fixed
    fixed_value: 10
  - name: d
    mode: distribution
    distribution:
      kind: uniform
      min: 1
      max: 2
tolerance_band:
  lower: 6
  upper: 8
"#;

/// Helper to get a sanity-lab command isolated from the user's config
pub fn sanity_lab() -> Command {
    let isolated = std::env::temp_dir().join("sanity-lab-tests-no-home");
    let mut cmd = Command::new(cargo::cargo_bin!("sanity-lab"));
    cmd.env_remove("SANITY_LAB_CONFIG")
        .env_remove("SANITY_LAB_LOG")
        .env("HOME", &isolated)
        .env("XDG_CONFIG_HOME", isolated.join("config"));
    cmd
}

/// Write `content` to `name` inside `tmp`
pub fn write_file(tmp: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = tmp.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Write the beam example session into `tmp`
pub fn write_beam_session(tmp: &TempDir) -> PathBuf {
    write_file(tmp, "beam.yaml", BEAM_SESSION)
}

/// Library-level beam session matching `BEAM_SESSION`
pub fn beam_session() -> LabSession {
    LabSession::new("L / d", 1000)
        .with_title("Beam check")
        .with_seed(42)
        .with_variable(Variable::fixed("L", 10.0))
        .with_variable(Variable::distributed(
            "d",
            Distribution::Uniform { min: 1.0, max: 2.0 },
        ))
        .with_tolerance_band(6.0, 8.0)
}

/// Wrap arbitrary bytes in a well-formed share frame (version, checksum,
/// zstd body) so decoding gets past the framing checks
pub fn frame_payload(json: &[u8]) -> String {
    let body = zstd::encode_all(json, 3).unwrap();
    let mut hasher = Sha256::new();
    hasher.update([WIRE_VERSION]);
    hasher.update(&body);
    let digest = hasher.finalize();

    let mut frame = vec![WIRE_VERSION];
    frame.extend_from_slice(&digest[..8]);
    frame.extend_from_slice(&body);
    URL_SAFE_NO_PAD.encode(frame)
}
