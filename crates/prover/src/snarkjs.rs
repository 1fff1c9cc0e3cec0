//! [`ProvingToolkit`] backed by the `snarkjs` command-line tool.
//!
//! Each call works in a fresh temporary directory holding the JSON files the
//! CLI reads and writes.

use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::process::Command;
use tracing::debug;

use crate::circuit::CircuitHandle;
use crate::toolkit::{Groth16Proof, ProvingToolkit};

#[derive(Debug, Clone)]
pub struct SnarkjsCli {
    bin: PathBuf,
}

impl Default for SnarkjsCli {
    fn default() -> Self { Self::new("snarkjs") }
}

impl SnarkjsCli {
    pub fn new(bin: impl Into<PathBuf>) -> Self { Self { bin: bin.into() } }

    async fn output(&self, args: &[&str]) -> Result<Output> {
        debug!(bin = %self.bin.display(), ?args, "running snarkjs");
        Command::new(&self.bin).args(args).output().await.with_context(|| format!("spawn {}", self.bin.display()))
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        let output = self.output(args).await?;
        if !output.status.success() {
            bail!(
                "snarkjs {} exited with {}: {}",
                args.first().copied().unwrap_or_default(),
                output.status,
                failure_text(&output)
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Both streams; snarkjs prints some failures to stdout only.
fn failure_text(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    [stdout.trim(), stderr.trim()].into_iter().filter(|s| !s.is_empty()).collect::<Vec<_>>().join("\n")
}

/// `groth16 verify` prints `OK` on success and `Invalid proof` otherwise,
/// exiting non-zero in the latter case.
fn verify_outcome(output: &Output) -> Result<bool> {
    let stdout = String::from_utf8_lossy(&output.stdout);
    if output.status.success() {
        return Ok(stdout.contains("OK"));
    }
    let text = failure_text(output);
    if text.contains("Invalid proof") {
        return Ok(false);
    }
    bail!("snarkjs verify exited with {}: {}", output.status, text)
}

async fn write_json<T: Serialize + ?Sized>(dir: &Path, name: &str, value: &T) -> Result<String> {
    let path = dir.join(name);
    tokio::fs::write(&path, serde_json::to_vec(value)?).await.with_context(|| format!("write {}", path.display()))?;
    Ok(path.to_string_lossy().into_owned())
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T> {
    let bytes = tokio::fs::read(path).await.with_context(|| format!("read {path}"))?;
    Ok(serde_json::from_slice(&bytes).with_context(|| format!("parse {path}"))?)
}

#[async_trait]
impl ProvingToolkit for SnarkjsCli {
    async fn full_prove(&self, inputs: &Value, circuit: &CircuitHandle) -> Result<(Groth16Proof, Vec<String>)> {
        let dir = tempfile::tempdir()?;
        let input = write_json(dir.path(), "input.json", inputs).await?;
        let proof_path = dir.path().join("proof.json").to_string_lossy().into_owned();
        let public_path = dir.path().join("public.json").to_string_lossy().into_owned();
        self.run(&["groth16", "fullprove", &input, &circuit.wasm, &circuit.zkey, &proof_path, &public_path])
            .await?;
        let proof: Groth16Proof = read_json(&proof_path).await?;
        let signals: Vec<String> = read_json(&public_path).await?;
        Ok((proof, signals))
    }

    async fn export_calldata(&self, proof: &Groth16Proof, public_signals: &[String]) -> Result<String> {
        let dir = tempfile::tempdir()?;
        let public = write_json(dir.path(), "public.json", public_signals).await?;
        let proof = write_json(dir.path(), "proof.json", proof).await?;
        let text = self.run(&["zkey", "export", "soliditycalldata", &public, &proof]).await?;
        Ok(text.trim().to_string())
    }

    async fn verify(&self, vkey: &Value, public_signals: &[String], proof: &Groth16Proof) -> Result<bool> {
        let dir = tempfile::tempdir()?;
        let vk = write_json(dir.path(), "vkey.json", vkey).await?;
        let public = write_json(dir.path(), "public.json", public_signals).await?;
        let proof = write_json(dir.path(), "proof.json", proof).await?;
        let output = self.output(&["groth16", "verify", &vk, &public, &proof]).await?;
        verify_outcome(&output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::CircuitKind;

    #[tokio::test]
    async fn missing_binary_is_an_error() {
        let cli = SnarkjsCli::new("/nonexistent/snarkjs-binary");
        let kind = CircuitKind::Registration;
        let handle = CircuitHandle { kind, wasm: kind.wasm_file(), zkey: kind.zkey_file(), vkey: kind.vkey_file() };
        let err = cli.full_prove(&serde_json::json!({}), &handle).await.unwrap_err();
        assert!(format!("{err:#}").contains("spawn"));
    }

    #[cfg(unix)]
    fn fake_cli(dir: &Path, body: &str) -> SnarkjsCli {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("snarkjs");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        SnarkjsCli::new(path)
    }

    fn dummy_proof() -> Groth16Proof {
        let s = || "1".to_string();
        Groth16Proof {
            pi_a: [s(), s(), s()],
            pi_b: [[s(), s()], [s(), s()], [s(), s()]],
            pi_c: [s(), s(), s()],
            protocol: "groth16".into(),
            curve: "bn128".into(),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn invalid_proof_on_stdout_is_a_rejection() {
        let dir = tempfile::tempdir().unwrap();
        let cli = fake_cli(dir.path(), "echo '[ERROR] snarkJS: Invalid proof'\nexit 1");
        let ok = cli.verify(&serde_json::json!({}), &["1".into()], &dummy_proof()).await.unwrap();
        assert!(!ok);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn verify_accepts_ok_output() {
        let dir = tempfile::tempdir().unwrap();
        let cli = fake_cli(dir.path(), "echo '[INFO]  snarkJS: OK!'");
        assert!(cli.verify(&serde_json::json!({}), &["1".into()], &dummy_proof()).await.unwrap());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn other_failures_report_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let cli = fake_cli(dir.path(), "echo 'vkey.json: unexpected token'\nexit 2");
        let err = cli.verify(&serde_json::json!({}), &["1".into()], &dummy_proof()).await.unwrap_err();
        assert!(format!("{err:#}").contains("unexpected token"));
    }
}
