//! Circuit artifacts and where to find them.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ProverError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CircuitKind {
    Registration,
    Transfer,
}

impl CircuitKind {
    pub fn name(&self) -> &'static str {
        match self {
            CircuitKind::Registration => "registration",
            CircuitKind::Transfer => "transfer",
        }
    }

    pub fn wasm_file(&self) -> String { format!("{}.wasm", self.name()) }

    pub fn zkey_file(&self) -> String { format!("{}.zkey", self.name()) }

    pub fn vkey_file(&self) -> String { format!("{}.vkey.json", self.name()) }

    /// Public circuit inputs in public-signal order. Each entry is flattened
    /// (points to `x, y`, PCTs to four words) when forming the signal vector.
    pub fn public_inputs(&self) -> &'static [&'static str] {
        match self {
            CircuitKind::Registration => &["SenderPublicKey", "SenderAddress", "ChainID", "RegistrationHash"],
            CircuitKind::Transfer => &[
                "SenderPublicKey",
                "SenderBalanceC1",
                "SenderBalanceC2",
                "SenderVTTC1",
                "SenderVTTC2",
                "ReceiverPublicKey",
                "ReceiverVTTC1",
                "ReceiverVTTC2",
                "ReceiverPCT",
                "ReceiverPCTAuthKey",
                "ReceiverPCTNonce",
                "AuditorPublicKey",
                "AuditorPCT",
                "AuditorPCTAuthKey",
                "AuditorPCTNonce",
            ],
        }
    }

    pub fn public_signal_count(&self) -> usize {
        match self {
            CircuitKind::Registration => 5,
            CircuitKind::Transfer => 32,
        }
    }
}

impl std::fmt::Display for CircuitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.name()) }
}

/// Resolved artifact locations for one circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitHandle {
    pub kind: CircuitKind,
    pub wasm: String,
    pub zkey: String,
    pub vkey: String,
}

/// Where circuit artifacts are fetched from.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Location string (path or URL) the toolkit is given for `file_name`.
    fn locate(&self, file_name: &str) -> String;

    async fn exists(&self, location: &str) -> Result<bool>;

    async fn read_to_string(&self, location: &str) -> Result<String>;
}

/// Artifacts in a local directory.
#[derive(Debug, Clone)]
pub struct FsArtifacts {
    root: PathBuf,
}

impl FsArtifacts {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }
}

#[async_trait]
impl ArtifactSource for FsArtifacts {
    fn locate(&self, file_name: &str) -> String { self.root.join(file_name).to_string_lossy().into_owned() }

    async fn exists(&self, location: &str) -> Result<bool> {
        Ok(tokio::fs::try_exists(location).await.with_context(|| format!("stat {location}"))?)
    }

    async fn read_to_string(&self, location: &str) -> Result<String> {
        tokio::fs::read_to_string(location).await.with_context(|| format!("read {location}"))
    }
}

/// Artifacts served over HTTP; existence is a `HEAD` request.
#[derive(Debug, Clone)]
pub struct HttpArtifacts {
    base_url: String,
    client: reqwest::Client,
}

impl HttpArtifacts {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into().trim_end_matches('/').to_string(), client: reqwest::Client::new() }
    }
}

#[async_trait]
impl ArtifactSource for HttpArtifacts {
    fn locate(&self, file_name: &str) -> String { format!("{}/{}", self.base_url, file_name) }

    async fn exists(&self, location: &str) -> Result<bool> {
        let resp = self.client.head(location).send().await.with_context(|| format!("HEAD {location}"))?;
        Ok(resp.status().is_success())
    }

    async fn read_to_string(&self, location: &str) -> Result<String> {
        let resp = self.client.get(location).send().await.with_context(|| format!("GET {location}"))?;
        let resp = resp.error_for_status().with_context(|| format!("GET {location}"))?;
        Ok(resp.text().await?)
    }
}

/// In-process artifacts, keyed by file name.
#[derive(Debug, Default)]
pub struct MemoryArtifacts {
    files: Mutex<HashMap<String, String>>,
}

impl MemoryArtifacts {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&self, file_name: impl Into<String>, contents: impl Into<String>) {
        self.files.lock().insert(file_name.into(), contents.into());
    }

    pub fn remove(&self, file_name: &str) { self.files.lock().remove(file_name); }

    fn key<'a>(&self, location: &'a str) -> &'a str { location.strip_prefix("mem://").unwrap_or(location) }
}

#[async_trait]
impl ArtifactSource for MemoryArtifacts {
    fn locate(&self, file_name: &str) -> String { format!("mem://{file_name}") }

    async fn exists(&self, location: &str) -> Result<bool> { Ok(self.files.lock().contains_key(self.key(location))) }

    async fn read_to_string(&self, location: &str) -> Result<String> {
        self.files
            .lock()
            .get(self.key(location))
            .cloned()
            .with_context(|| format!("no artifact at {location}"))
    }
}

/// Caches one handle per circuit once both binaries are confirmed present.
pub struct CircuitRegistry {
    source: Arc<dyn ArtifactSource>,
    handles: Mutex<HashMap<CircuitKind, CircuitHandle>>,
}

impl CircuitRegistry {
    pub fn new(source: Arc<dyn ArtifactSource>) -> Self { Self { source, handles: Mutex::new(HashMap::new()) } }

    pub fn source(&self) -> &Arc<dyn ArtifactSource> { &self.source }

    pub fn cached(&self, kind: CircuitKind) -> Option<CircuitHandle> { self.handles.lock().get(&kind).cloned() }

    pub async fn load(&self, kind: CircuitKind) -> Result<CircuitHandle, ProverError> {
        if let Some(handle) = self.cached(kind) {
            return Ok(handle);
        }
        let wasm = self.source.locate(&kind.wasm_file());
        let zkey = self.source.locate(&kind.zkey_file());
        for artifact in [&wasm, &zkey] {
            let present = match self.source.exists(artifact).await {
                Ok(present) => present,
                Err(e) => {
                    warn!(circuit = kind.name(), artifact = %artifact, error = %e, "artifact check failed");
                    false
                }
            };
            if !present {
                return Err(ProverError::CircuitArtifactMissing {
                    circuit: kind.name().to_string(),
                    artifact: artifact.clone(),
                });
            }
        }
        let handle = CircuitHandle { kind, wasm, zkey, vkey: self.source.locate(&kind.vkey_file()) };
        debug!(circuit = kind.name(), "circuit loaded");
        self.handles.lock().insert(kind, handle.clone());
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_with(files: &[&str]) -> Arc<MemoryArtifacts> {
        let m = Arc::new(MemoryArtifacts::new());
        for f in files {
            m.insert(*f, "bin");
        }
        m
    }

    #[tokio::test]
    async fn loads_and_caches_handle() {
        let mem = memory_with(&["transfer.wasm", "transfer.zkey"]);
        let reg = CircuitRegistry::new(mem.clone());
        let h = reg.load(CircuitKind::Transfer).await.unwrap();
        assert_eq!(h.wasm, "mem://transfer.wasm");
        assert_eq!(h.vkey, "mem://transfer.vkey.json");
        mem.remove("transfer.wasm");
        assert_eq!(reg.load(CircuitKind::Transfer).await.unwrap(), h);
    }

    #[tokio::test]
    async fn missing_zkey_is_reported() {
        let reg = CircuitRegistry::new(memory_with(&["registration.wasm"]));
        let err = reg.load(CircuitKind::Registration).await.unwrap_err();
        assert_eq!(
            err,
            ProverError::CircuitArtifactMissing {
                circuit: "registration".into(),
                artifact: "mem://registration.zkey".into()
            }
        );
        assert!(reg.cached(CircuitKind::Registration).is_none());
    }

    #[tokio::test]
    async fn filesystem_source_checks_paths() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("registration.wasm"), b"\0asm").await.unwrap();
        let fs = FsArtifacts::new(dir.path());
        assert!(fs.exists(&fs.locate("registration.wasm")).await.unwrap());
        assert!(!fs.exists(&fs.locate("registration.zkey")).await.unwrap());
    }

    #[test]
    fn http_locations_join_cleanly() {
        let http = HttpArtifacts::new("https://cdn.example.org/circuits/");
        assert_eq!(http.locate("transfer.zkey"), "https://cdn.example.org/circuits/transfer.zkey");
    }

    #[test]
    fn signal_counts_match_public_input_widths() {
        assert_eq!(CircuitKind::Transfer.public_inputs().len(), 15);
        assert_eq!(CircuitKind::Registration.public_inputs().len(), 4);
    }
}
