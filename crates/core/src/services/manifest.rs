use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::{PackcoreError, Result};
use crate::layout::{base_name, StagingLayout};
use crate::tools::ResolveStrategy;

/// Name and SHA-256 of a shallow-copied artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactDigest {
    pub name: String,
    pub sha256: String,
}

/// `manifest.json`: what was collected, when, and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleManifest {
    pub packcore_version: String,
    pub collected_at: String,
    pub core: ArtifactDigest,
    pub binary: ArtifactDigest,
    /// `gdb` or `ldd`.
    pub strategy: String,
    pub libraries: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_libraries: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernel_release: Option<String>,
}

impl BundleManifest {
    /// Build a manifest, hashing the original core and binary.
    pub fn build(
        core: &Path,
        binary: &Path,
        strategy: ResolveStrategy,
        libraries: &[PathBuf],
        missing: &[String],
        kernel_release: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            packcore_version: crate::version().to_string(),
            collected_at: Utc::now().to_rfc3339(),
            core: ArtifactDigest { name: base_name(core), sha256: sha256_file(core)? },
            binary: ArtifactDigest { name: base_name(binary), sha256: sha256_file(binary)? },
            strategy: strategy.as_str().to_string(),
            libraries: libraries.iter().map(|lib| lib.display().to_string()).collect(),
            missing_libraries: missing.to_vec(),
            kernel_release,
        })
    }

    pub fn write(&self, layout: &StagingLayout) -> Result<PathBuf> {
        let path = layout.manifest_path();
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            PackcoreError::io("Failed serializing manifest", &path, std::io::Error::other(e))
        })?;
        fs::write(&path, json).map_err(|e| PackcoreError::io("Failed writing manifest", &path, e))?;
        Ok(path)
    }
}

/// Compute the SHA-256 hash of a file and return it as a hex string.
pub fn sha256_file(path: &Path) -> Result<String> {
    let file = fs::File::open(path)
        .map_err(|e| PackcoreError::io("Failed to open file for hashing", path, e))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];

    loop {
        let n = reader
            .read(&mut buf)
            .map_err(|e| PackcoreError::io("Failed to read file for hashing", path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    let digest = hasher.finalize();
    Ok(format!("{:x}", digest))
}
