//! Shared JSON fixtures for rigpose tests and benches.
//!
//! Everything is resolved through `fixtures/manifest.json` at the workspace root.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    skeletons: HashMap<String, String>,
    frames: HashMap<String, FrameSetEntry>,
    #[serde(default)]
    configs: HashMap<String, String>,
}

/// A frame stream together with the skeleton it was recorded against.
#[derive(Debug, Deserialize)]
struct FrameSetEntry {
    path: String,
    skeleton: String,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

pub mod skeletons {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.skeletons.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.skeletons, "skeleton", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.skeletons, "skeleton", name)?;
        super::load_json(rel)
    }
}

pub mod frames {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.frames.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.frames, "frame set", name)?;
        read_to_string(&entry.path)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = lookup(&MANIFEST.frames, "frame set", name)?;
        super::load_json(&entry.path)
    }

    /// Name of the skeleton fixture the frame set belongs to.
    pub fn skeleton(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.frames, "frame set", name)?;
        Ok(entry.skeleton.clone())
    }
}

pub mod configs {
    use super::*;

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.configs, "config", name)?;
        read_to_string(rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_manifest_entry_resolves() {
        for name in skeletons::keys() {
            assert!(skeletons::json(&name).is_ok(), "skeleton {name}");
        }
        for name in frames::keys() {
            assert!(frames::json(&name).is_ok(), "frames {name}");
            let skeleton = frames::skeleton(&name).unwrap();
            assert!(skeletons::keys().contains(&skeleton));
        }
        assert!(skeletons::json("missing").is_err());
    }
}
