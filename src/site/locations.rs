//! Location profile registry
//!
//! Loads `LocationProfile` YAML records from the configured directory at
//! startup. Each record drives one service-area page through the shared
//! area template, replacing per-city page source files.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

use crate::models::LocationProfile;

/// In-memory registry of service-area profiles, keyed by slug
#[derive(Debug, Default)]
pub struct LocationRegistry {
    profiles: HashMap<String, LocationProfile>,
}

impl LocationRegistry {
    /// Load every `*.yml` / `*.yaml` file in `dir`.
    ///
    /// A missing directory yields an empty registry with a warning rather
    /// than a startup failure; a present-but-invalid profile file is an
    /// error, because it means a real area page would silently vanish.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut profiles = HashMap::new();

        if !dir.exists() {
            tracing::warn!("Locations directory {:?} does not exist; no area pages", dir);
            return Ok(Self { profiles });
        }

        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read locations directory {:?}", dir))?
        {
            let path = entry?.path();
            let is_yaml = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e == "yml" || e == "yaml");
            if !is_yaml {
                continue;
            }

            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read location profile {:?}", path))?;
            let profile: LocationProfile = serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse location profile {:?}", path))?;

            if profile.slug.trim().is_empty() {
                anyhow::bail!("Location profile {:?} has an empty slug", path);
            }
            if let Some(previous) = profiles.insert(profile.slug.clone(), profile) {
                anyhow::bail!(
                    "Duplicate location slug '{}' (second definition in {:?})",
                    previous.slug,
                    path
                );
            }
        }

        tracing::info!("Loaded {} location profiles", profiles.len());
        Ok(Self { profiles })
    }

    /// Look up one profile by slug
    pub fn get(&self, slug: &str) -> Option<&LocationProfile> {
        self.profiles.get(slug)
    }

    /// All profiles, sorted by display name
    pub fn all(&self) -> Vec<&LocationProfile> {
        let mut all: Vec<_> = self.profiles.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// Number of loaded profiles
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_profile(dir: &Path, file: &str, slug: &str, name: &str) {
        let mut f = std::fs::File::create(dir.join(file)).unwrap();
        write!(
            f,
            "slug: {}\nname: {}\nregion: Test Region\nintro: Intro copy.\n",
            slug, name
        )
        .unwrap();
    }

    #[test]
    fn missing_directory_is_empty_registry() {
        let registry = LocationRegistry::load(Path::new("no/such/dir")).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn loads_and_sorts_profiles() {
        let dir = tempfile::tempdir().unwrap();
        write_profile(dir.path(), "wigan.yml", "wigan", "Wigan");
        write_profile(dir.path(), "bolton.yaml", "bolton", "Bolton");
        // Non-YAML files are ignored
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let registry = LocationRegistry::load(dir.path()).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.get("wigan").is_some());
        assert!(registry.get("salford").is_none());

        let names: Vec<_> = registry.all().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Bolton", "Wigan"]);
    }

    #[test]
    fn duplicate_slug_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_profile(dir.path(), "a.yml", "bolton", "Bolton");
        write_profile(dir.path(), "b.yml", "bolton", "Bolton Again");

        assert!(LocationRegistry::load(dir.path()).is_err());
    }

    #[test]
    fn invalid_profile_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.yml"), "slug: [not a string").unwrap();

        assert!(LocationRegistry::load(dir.path()).is_err());
    }
}
