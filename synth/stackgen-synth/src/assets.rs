use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;
use walkdir::WalkDir;

use crate::SynthError;
use crate::template::Token;

/// Repository the provisioning engine publishes image assets to.
pub const ASSET_REPOSITORY: &str = "stackgen-container-assets";

/// A container build context, content-addressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageAsset {
    /// Hex SHA-256 over sorted relative paths, file bytes and build args.
    pub id: String,
    pub directory: PathBuf,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub build_args: BTreeMap<String, String>,
}

impl ImageAsset {
    /// Hash a build context. The directory must exist and hold a `Dockerfile`.
    pub fn resolve(
        directory: &Path,
        build_args: &BTreeMap<String, String>,
    ) -> Result<Self, SynthError> {
        let fail = |reason: &str| SynthError::Asset {
            path: directory.display().to_string(),
            reason: reason.to_string(),
        };
        if !directory.is_dir() {
            return Err(fail("build context directory does not exist"));
        }
        if !directory.join("Dockerfile").is_file() {
            return Err(fail("build context has no Dockerfile"));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(directory)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.file_name() != ".git")
        {
            let entry = entry.map_err(|e| fail(&e.to_string()))?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        let mut hasher = Sha256::new();
        for path in &files {
            let relative = path.strip_prefix(directory).unwrap_or(path);
            hasher.update(relative.to_string_lossy().replace('\\', "/").as_bytes());
            hasher.update([0u8]);
            hasher.update(std::fs::read(path)?);
            hasher.update([0u8]);
        }
        for (key, value) in build_args {
            hasher.update(format!("{}={}", key, value).as_bytes());
            hasher.update([0u8]);
        }
        let id = hex::encode(hasher.finalize());
        debug!(directory = %directory.display(), files = files.len(), %id, "hashed image asset");

        Ok(Self {
            id,
            directory: directory.to_path_buf(),
            build_args: build_args.clone(),
        })
    }

    pub fn image_uri(&self) -> Token {
        Token::sub(format!(
            "${{AWS::AccountId}}.dkr.ecr.${{AWS::Region}}.${{AWS::URLSuffix}}/{}:{}",
            ASSET_REPOSITORY, self.id
        ))
    }

    pub fn repository_arn() -> Token {
        Token::sub(format!(
            "arn:${{AWS::Partition}}:ecr:${{AWS::Region}}:${{AWS::AccountId}}:repository/{}",
            ASSET_REPOSITORY
        ))
    }
}

/// Image a service runs, after asset resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedImage {
    Asset(ImageAsset),
    Registry(String),
}

impl ResolvedImage {
    pub fn image(&self) -> Token {
        match self {
            ResolvedImage::Asset(asset) => asset.image_uri(),
            ResolvedImage::Registry(uri) => Token::literal(uri.clone()),
        }
    }

    pub fn asset(&self) -> Option<&ImageAsset> {
        match self {
            ResolvedImage::Asset(asset) => Some(asset),
            ResolvedImage::Registry(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn context() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Dockerfile"), "FROM eclipse-temurin:17\n").unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/App.java"), "class App {}").unwrap();
        dir
    }

    #[test]
    fn hash_is_stable_and_content_sensitive() {
        let dir = context();
        let args = BTreeMap::new();
        let first = ImageAsset::resolve(dir.path(), &args).unwrap();
        let again = ImageAsset::resolve(dir.path(), &args).unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(first.id.len(), 64);

        fs::write(dir.path().join("src/App.java"), "class App { }").unwrap();
        let changed = ImageAsset::resolve(dir.path(), &args).unwrap();
        assert_ne!(first.id, changed.id);
    }

    #[test]
    fn git_metadata_and_build_args() {
        let dir = context();
        let args = BTreeMap::new();
        let base = ImageAsset::resolve(dir.path(), &args).unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/HEAD"), "ref: main").unwrap();
        assert_eq!(ImageAsset::resolve(dir.path(), &args).unwrap().id, base.id);

        let args = BTreeMap::from([("PROFILE".to_string(), "prod".to_string())]);
        assert_ne!(ImageAsset::resolve(dir.path(), &args).unwrap().id, base.id);
    }

    #[test]
    fn missing_context_or_dockerfile_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = BTreeMap::new();
        let err = ImageAsset::resolve(&dir.path().join("nope"), &args).unwrap_err();
        assert!(matches!(err, SynthError::Asset { .. }));
        let err = ImageAsset::resolve(dir.path(), &args).unwrap_err();
        assert!(err.to_string().contains("Dockerfile"));
    }

    #[test]
    fn image_uri_tags_with_asset_id() {
        let dir = context();
        let asset = ImageAsset::resolve(dir.path(), &BTreeMap::new()).unwrap();
        let uri = asset.image_uri();
        let body = uri.as_value()["Fn::Sub"].as_str().unwrap();
        assert!(body.ends_with(&format!("{}:{}", ASSET_REPOSITORY, asset.id)));
        assert_eq!(
            ResolvedImage::Registry("nginx:1.27".into()).image().as_literal(),
            Some("nginx:1.27")
        );
    }
}
