use crate::config::ArtifactsConfig;
use crate::error::{AppError, Result};
use crate::metrics::ARTIFACT_LOADS_TOTAL;
use crate::ml::classifier::{Classifier, ClassifierArtifact};
use crate::ml::encoder::OneHotEncoderArtifact;
use crate::ml::features::NUMERIC_COLUMNS;
use crate::ml::models::ModelMetadata;
use crate::ml::scaler::ScalerArtifact;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// On-disk encoding of an artifact, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    Yaml,
    Bincode,
}

impl ArtifactFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(ArtifactFormat::Json),
            "yaml" | "yml" => Some(ArtifactFormat::Yaml),
            "bin" => Some(ArtifactFormat::Bincode),
            _ => None,
        }
    }
}

/// Read and decode one artifact file
pub fn read_artifact<T: DeserializeOwned>(artifact: &str, path: &Path) -> Result<T> {
    let result = decode(artifact, path);
    let status = if result.is_ok() { "success" } else { "failure" };
    ARTIFACT_LOADS_TOTAL
        .with_label_values(&[artifact, status])
        .inc();
    result
}

fn decode<T: DeserializeOwned>(artifact: &str, path: &Path) -> Result<T> {
    let format = ArtifactFormat::from_path(path)
        .ok_or_else(|| AppError::artifact_load(artifact, path, "unsupported file extension"))?;

    let bytes = std::fs::read(path).map_err(|e| AppError::artifact_load(artifact, path, e))?;

    match format {
        ArtifactFormat::Json => serde_json::from_slice(&bytes)
            .map_err(|e| AppError::artifact_load(artifact, path, e)),
        ArtifactFormat::Yaml => serde_yaml::from_slice(&bytes)
            .map_err(|e| AppError::artifact_load(artifact, path, e)),
        ArtifactFormat::Bincode => bincode::deserialize(&bytes)
            .map_err(|e| AppError::artifact_load(artifact, path, e)),
    }
}

/// Encode one artifact in the format its extension names
pub fn write_artifact<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let format = ArtifactFormat::from_path(path).ok_or_else(|| {
        AppError::Serialization(format!("unsupported artifact extension: {}", path.display()))
    })?;

    let bytes = match format {
        ArtifactFormat::Json => serde_json::to_vec_pretty(value)?,
        ArtifactFormat::Yaml => serde_yaml::to_string(value)?.into_bytes(),
        ArtifactFormat::Bincode => {
            bincode::serialize(value).map_err(|e| AppError::Serialization(e.to_string()))?
        }
    };

    std::fs::write(path, bytes)?;
    Ok(())
}

/// Locations of the three artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub scaler: PathBuf,
    pub encoder: PathBuf,
    pub model: PathBuf,
}

impl ArtifactPaths {
    /// `scaler.json`, `encoder.json`, `model.json` under `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            scaler: dir.join("scaler.json"),
            encoder: dir.join("encoder.json"),
            model: dir.join("model.json"),
        }
    }
}

impl From<&ArtifactsConfig> for ArtifactPaths {
    fn from(config: &ArtifactsConfig) -> Self {
        Self {
            scaler: config.scaler_path(),
            encoder: config.encoder_path(),
            model: config.model_path(),
        }
    }
}

/// The three fitted artifacts, immutable once loaded
pub struct Artifacts {
    pub scaler: ScalerArtifact,
    pub encoder: OneHotEncoderArtifact,
    pub model: Box<dyn Classifier>,
    pub loaded_at: DateTime<Utc>,
}

impl Artifacts {
    /// Load all three artifacts. Any failure aborts the load.
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        debug!(
            scaler = %paths.scaler.display(),
            encoder = %paths.encoder.display(),
            model = %paths.model.display(),
            "Loading artifacts"
        );

        let scaler: ScalerArtifact = read_artifact("scaler", &paths.scaler)?;
        scaler
            .validate()
            .map_err(|e| AppError::artifact_load("scaler", &paths.scaler, e))?;

        let encoder: OneHotEncoderArtifact = read_artifact("encoder", &paths.encoder)?;
        encoder
            .validate()
            .map_err(|e| AppError::artifact_load("encoder", &paths.encoder, e))?;

        let model: ClassifierArtifact = read_artifact("model", &paths.model)?;
        let model = model
            .into_classifier()
            .map_err(|e| AppError::artifact_load("model", &paths.model, e))?;

        Ok(Self::from_parts(scaler, encoder, model))
    }

    pub fn from_parts(
        scaler: ScalerArtifact,
        encoder: OneHotEncoderArtifact,
        model: Box<dyn Classifier>,
    ) -> Self {
        Self {
            scaler,
            encoder,
            model,
            loaded_at: Utc::now(),
        }
    }

    /// Column names of the preprocessed row: scaled numerics then encoded categoricals
    pub fn feature_names(&self) -> Vec<String> {
        NUMERIC_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(self.encoder.feature_names_out())
            .collect()
    }

    pub fn metadata(&self) -> ModelMetadata {
        ModelMetadata {
            model_type: self.model.model_type(),
            scaler_type: self.scaler.scaler_type(),
            n_features: self.model.n_features(),
            feature_names: self.feature_names(),
            categories: self.encoder.vocabulary(),
            loaded_at: self.loaded_at,
        }
    }
}

/// Where the pipeline gets its artifacts from
pub enum ArtifactStore {
    /// Loaded once at startup, shared read-only
    Cached(Arc<Artifacts>),
    /// Read from storage on every request
    PerRequest(ArtifactPaths),
}

impl ArtifactStore {
    pub fn from_config(config: &ArtifactsConfig) -> Result<Self> {
        let paths = ArtifactPaths::from(config);
        if config.cache {
            Self::cached(&paths)
        } else {
            info!("Artifacts will be read on every request");
            Ok(ArtifactStore::PerRequest(paths))
        }
    }

    pub fn cached(paths: &ArtifactPaths) -> Result<Self> {
        let artifacts = Artifacts::load(paths)?;
        info!(
            model_type = %artifacts.model.model_type(),
            n_features = artifacts.model.n_features(),
            "✅ Artifacts loaded and cached"
        );
        Ok(ArtifactStore::Cached(Arc::new(artifacts)))
    }

    pub fn per_request(paths: ArtifactPaths) -> Self {
        ArtifactStore::PerRequest(paths)
    }

    /// Artifacts for one request
    pub fn get(&self) -> Result<Arc<Artifacts>> {
        match self {
            ArtifactStore::Cached(artifacts) => Ok(Arc::clone(artifacts)),
            ArtifactStore::PerRequest(paths) => Artifacts::load(paths).map(Arc::new).map_err(|e| {
                warn!("Failed to load artifacts: {}", e);
                e
            }),
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, ArtifactStore::Cached(_))
    }
}
