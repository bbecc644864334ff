//! JSON sidecar describing a saved score model
//!
//! Stored next to the burn record as `<path>.json`. It carries what is
//! needed to rebuild the module before loading weights, plus the team
//! order the one-hot blocks were trained with.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::features::FeatureVector;
use crate::model::RegressorConfig;
use crate::{IplError, Result, Team};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub input_dim: usize,
    #[serde(default)]
    pub hidden_dims: Vec<usize>,
    /// Team names in one-hot order; older artifacts may omit it
    #[serde(default)]
    pub teams: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self::for_config(&RegressorConfig::default())
    }
}

impl ModelMetadata {
    /// Metadata for a model built from `config` over the current team order
    pub fn for_config(config: &RegressorConfig) -> Self {
        ModelMetadata {
            input_dim: config.input_dim,
            hidden_dims: config.hidden_dims.clone(),
            teams: Team::ALL.iter().map(|t| t.name().to_string()).collect(),
            description: None,
        }
    }

    /// Sidecar path for a model path without extension
    pub fn sidecar_path(model_path: &str) -> String {
        format!("{}.json", model_path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            IplError::ModelLoad(format!("cannot read metadata {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            IplError::ModelLoad(format!("malformed metadata {}: {}", path.display(), e))
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| IplError::Parse(format!("Failed to serialize metadata: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn regressor_config(&self) -> RegressorConfig {
        RegressorConfig {
            input_dim: self.input_dim,
            hidden_dims: self.hidden_dims.clone(),
        }
    }

    /// Check the artifact was trained on the vector this crate encodes
    pub fn check_compatible(&self) -> Result<()> {
        if self.input_dim != FeatureVector::DIM {
            return Err(IplError::ModelLoad(format!(
                "model expects {} features, encoder produces {}",
                self.input_dim,
                FeatureVector::DIM
            )));
        }

        if self.teams.is_empty() {
            log::warn!("Model metadata has no team list; assuming standard order");
            return Ok(());
        }

        let expected: Vec<&str> = Team::ALL.iter().map(|t| t.name()).collect();
        if self.teams.len() != expected.len()
            || self.teams.iter().zip(&expected).any(|(a, b)| a != b)
        {
            return Err(IplError::ModelLoad(format!(
                "team order {:?} does not match encoder order {:?}",
                self.teams, expected
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_compatible() {
        let meta = ModelMetadata::default();
        assert_eq!(meta.input_dim, 21);
        assert_eq!(meta.teams.len(), Team::COUNT);
        meta.check_compatible().unwrap();
    }

    #[test]
    fn test_wrong_input_dim() {
        let meta = ModelMetadata {
            input_dim: 19,
            ..ModelMetadata::default()
        };
        assert!(matches!(meta.check_compatible(), Err(IplError::ModelLoad(_))));
    }

    #[test]
    fn test_reordered_teams() {
        let mut meta = ModelMetadata::default();
        meta.teams.swap(0, 1);
        assert!(matches!(meta.check_compatible(), Err(IplError::ModelLoad(_))));
    }

    #[test]
    fn test_missing_team_list_accepted() {
        let meta: ModelMetadata = serde_json::from_str(r#"{"input_dim": 21}"#).unwrap();
        assert!(meta.hidden_dims.is_empty());
        meta.check_compatible().unwrap();
    }

    #[test]
    fn test_load_missing_sidecar() {
        let err = ModelMetadata::load(Path::new("/nonexistent/ipl/model.json")).unwrap_err();
        assert!(matches!(err, IplError::ModelLoad(_)));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("ipl-meta-{}.json", std::process::id()));
        let meta = ModelMetadata {
            description: Some("linear baseline".to_string()),
            ..ModelMetadata::for_config(&RegressorConfig {
                input_dim: FeatureVector::DIM,
                hidden_dims: vec![],
            })
        };
        meta.save(&path).unwrap();

        let loaded = ModelMetadata::load(&path).unwrap();
        assert_eq!(loaded, meta);
        let _ = std::fs::remove_file(&path);
    }
}
