//! Adapter between feature vectors and a loaded score model

use burn::tensor::backend::Backend;
use burn::tensor::{ElementConversion, Tensor};
use std::path::Path;

use crate::model::{ModelMetadata, RegressorConfig, ScoreRegressor};
use crate::{IplError, Result};

/// CPU backend used for inference
pub type InferenceBackend = burn::backend::NdArray<f32>;

/// A trained model that maps a feature vector to a score estimate
pub trait ScoreModel {
    /// Length of the vector the model was trained on
    fn input_dim(&self) -> usize;

    /// Score a single feature vector
    fn predict(&self, features: &[f32]) -> Result<f32>;
}

/// Reject vectors whose length the model was not trained on
pub fn check_dimension(model: &dyn ScoreModel, features: &[f32]) -> Result<()> {
    if features.len() != model.input_dim() {
        return Err(IplError::DimensionMismatch {
            expected: model.input_dim(),
            actual: features.len(),
        });
    }
    Ok(())
}

/// [`ScoreRegressor`] loaded from disk
pub struct BurnScoreModel<B: Backend> {
    model: ScoreRegressor<B>,
    metadata: ModelMetadata,
    device: B::Device,
}

impl<B: Backend> BurnScoreModel<B>
where
    B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
    B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
{
    /// Load `<path>.json` and `<path>.mpk`.
    ///
    /// Any missing file or shape disagreement is a [`IplError::ModelLoad`].
    pub fn load(path: &str, device: B::Device) -> Result<Self> {
        let sidecar = ModelMetadata::sidecar_path(path);
        let metadata = ModelMetadata::load(Path::new(&sidecar))?;
        metadata.check_compatible()?;

        let model = ScoreRegressor::load(&device, path, &metadata.regressor_config())?;
        if model.input_dim() != metadata.input_dim {
            return Err(IplError::ModelLoad(format!(
                "weights take {} inputs but metadata says {}",
                model.input_dim(),
                metadata.input_dim
            )));
        }

        log::info!(
            "Loaded score model from {} (input_dim={}, hidden={:?})",
            path,
            metadata.input_dim,
            metadata.hidden_dims
        );

        Ok(BurnScoreModel {
            model,
            metadata,
            device,
        })
    }
}

impl<B: Backend> BurnScoreModel<B> {
    /// Wrap an in-memory model
    pub fn from_model(model: ScoreRegressor<B>, device: B::Device) -> Self {
        let metadata = ModelMetadata::for_config(&RegressorConfig {
            input_dim: model.input_dim(),
            hidden_dims: model.hidden_dims(),
        });
        BurnScoreModel {
            model,
            metadata,
            device,
        }
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

impl<B: Backend> ScoreModel for BurnScoreModel<B> {
    fn input_dim(&self) -> usize {
        self.metadata.input_dim
    }

    fn predict(&self, features: &[f32]) -> Result<f32> {
        check_dimension(self, features)?;

        let input = Tensor::<B, 1>::from_floats(features, &self.device)
            .reshape([1, features.len()]);
        let output = self.model.forward(input);
        Ok(output.reshape([1]).into_scalar().elem::<f32>())
    }
}
