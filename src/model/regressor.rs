//! Feed-forward score regressor
//!
//! Architecture: Input(21) → [Linear → ReLU]* → Linear(1)
//!
//! With no hidden layers this is plain linear regression over the
//! feature vector.

use burn::module::Module;
use burn::nn::{Initializer, Linear, LinearConfig};
use burn::record::{FullPrecisionSettings, Recorder};
use burn::tensor::activation::relu;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;
use crate::IplError;

/// Shape of the regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressorConfig {
    /// Input dimension (feature vector length)
    pub input_dim: usize,
    /// Hidden layer widths, empty for a linear model
    pub hidden_dims: Vec<usize>,
}

impl Default for RegressorConfig {
    fn default() -> Self {
        RegressorConfig {
            input_dim: FeatureVector::DIM,
            hidden_dims: vec![64, 32],
        }
    }
}

/// Linear → ReLU
#[derive(Module, Debug)]
pub struct HiddenBlock<B: Backend> {
    linear: Linear<B>,
}

impl<B: Backend> HiddenBlock<B> {
    pub fn new(device: &B::Device, in_dim: usize, out_dim: usize, init: &Initializer) -> Self {
        HiddenBlock {
            linear: LinearConfig::new(in_dim, out_dim)
                .with_initializer(init.clone())
                .init(device),
        }
    }

    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        relu(self.linear.forward(x))
    }
}

/// Regression model predicting the final first-innings total
#[derive(Module, Debug)]
pub struct ScoreRegressor<B: Backend> {
    hidden: Vec<HiddenBlock<B>>,
    head: Linear<B>,
}

impl<B: Backend> ScoreRegressor<B> {
    /// Create a model with burn's default initialization
    pub fn new(device: &B::Device, config: &RegressorConfig) -> Self {
        Self::with_initializer(device, config, LinearConfig::new(1, 1).initializer)
    }

    /// Create a model with every layer using `init`
    pub fn with_initializer(
        device: &B::Device,
        config: &RegressorConfig,
        init: Initializer,
    ) -> Self {
        let mut hidden = Vec::with_capacity(config.hidden_dims.len());
        let mut in_dim = config.input_dim;
        for &out_dim in &config.hidden_dims {
            hidden.push(HiddenBlock::new(device, in_dim, out_dim, &init));
            in_dim = out_dim;
        }

        ScoreRegressor {
            hidden,
            head: LinearConfig::new(in_dim, 1)
                .with_initializer(init)
                .init(device),
        }
    }

    /// Forward pass
    ///
    /// # Arguments
    /// * `features` - Feature vectors [batch, input_dim]
    ///
    /// # Returns
    /// Score estimates [batch, 1]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self
            .hidden
            .iter()
            .fold(features, |x, block| block.forward(x));
        self.head.forward(x)
    }

    /// Input width of the first layer, as actually stored in the weights
    pub fn input_dim(&self) -> usize {
        let first = match self.hidden.first() {
            Some(block) => &block.linear,
            None => &self.head,
        };
        first.weight.val().dims()[0]
    }

    /// Hidden layer widths, as actually stored in the weights
    pub fn hidden_dims(&self) -> Vec<usize> {
        self.hidden
            .iter()
            .map(|block| block.linear.weight.val().dims()[1])
            .collect()
    }

    /// Save model to file (burn appends `.mpk`)
    pub fn save(&self, path: &str) -> crate::Result<()>
    where
        B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
        B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
    {
        let recorder = burn::record::NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        recorder
            .record(self.clone().into_record(), path.into())
            .map_err(|e| IplError::Io(std::io::Error::other(e.to_string())))
    }

    /// Load model from file
    pub fn load(device: &B::Device, path: &str, config: &RegressorConfig) -> crate::Result<Self>
    where
        B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
        B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
    {
        let recorder = burn::record::NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        let record: ScoreRegressorRecord<B> = recorder
            .load(path.into(), device)
            .map_err(|e| IplError::ModelLoad(format!("{}.mpk: {}", path, e)))?;
        check_record_shape(&record, config)
            .map_err(|e| IplError::ModelLoad(format!("{}.mpk: {}", path, e)))?;

        let model = Self::new(device, config);
        Ok(model.load_record(record))
    }
}

/// Layer shapes in a saved record must match the module built from `config`,
/// otherwise burn panics inside `load_record`.
fn check_record_shape<B: Backend>(
    record: &ScoreRegressorRecord<B>,
    config: &RegressorConfig,
) -> Result<(), String> {
    if record.hidden.len() != config.hidden_dims.len() {
        return Err(format!(
            "weights have {} hidden layers, metadata says {}",
            record.hidden.len(),
            config.hidden_dims.len()
        ));
    }

    let mut in_dim = config.input_dim;
    for (i, (block, &out_dim)) in record.hidden.iter().zip(&config.hidden_dims).enumerate() {
        let dims = block.linear.weight.val().dims();
        if dims != [in_dim, out_dim] {
            return Err(format!(
                "hidden layer {} is {:?}, metadata says {:?}",
                i,
                dims,
                [in_dim, out_dim]
            ));
        }
        in_dim = out_dim;
    }

    let dims = record.head.weight.val().dims();
    if dims != [in_dim, 1] {
        return Err(format!("output layer is {:?}, expected {:?}", dims, [in_dim, 1]));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::ElementConversion;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_forward_shape() {
        let device = Default::default();
        let model = ScoreRegressor::<TestBackend>::new(&device, &RegressorConfig::default());

        let x = Tensor::random(
            [4, FeatureVector::DIM],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        assert_eq!(model.forward(x).dims(), [4, 1]);
        assert_eq!(model.input_dim(), FeatureVector::DIM);
    }

    #[test]
    fn test_linear_model_with_constant_weights() {
        let device = Default::default();
        let config = RegressorConfig {
            input_dim: 3,
            hidden_dims: vec![],
        };
        let model = ScoreRegressor::<TestBackend>::with_initializer(
            &device,
            &config,
            Initializer::Constant { value: 1.0 },
        );

        // 1*1 + 1*2 + 1*3 + bias 1
        let x = Tensor::<TestBackend, 1>::from_floats([1.0f32, 2.0, 3.0], &device).reshape([1, 3]);
        let y: f32 = model.forward(x).reshape([1]).into_scalar().elem();
        assert_eq!(y, 7.0);
        assert_eq!(model.input_dim(), 3);
    }

    #[test]
    fn test_save_and_load() {
        let device = Default::default();
        let config = RegressorConfig {
            input_dim: FeatureVector::DIM,
            hidden_dims: vec![8],
        };
        let model = ScoreRegressor::<TestBackend>::with_initializer(
            &device,
            &config,
            Initializer::Constant { value: 0.5 },
        );

        let path = std::env::temp_dir()
            .join(format!("ipl-regressor-{}", std::process::id()))
            .to_string_lossy()
            .to_string();
        model.save(&path).unwrap();

        let loaded = ScoreRegressor::<TestBackend>::load(&device, &path, &config).unwrap();
        let x = Tensor::<TestBackend, 2>::ones([1, FeatureVector::DIM], &device);
        let a: f32 = model.forward(x.clone()).reshape([1]).into_scalar().elem();
        let b: f32 = loaded.forward(x).reshape([1]).into_scalar().elem();
        assert_eq!(a, b);

        let _ = std::fs::remove_file(format!("{}.mpk", path));
    }

    fn save_constant(path: &str, config: &RegressorConfig) {
        let device = Default::default();
        ScoreRegressor::<TestBackend>::with_initializer(
            &device,
            config,
            Initializer::Constant { value: 1.0 },
        )
        .save(path)
        .unwrap();
    }

    #[test]
    fn test_load_rejects_extra_hidden_layer() {
        let path = std::env::temp_dir()
            .join(format!("ipl-regressor-layers-{}", std::process::id()))
            .to_string_lossy()
            .to_string();
        save_constant(
            &path,
            &RegressorConfig {
                input_dim: FeatureVector::DIM,
                hidden_dims: vec![8, 4],
            },
        );

        let claimed = RegressorConfig {
            input_dim: FeatureVector::DIM,
            hidden_dims: vec![8],
        };
        let err = ScoreRegressor::<TestBackend>::load(&Default::default(), &path, &claimed)
            .unwrap_err();
        assert!(matches!(err, IplError::ModelLoad(ref msg) if msg.contains("hidden layers")));

        let _ = std::fs::remove_file(format!("{}.mpk", path));
    }

    #[test]
    fn test_load_rejects_wrong_widths() {
        let path = std::env::temp_dir()
            .join(format!("ipl-regressor-widths-{}", std::process::id()))
            .to_string_lossy()
            .to_string();
        save_constant(
            &path,
            &RegressorConfig {
                input_dim: FeatureVector::DIM,
                hidden_dims: vec![6],
            },
        );

        let device = Default::default();
        for claimed in [
            RegressorConfig {
                input_dim: FeatureVector::DIM,
                hidden_dims: vec![8],
            },
            RegressorConfig {
                input_dim: 7,
                hidden_dims: vec![6],
            },
        ] {
            let err = ScoreRegressor::<TestBackend>::load(&device, &path, &claimed).unwrap_err();
            assert!(matches!(err, IplError::ModelLoad(_)));
        }

        let _ = std::fs::remove_file(format!("{}.mpk", path));
    }

    #[test]
    fn test_hidden_dims_from_weights() {
        let device = Default::default();
        let model = ScoreRegressor::<TestBackend>::new(&device, &RegressorConfig::default());
        assert_eq!(model.hidden_dims(), vec![64, 32]);
    }

    #[test]
    fn test_load_missing_file() {
        let device = Default::default();
        let err = ScoreRegressor::<TestBackend>::load(
            &device,
            "/nonexistent/ipl/model",
            &RegressorConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, IplError::ModelLoad(_)));
    }
}
