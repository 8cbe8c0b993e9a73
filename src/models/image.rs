use std::fmt;

use serde::de::{value::StringDeserializer, IntoDeserializer};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, SdError};

/// Largest seed the generation API accepts.
pub const MAX_SEED: i64 = 4_294_967_294;
pub const MIN_CFG_SCALE: f64 = 1.0;
pub const MAX_CFG_SCALE: f64 = 10.0;
pub const DEFAULT_CFG_SCALE: f64 = 7.5;

/// `finish_reason` value reported for a successful generation.
pub const FINISH_REASON_SUCCESS: &str = "SUCCESS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Model {
    #[default]
    #[serde(rename = "sd3.5-large")]
    Sd35Large,
    #[serde(rename = "sd3.5-large-turbo")]
    Sd35LargeTurbo,
    #[serde(rename = "sd3.5-medium")]
    Sd35Medium,
    #[serde(rename = "sd3-large")]
    Sd3Large,
    #[serde(rename = "sd3-large-turbo")]
    Sd3LargeTurbo,
    #[serde(rename = "sd3-medium")]
    Sd3Medium,
}

impl Model {
    pub const ALL: [Model; 6] = [
        Model::Sd35Large,
        Model::Sd35LargeTurbo,
        Model::Sd35Medium,
        Model::Sd3Large,
        Model::Sd3LargeTurbo,
        Model::Sd3Medium,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Model::Sd35Large => "sd3.5-large",
            Model::Sd35LargeTurbo => "sd3.5-large-turbo",
            Model::Sd35Medium => "sd3.5-medium",
            Model::Sd3Large => "sd3-large",
            Model::Sd3LargeTurbo => "sd3-large-turbo",
            Model::Sd3Medium => "sd3-medium",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Model::Sd35Large => "SD 3.5 Large",
            Model::Sd35LargeTurbo => "SD 3.5 Large Turbo",
            Model::Sd35Medium => "SD 3.5 Medium",
            Model::Sd3Large => "SD 3 Large",
            Model::Sd3LargeTurbo => "SD 3 Large Turbo",
            Model::Sd3Medium => "SD 3 Medium",
        }
    }

    /// Credits charged per image.
    pub fn credits(&self) -> f32 {
        match self {
            Model::Sd35Large | Model::Sd3Large => 6.5,
            Model::Sd35LargeTurbo | Model::Sd3LargeTurbo => 4.0,
            Model::Sd35Medium | Model::Sd3Medium => 3.5,
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AspectRatio {
    #[serde(rename = "16:9")]
    Wide,
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "21:9")]
    UltraWide,
    #[serde(rename = "2:3")]
    Portrait2x3,
    #[serde(rename = "3:2")]
    Landscape3x2,
    #[serde(rename = "4:5")]
    Portrait4x5,
    #[serde(rename = "5:4")]
    Landscape5x4,
    #[serde(rename = "9:16")]
    Tall,
    #[serde(rename = "9:21")]
    UltraTall,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 9] = [
        AspectRatio::Wide,
        AspectRatio::Square,
        AspectRatio::UltraWide,
        AspectRatio::Portrait2x3,
        AspectRatio::Landscape3x2,
        AspectRatio::Portrait4x5,
        AspectRatio::Landscape5x4,
        AspectRatio::Tall,
        AspectRatio::UltraTall,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Wide => "16:9",
            AspectRatio::Square => "1:1",
            AspectRatio::UltraWide => "21:9",
            AspectRatio::Portrait2x3 => "2:3",
            AspectRatio::Landscape3x2 => "3:2",
            AspectRatio::Portrait4x5 => "4:5",
            AspectRatio::Landscape5x4 => "5:4",
            AspectRatio::Tall => "9:16",
            AspectRatio::UltraTall => "9:21",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of one generation. Optional fields that hold a falsy value
/// (`0`, `""`) mean "not set" and never reach the wire.
#[derive(Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GenerationRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub model: Option<Model>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub aspect_ratio: Option<AspectRatio>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cfg_scale: Option<f64>,
    #[serde(rename = "apiKey", default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl GenerationRequest {
    /// A request carrying the form defaults: `sd3.5-large`, `1:1`, cfg 7.5.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: Some(Model::default()),
            aspect_ratio: Some(AspectRatio::default()),
            negative_prompt: None,
            seed: None,
            cfg_scale: Some(DEFAULT_CFG_SCALE),
            api_key: None,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = Some(aspect_ratio);
        self
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = Some(negative_prompt.into());
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_cfg_scale(mut self, cfg_scale: f64) -> Self {
        self.cfg_scale = Some(cfg_scale);
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Negative prompt, or `None` when empty.
    pub fn effective_negative_prompt(&self) -> Option<&str> {
        self.negative_prompt.as_deref().filter(|s| !s.is_empty())
    }

    /// Seed, or `None` when `0`. A deliberate seed of 0 cannot be expressed.
    pub fn effective_seed(&self) -> Option<i64> {
        self.seed.filter(|seed| *seed != 0)
    }

    pub fn effective_cfg_scale(&self) -> Option<f64> {
        self.cfg_scale.filter(|cfg| *cfg != 0.0 && !cfg.is_nan())
    }

    pub fn effective_api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|s| !s.is_empty())
    }

    pub fn validate(&self) -> Result<()> {
        if self.prompt.is_empty() {
            return Err(SdError::Validation("prompt must not be empty".into()));
        }
        if let Some(seed) = self.seed {
            if !(0..=MAX_SEED).contains(&seed) {
                return Err(SdError::Validation(format!(
                    "seed {} is outside [0, {}]",
                    seed, MAX_SEED
                )));
            }
        }
        if let Some(cfg) = self.effective_cfg_scale() {
            if !(MIN_CFG_SCALE..=MAX_CFG_SCALE).contains(&cfg) {
                return Err(SdError::Validation(format!(
                    "cfg_scale {} is outside [{:.1}, {:.1}]",
                    cfg, MIN_CFG_SCALE, MAX_CFG_SCALE
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for GenerationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationRequest")
            .field("prompt", &self.prompt)
            .field("model", &self.model)
            .field("aspect_ratio", &self.aspect_ratio)
            .field("negative_prompt", &self.negative_prompt)
            .field("seed", &self.seed)
            .field("cfg_scale", &self.cfg_scale)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// `""` and `null` both mean "not set" for the enum fields.
fn empty_as_none<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(value) if !value.is_empty() => {
            let value: StringDeserializer<D::Error> = value.into_deserializer();
            T::deserialize(value).map(Some)
        }
        _ => Ok(None),
    }
}

/// JSON body returned by the generation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GenerationResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl GenerationResponse {
    /// Base64 image data, present only for a successful generation.
    pub fn successful_image(&self) -> Option<&str> {
        match (&self.image, self.finish_reason.as_deref()) {
            (Some(image), Some(FINISH_REASON_SUCCESS)) if !image.is_empty() => Some(image),
            _ => None,
        }
    }
}
