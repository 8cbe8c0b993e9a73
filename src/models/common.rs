use serde::{Deserialize, Serialize};

use super::image::Model;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub credits: f32,
}

impl From<Model> for ModelInfo {
    fn from(model: Model) -> Self {
        ModelInfo {
            id: model.as_str().to_string(),
            name: model.display_name().to_string(),
            provider: "Stability AI".to_string(),
            credits: model.credits(),
        }
    }
}
