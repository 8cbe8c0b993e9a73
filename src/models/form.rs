use reqwest::multipart::Form;

use super::image::GenerationRequest;

/// Ordered multipart fields for one generation call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormPayload {
    fields: Vec<(&'static str, String)>,
}

impl FormPayload {
    pub fn fields(&self) -> &[(&'static str, String)] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn into_multipart(self) -> Form {
        self.fields
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value))
    }

    fn push(&mut self, name: &'static str, value: impl Into<String>) {
        self.fields.push((name, value.into()));
    }
}

/// Builds the outbound body shared by the proxy and the direct client.
/// `prompt` is always present; every other field is skipped when unset.
pub fn build_multipart_body(request: &GenerationRequest) -> FormPayload {
    let mut payload = FormPayload::default();
    payload.push("prompt", request.prompt.as_str());

    if let Some(model) = request.model {
        payload.push("model", model.as_str());
    }
    if let Some(aspect_ratio) = request.aspect_ratio {
        payload.push("aspect_ratio", aspect_ratio.as_str());
    }
    if let Some(negative_prompt) = request.effective_negative_prompt() {
        payload.push("negative_prompt", negative_prompt);
    }
    if let Some(seed) = request.effective_seed() {
        payload.push("seed", seed.to_string());
    }
    if let Some(cfg_scale) = request.effective_cfg_scale() {
        payload.push("cfg_scale", format_float(cfg_scale));
    }

    payload
}

// Always keeps a decimal point: 7.5 -> "7.5", 7.0 -> "7.0".
fn format_float(value: f64) -> String {
    let text = value.to_string();
    if text.contains('.') || !value.is_finite() {
        text
    } else {
        format!("{}.0", text)
    }
}
