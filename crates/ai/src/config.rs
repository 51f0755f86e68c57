/// LLM gateway settings.
#[derive(Clone, Debug)]
pub struct AiConfig {
    /// OpenAI-compatible endpoint. `None` uses the OpenAI default.
    pub base_url: Option<String>,
    pub api_key: String,
    pub model: String,
    pub temperature: f64,
    /// Analysis answers longer than this are cut at a word boundary.
    pub max_output_chars: usize,
}

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_OUTPUT_CHARS: usize = 4000;

impl AiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: None,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            max_output_chars: DEFAULT_MAX_OUTPUT_CHARS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_output_chars(mut self, max_output_chars: usize) -> Self {
        self.max_output_chars = max_output_chars;
        self
    }
}
