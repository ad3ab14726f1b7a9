//! Model value object representing one consensus participant

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A model that can be asked for a verdict (Value Object)
///
/// Each model is backed by a separate CLI process. The well-known families
/// get their own variants so adapters can pick an invocation; anything else
/// is carried through as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    Claude,
    Codex,
    Gemini,
    Custom(String),
}

/// Model family, used by adapters to decide how a model is launched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    Claude,
    Codex,
    Gemini,
    Unknown,
}

impl Model {
    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Claude => "claude",
            Model::Codex => "codex",
            Model::Gemini => "gemini",
            Model::Custom(s) => s,
        }
    }

    /// Get the default set of consensus participants
    pub fn default_models() -> Vec<Model> {
        vec![Model::Claude, Model::Codex, Model::Gemini]
    }

    /// Detect the model family from the identifier
    ///
    /// Custom identifiers such as `claude-opus-4` or `gpt-5-codex` still map
    /// onto a known family by prefix.
    pub fn family(&self) -> ModelFamily {
        let id = self.as_str().to_lowercase();
        if id.starts_with("claude") {
            ModelFamily::Claude
        } else if id.starts_with("codex") || id.starts_with("gpt") || id.starts_with("o3") {
            ModelFamily::Codex
        } else if id.starts_with("gemini") {
            ModelFamily::Gemini
        } else {
            ModelFamily::Unknown
        }
    }

    /// Parse a comma-separated model list, skipping blanks
    pub fn parse_list(s: &str) -> Vec<Model> {
        s.split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(Model::from_id)
            .collect()
    }

    fn from_id(s: &str) -> Model {
        match s {
            "claude" => Model::Claude,
            "codex" => Model::Codex,
            "gemini" => Model::Gemini,
            other => Model::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = crate::core::error::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(crate::core::error::DomainError::InvalidModel(
                "model name cannot be empty".to_string(),
            ));
        }
        Ok(Model::from_id(trimmed))
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
