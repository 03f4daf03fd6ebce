#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OpenAIModel {
    Gpt4o,
    #[default]
    Gpt4oMini,
    Gpt41,
    Gpt41Mini,
    Gpt35Turbo,
    Override(String),
}

impl OpenAIModel {
    pub fn id(&self) -> &str {
        match self {
            Self::Gpt4o => "gpt-4o",
            Self::Gpt4oMini => "gpt-4o-mini",
            Self::Gpt41 => "gpt-4.1",
            Self::Gpt41Mini => "gpt-4.1-mini",
            Self::Gpt35Turbo => "gpt-3.5-turbo",
            Self::Override(s) => s.as_str(),
        }
    }

    /// Map a model id back to a known variant, keeping unknown ids as overrides.
    pub fn from_id(id: &str) -> Self {
        match id {
            "gpt-4o" => Self::Gpt4o,
            "gpt-4o-mini" => Self::Gpt4oMini,
            "gpt-4.1" => Self::Gpt41,
            "gpt-4.1-mini" => Self::Gpt41Mini,
            "gpt-3.5-turbo" => Self::Gpt35Turbo,
            other => Self::Override(other.to_string()),
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Gpt4o => "OpenAI GPT-4o",
            Self::Gpt4oMini => "OpenAI GPT-4o Mini",
            Self::Gpt41 => "OpenAI GPT-4.1",
            Self::Gpt41Mini => "OpenAI GPT-4.1 Mini",
            Self::Gpt35Turbo => "OpenAI GPT-3.5 Turbo",
            Self::Override(_) => "OpenAI (override)",
        }
    }
}
