use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Transport,
    Entertainment,
    Health,
    Shopping,
    Bills,
    Education,
    Travel,
    Other,
}

impl Category {
    /// Stable key used for storage and as the translation lookup key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Transport => "transport",
            Self::Entertainment => "entertainment",
            Self::Health => "health",
            Self::Shopping => "shopping",
            Self::Bills => "bills",
            Self::Education => "education",
            Self::Travel => "travel",
            Self::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "food" => Some(Self::Food),
            "transport" => Some(Self::Transport),
            "entertainment" => Some(Self::Entertainment),
            "health" => Some(Self::Health),
            "shopping" => Some(Self::Shopping),
            "bills" | "utilities" => Some(Self::Bills),
            "education" => Some(Self::Education),
            "travel" => Some(Self::Travel),
            "other" | "misc" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn all() -> &'static [Category] {
        &[
            Self::Food,
            Self::Transport,
            Self::Entertainment,
            Self::Health,
            Self::Shopping,
            Self::Bills,
            Self::Education,
            Self::Travel,
            Self::Other,
        ]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
