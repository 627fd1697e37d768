use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioId {
    Coder,
    Poet,
}

impl ScenarioId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioId::Coder => "coder",
            ScenarioId::Poet => "poet",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "coder" => Some(ScenarioId::Coder),
            "poet" => Some(ScenarioId::Poet),
            _ => None,
        }
    }

    pub fn all() -> [ScenarioId; 2] {
        [ScenarioId::Coder, ScenarioId::Poet]
    }

    pub fn scenario(&self) -> &'static Scenario {
        match self {
            ScenarioId::Coder => &CODER,
            ScenarioId::Poet => &POET,
        }
    }
}

/// Color family a scenario is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accent {
    Blue,
    Orange,
}

/// Fixed description of one side of the comparison
#[derive(Debug, PartialEq, Eq)]
pub struct Scenario {
    pub id: ScenarioId,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub description: &'static str,
    pub default_prompt: &'static str,
    pub button_label: &'static str,
    pub accent: Accent,
}

pub static CODER: Scenario = Scenario {
    id: ScenarioId::Coder,
    title: "The Coder",
    subtitle: "Strict Logic & Math",
    description: "Low temp (0.0-0.3) is critical here. High temperature often causes \
                  hallucinations in syntax, incorrect logic, or weird variable names.",
    default_prompt: "Write a Python function to calculate the Fibonacci sequence iteratively.",
    button_label: "Generate Code",
    accent: Accent::Blue,
};

pub static POET: Scenario = Scenario {
    id: ScenarioId::Poet,
    title: "The Poet",
    subtitle: "Wild Creativity",
    description: "High temp (0.9+) is desired here. Low temperature results in repetitive, \
                  boring, and cliché responses lacking flair.",
    default_prompt: "Invent a brand new mythical creature. Describe its glowing colors, \
                     its habitat made of crystal, and its strange diet.",
    button_label: "Generate Creative Idea",
    accent: Accent::Orange,
};
