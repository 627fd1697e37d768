use crate::scenario::ScenarioId;

/// Editable prompt text, one per scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptStore {
    coder: String,
    poet: String,
}

impl PromptStore {
    pub fn new() -> Self {
        Self {
            coder: ScenarioId::Coder.scenario().default_prompt.to_string(),
            poet: ScenarioId::Poet.scenario().default_prompt.to_string(),
        }
    }

    pub fn get(&self, id: ScenarioId) -> &str {
        match id {
            ScenarioId::Coder => &self.coder,
            ScenarioId::Poet => &self.poet,
        }
    }

    /// Mutable access for in-place editing by the view layer.
    pub fn get_mut(&mut self, id: ScenarioId) -> &mut String {
        match id {
            ScenarioId::Coder => &mut self.coder,
            ScenarioId::Poet => &mut self.poet,
        }
    }

    pub fn set(&mut self, id: ScenarioId, text: impl Into<String>) {
        *self.get_mut(id) = text.into();
    }

    pub fn is_modified(&self, id: ScenarioId) -> bool {
        self.get(id) != id.scenario().default_prompt
    }
}

impl Default for PromptStore {
    fn default() -> Self {
        Self::new()
    }
}
