use ratatui::layout::Rect;
use tempcheck_core::{
    Completion, Credential, GenerationOutcome, PendingGeneration, RequestController, ScenarioId,
    Temperature,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing into the focused card's prompt.
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Slider,
    Card(ScenarioId),
    Output,
}

impl FocusPane {
    const ORDER: [FocusPane; 4] = [
        FocusPane::Slider,
        FocusPane::Card(ScenarioId::Coder),
        FocusPane::Card(ScenarioId::Poet),
        FocusPane::Output,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Shared session state and the outcome slot
    pub controller: RequestController,
    pub model: String,

    // Prompt editing (cursor is a char index into the focused prompt)
    pub prompt_cursor: usize,

    // Output panel
    pub output_scroll: u16,
    pub output_height: u16,
    pub total_output_lines: u16,

    // Requests created by key handlers, waiting to be spawned by the run loop
    pub dispatched: Vec<PendingGeneration>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // API key input state
    pub show_api_key_input: bool,
    pub api_key_input: String,
    pub api_key_input_cursor: usize,

    // Panel areas for mouse hit-testing (updated during render)
    pub slider_area: Option<Rect>,
    pub coder_area: Option<Rect>,
    pub poet_area: Option<Rect>,
    pub output_area: Option<Rect>,
}

impl App {
    pub fn new(controller: RequestController, model: impl Into<String>) -> Self {
        let show_api_key_input = controller.credential().is_empty();

        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            focus: FocusPane::Slider,

            controller,
            model: model.into(),

            prompt_cursor: 0,

            output_scroll: 0,
            output_height: 0,
            total_output_lines: 0,

            dispatched: Vec::new(),

            animation_frame: 0,

            // Ask for a key straight away when none came from the environment
            show_api_key_input,
            api_key_input: String::new(),
            api_key_input_cursor: 0,

            slider_area: None,
            coder_area: None,
            poet_area: None,
            output_area: None,
        }
    }

    pub fn temperature(&self) -> Temperature {
        self.controller.temperature()
    }

    pub fn outcome(&self) -> &GenerationOutcome {
        self.controller.outcome()
    }

    pub fn focused_scenario(&self) -> Option<ScenarioId> {
        match self.focus {
            FocusPane::Card(id) => Some(id),
            _ => None,
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn raise_temperature(&mut self) {
        self.controller.step_temperature_up();
    }

    pub fn lower_temperature(&mut self) {
        self.controller.step_temperature_down();
    }

    pub fn set_temperature(&mut self, temperature: Temperature) {
        self.controller.set_temperature(temperature);
    }

    /// Enter prompt editing for the focused card, cursor at the end.
    pub fn start_editing(&mut self) {
        if let Some(id) = self.focused_scenario() {
            self.prompt_cursor = self.controller.prompts().get(id).chars().count();
            self.input_mode = InputMode::Editing;
        }
    }

    pub fn stop_editing(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Queue a generation for `scenario`. The run loop spawns it.
    pub fn generate(&mut self, scenario: ScenarioId) {
        let pending = self.controller.invoke(scenario);
        self.output_scroll = 0;
        self.animation_frame = 0;
        self.dispatched.push(pending);
    }

    pub fn take_dispatched(&mut self) -> Vec<PendingGeneration> {
        std::mem::take(&mut self.dispatched)
    }

    pub fn apply_completion(&mut self, completion: Completion) {
        if self.controller.resolve(completion) {
            self.output_scroll = 0;
        }
    }

    /// Tick animation frame (called by Tick event). Keeps running while any
    /// request is unresolved, even after an earlier one filled the slot.
    pub fn tick_animation(&mut self) {
        if self.outcome().is_pending() || self.controller.in_flight() > 0 {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_output_down(&mut self) {
        let max_scroll = self.total_output_lines.saturating_sub(self.output_height);
        self.output_scroll = (self.output_scroll + 1).min(max_scroll);
    }

    pub fn scroll_output_up(&mut self) {
        self.output_scroll = self.output_scroll.saturating_sub(1);
    }

    pub fn scroll_output_half_page_down(&mut self) {
        let half = (self.output_height / 2).max(1);
        let max_scroll = self.total_output_lines.saturating_sub(self.output_height);
        self.output_scroll = (self.output_scroll + half).min(max_scroll);
    }

    pub fn scroll_output_half_page_up(&mut self) {
        let half = (self.output_height / 2).max(1);
        self.output_scroll = self.output_scroll.saturating_sub(half);
    }

    pub fn open_api_key_input(&mut self) {
        self.show_api_key_input = true;
        self.api_key_input.clear();
        self.api_key_input_cursor = 0;
    }

    /// Store the typed key in memory exactly as entered. An empty entry
    /// clears the credential.
    pub fn confirm_api_key(&mut self) {
        let key = std::mem::take(&mut self.api_key_input);
        self.controller.set_credential(Credential::new(key));
        self.api_key_input_cursor = 0;
        self.show_api_key_input = false;
    }

    pub fn cancel_api_key_input(&mut self) {
        self.api_key_input.clear();
        self.api_key_input_cursor = 0;
        self.show_api_key_input = false;
    }

    pub fn has_credential(&self) -> bool {
        !self.controller.credential().is_empty()
    }
}
