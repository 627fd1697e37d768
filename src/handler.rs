use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tempcheck_core::{ScenarioId, Temperature};

use crate::app::{App, FocusPane, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Generation(completion) => app.apply_completion(completion),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.show_api_key_input {
        handle_api_key_input(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Temperature slider
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Char('+') => app.raise_temperature(),
        KeyCode::Char('h') | KeyCode::Left | KeyCode::Char('-') => app.lower_temperature(),
        KeyCode::Char('[') => app.set_temperature(Temperature::MIN),
        KeyCode::Char(']') => app.set_temperature(Temperature::MAX),

        // Focus
        KeyCode::Tab => app.focus_next(),
        KeyCode::BackTab => app.focus_prev(),

        // Generation
        KeyCode::Char('1') => app.generate(ScenarioId::Coder),
        KeyCode::Char('2') => app.generate(ScenarioId::Poet),
        KeyCode::Enter => {
            if let Some(id) = app.focused_scenario() {
                app.generate(id);
            }
        }

        // Prompt editing
        KeyCode::Char('e') | KeyCode::Char('i') => app.start_editing(),

        // Output scrolling
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_output_half_page_down();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_output_half_page_up();
        }
        KeyCode::Char('j') | KeyCode::Down => app.scroll_output_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_output_up(),

        KeyCode::Char('K') => app.open_api_key_input(),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    let Some(id) = app.focused_scenario() else {
        app.stop_editing();
        return;
    };
    let cursor = app.prompt_cursor;
    let prompt = app.controller.prompts_mut().get_mut(id);

    match key.code {
        KeyCode::Esc => app.stop_editing(),
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
            let byte_pos = char_to_byte_index(prompt, cursor);
            prompt.insert(byte_pos, '\n');
            app.prompt_cursor += 1;
        }
        KeyCode::Enter => {
            app.stop_editing();
            app.generate(id);
        }
        KeyCode::Backspace => {
            if cursor > 0 {
                let byte_pos = char_to_byte_index(prompt, cursor - 1);
                prompt.remove(byte_pos);
                app.prompt_cursor -= 1;
            }
        }
        KeyCode::Delete => {
            if cursor < prompt.chars().count() {
                let byte_pos = char_to_byte_index(prompt, cursor);
                prompt.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.prompt_cursor = cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            app.prompt_cursor = (cursor + 1).min(prompt.chars().count());
        }
        KeyCode::Home => {
            app.prompt_cursor = 0;
        }
        KeyCode::End => {
            app.prompt_cursor = prompt.chars().count();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            prompt.clear();
            app.prompt_cursor = 0;
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(prompt, cursor);
            prompt.insert(byte_pos, c);
            app.prompt_cursor += 1;
        }
        _ => {}
    }
}

fn handle_api_key_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_api_key_input(),
        KeyCode::Enter => app.confirm_api_key(),
        KeyCode::Backspace => {
            if app.api_key_input_cursor > 0 {
                app.api_key_input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.api_key_input, app.api_key_input_cursor);
                app.api_key_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.api_key_input_cursor = app.api_key_input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.api_key_input.chars().count();
            app.api_key_input_cursor = (app.api_key_input_cursor + 1).min(char_count);
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.api_key_input, app.api_key_input_cursor);
            app.api_key_input.insert(byte_pos, c);
            app.api_key_input_cursor += 1;
        }
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.show_api_key_input {
        return;
    }

    let x = mouse.column;
    let y = mouse.row;
    let hit = |area: Option<Rect>| area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let target = if hit(app.coder_area) {
                Some(FocusPane::Card(ScenarioId::Coder))
            } else if hit(app.poet_area) {
                Some(FocusPane::Card(ScenarioId::Poet))
            } else if hit(app.slider_area) {
                Some(FocusPane::Slider)
            } else if hit(app.output_area) {
                Some(FocusPane::Output)
            } else {
                None
            };
            if let Some(focus) = target {
                if focus != app.focus {
                    app.stop_editing();
                }
                app.focus = focus;
            }
        }
        MouseEventKind::ScrollDown => {
            if hit(app.slider_area) {
                app.lower_temperature();
            } else if hit(app.output_area) {
                for _ in 0..3 {
                    app.scroll_output_down();
                }
            }
        }
        MouseEventKind::ScrollUp => {
            if hit(app.slider_area) {
                app.raise_temperature();
            } else if hit(app.output_area) {
                for _ in 0..3 {
                    app.scroll_output_up();
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crossterm::event::KeyEventState;
    use std::sync::Arc;
    use tempcheck_core::{
        Credential, GenerationClient, GenerationError, GenerationOutcome, RequestController,
    };

    struct EchoClient;

    #[async_trait]
    impl GenerationClient for EchoClient {
        async fn generate(
            &self,
            prompt: &str,
            temperature: Temperature,
            credential: &Credential,
        ) -> Result<String, GenerationError> {
            if credential.is_empty() {
                return Err(GenerationError::MissingCredential);
            }
            Ok(format!("{prompt} @ {temperature}"))
        }
    }

    fn app() -> App {
        let mut controller = RequestController::new(Arc::new(EchoClient));
        controller.set_credential(Credential::new("key"));
        App::new(controller, "test-model")
    }

    fn press(app: &mut App, code: KeyCode) {
        press_with(app, code, KeyModifiers::NONE);
    }

    fn press_with(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
        let key = KeyEvent {
            code,
            modifiers,
            kind: crossterm::event::KeyEventKind::Press,
            state: KeyEventState::NONE,
        };
        handle_event(app, AppEvent::Key(key)).unwrap();
    }

    #[test]
    fn arrows_move_the_slider_in_tenths() {
        let mut app = app();
        assert_eq!(app.temperature().to_string(), "0.5");
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.temperature().to_string(), "0.7");
        press(&mut app, KeyCode::Left);
        assert_eq!(app.temperature().to_string(), "0.6");
        press(&mut app, KeyCode::Char(']'));
        press(&mut app, KeyCode::Right);
        assert_eq!(app.temperature(), Temperature::MAX);
        press(&mut app, KeyCode::Char('['));
        press(&mut app, KeyCode::Left);
        assert_eq!(app.temperature(), Temperature::MIN);
    }

    #[test]
    fn tab_cycles_focus() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, FocusPane::Card(ScenarioId::Coder));
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, FocusPane::Card(ScenarioId::Poet));
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, FocusPane::Slider);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.focus, FocusPane::Output);
    }

    #[test]
    fn editing_changes_only_the_focused_prompt() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.input_mode, InputMode::Editing);

        press_with(&mut app, KeyCode::Char('u'), KeyModifiers::CONTROL);
        for c in "fizzbuzz".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.controller.prompts().get(ScenarioId::Coder), "fizzbuz");
        assert!(!app.controller.prompts().is_modified(ScenarioId::Poet));
    }

    #[test]
    fn editing_handles_multibyte_text() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('i'));
        press_with(&mut app, KeyCode::Char('u'), KeyModifiers::CONTROL);
        for c in "clichéd".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Home);
        press(&mut app, KeyCode::Delete);
        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.controller.prompts().get(ScenarioId::Poet), "liché");
    }

    #[tokio::test]
    async fn number_keys_dispatch_and_completion_resolves() {
        let mut app = app();
        press(&mut app, KeyCode::Char('1'));
        assert!(app.outcome().is_pending());
        assert_eq!(app.outcome().scenario(), Some(ScenarioId::Coder));

        let mut dispatched = app.take_dispatched();
        assert_eq!(dispatched.len(), 1);
        assert!(app.take_dispatched().is_empty());

        let completion = dispatched.remove(0).await;
        handle_event(&mut app, AppEvent::Generation(completion)).unwrap();

        match app.outcome() {
            GenerationOutcome::Succeeded { text, .. } => assert!(text.ends_with("@ 0.5")),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn enter_on_a_card_generates_for_that_card() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.outcome().scenario(), Some(ScenarioId::Poet));

        // Enter on the slider does nothing
        let mut app = self::app();
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.outcome(), &GenerationOutcome::Idle);
    }

    #[test]
    fn api_key_popup_sets_credential_in_memory() {
        let controller = RequestController::new(Arc::new(EchoClient));
        let mut app = App::new(controller, "test-model");
        assert!(app.show_api_key_input);

        // Keys go to the popup, not the slider
        for c in "AIza-test".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert_eq!(app.temperature().to_string(), "0.5");
        press(&mut app, KeyCode::Enter);

        assert!(!app.show_api_key_input);
        assert!(app.has_credential());
        assert_eq!(app.controller.credential().expose(), "AIza-test");
        assert!(app.api_key_input.is_empty());

        press(&mut app, KeyCode::Char('K'));
        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.controller.credential().expose(), "AIza-test");
    }

    #[test]
    fn api_key_is_kept_as_typed() {
        let controller = RequestController::new(Arc::new(EchoClient));
        let mut app = App::new(controller, "test-model");
        for c in " AIza key ".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.controller.credential().expose(), " AIza key ");
    }

    #[test]
    fn ctrl_c_quits_from_any_mode() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('e'));
        press_with(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }
}
