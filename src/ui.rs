use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};
use tempcheck_core::{
    classify, is_recommended, Accent, GenerationOutcome, Rgb, ScenarioId, Temperature, Zone,
};

use crate::app::{App, FocusPane, InputMode};

/// Glyph drawn next to a scenario title.
pub trait ScenarioIcon {
    fn icon(&self) -> &'static str;
}

impl ScenarioIcon for ScenarioId {
    fn icon(&self) -> &'static str {
        match self {
            ScenarioId::Coder => "</>",
            ScenarioId::Poet => "✎",
        }
    }
}

fn rgb(color: Rgb) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

fn accent_color(accent: Accent) -> Color {
    match accent {
        Accent::Blue => Color::Rgb(96, 165, 250),
        Accent::Orange => Color::Rgb(251, 146, 60),
    }
}

fn zone_color(zone: Zone) -> Color {
    match zone {
        Zone::Coder => Color::Rgb(147, 197, 253),
        Zone::Balanced => Color::Rgb(216, 180, 254),
        Zone::Poet => Color::Rgb(253, 186, 116),
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, slider, cards, output, footer
    let [header_area, slider_area, cards_area, output_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(7),
        Constraint::Length(12),
        Constraint::Min(5),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_slider(app, frame, slider_area);
    render_cards(app, frame, cards_area);
    render_output(app, frame, output_area);
    render_footer(app, frame, footer_area);

    if app.show_api_key_input {
        render_api_key_input(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let key_indicator = if app.has_credential() {
        Span::styled(" [key set]", Style::default().fg(Color::Green))
    } else {
        Span::styled(" [no API key - press K]", Style::default().fg(Color::Red))
    };

    let title = Line::from(vec![
        Span::styled(" TempCheck ", Style::default().fg(Color::Magenta).bold()),
        Span::styled(
            "The Coder vs. The Poet: Visualizing LLM Temperature ",
            Style::default().fg(Color::Gray),
        ),
        Span::styled(app.model.clone(), Style::default().fg(Color::Cyan)),
        key_indicator,
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::Black));
    frame.render_widget(header, area);
}

fn focus_border(focused: bool, color: Color) -> Style {
    if focused {
        Style::default().fg(color)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn render_slider(app: &mut App, frame: &mut Frame, area: Rect) {
    app.slider_area = Some(area);

    let temperature = app.temperature();
    let classification = classify(temperature);
    let color = rgb(classification.color);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(focus_border(app.focus == FocusPane::Slider, color))
        .title(" Temperature Control ")
        .title(
            Line::from(Span::styled(
                format!(" {temperature} "),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
            .right_aligned(),
        );
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [hint_area, gauge_area, labels_area, _, zone_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    frame.render_widget(
        Paragraph::new("Controls randomness (0.0 = Deterministic, 2.0 = Chaotic)")
            .style(Style::default().fg(Color::DarkGray)),
        hint_area,
    );

    let ratio = f64::from(temperature.tenths()) / f64::from(Temperature::MAX.tenths());
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color).bg(Color::Rgb(51, 65, 85)))
        .ratio(ratio)
        .label(Span::styled(
            temperature.to_string(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ));
    frame.render_widget(gauge, gauge_area);

    let [left, middle, right] = Layout::horizontal([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .areas(labels_area);
    frame.render_widget(
        Paragraph::new("STRICT LOGIC (0.0)").fg(accent_color(Accent::Blue)),
        left,
    );
    frame.render_widget(
        Paragraph::new("BALANCED (1.0)")
            .fg(zone_color(Zone::Balanced))
            .alignment(Alignment::Center),
        middle,
    );
    frame.render_widget(
        Paragraph::new("WILD CREATIVITY (2.0)")
            .fg(accent_color(Accent::Orange))
            .alignment(Alignment::Right),
        right,
    );

    let zone = classification.zone;
    frame.render_widget(
        Paragraph::new(Span::styled(
            format!(" {} ", zone.label()),
            Style::default().fg(zone_color(zone)).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        zone_area,
    );
}

fn render_cards(app: &mut App, frame: &mut Frame, area: Rect) {
    let [coder_area, poet_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);

    app.coder_area = Some(coder_area);
    app.poet_area = Some(poet_area);

    render_card(app, frame, coder_area, ScenarioId::Coder);
    render_card(app, frame, poet_area, ScenarioId::Poet);
}

fn render_card(app: &App, frame: &mut Frame, area: Rect, id: ScenarioId) {
    let scenario = id.scenario();
    let accent = accent_color(scenario.accent);
    let temperature = app.temperature();
    let recommended = is_recommended(id, temperature);
    let focused = app.focus == FocusPane::Card(id);
    let editing = focused && app.input_mode == InputMode::Editing;

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(if recommended { BorderType::Thick } else { BorderType::Rounded })
        .border_style(if recommended || focused {
            Style::default().fg(accent)
        } else {
            Style::default().fg(Color::DarkGray)
        })
        .title(Line::from(vec![
            Span::styled(format!(" {} ", id.icon()), Style::default().fg(accent)),
            Span::styled(scenario.title, Style::default().fg(Color::White).bold()),
            Span::styled(format!(" · {} ", scenario.subtitle), Style::default().fg(accent)),
        ]));
    if recommended {
        block = block.title_bottom(
            Line::from(Span::styled(
                format!(" RECOMMENDED FOR TEMP {temperature} "),
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            ))
            .right_aligned(),
        );
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [label_area, prompt_area, description_area, button_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(inner);

    let label = if editing {
        "PROMPT TEMPLATE (editing - Enter to generate, Esc to stop)"
    } else {
        "PROMPT TEMPLATE (EDITABLE - press e)"
    };
    let mut label_spans = vec![Span::styled(label, Style::default().fg(Color::DarkGray).bold())];
    if app.controller.prompts().is_modified(id) {
        label_spans.push(Span::styled(" · edited", Style::default().fg(accent)));
    }
    frame.render_widget(Paragraph::new(Line::from(label_spans)), label_area);

    let prompt = app.controller.prompts().get(id);
    let prompt_style = if editing {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC)
    };
    let prompt_text = if prompt.is_empty() && !editing {
        Text::styled("Enter your prompt here...", Style::default().fg(Color::DarkGray))
    } else {
        Text::styled(prompt.to_string(), prompt_style)
    };
    frame.render_widget(
        Paragraph::new(prompt_text).wrap(Wrap { trim: false }),
        prompt_area,
    );

    if editing && prompt_area.width > 0 {
        // Place the cursor assuming character wrapping at the panel width
        let before: String = prompt.chars().take(app.prompt_cursor).collect();
        let (mut row, mut col) = (0u16, 0u16);
        for c in before.chars() {
            if c == '\n' || col + 1 > prompt_area.width {
                row += 1;
                col = 0;
                if c == '\n' {
                    continue;
                }
            }
            col += 1;
        }
        if row < prompt_area.height {
            frame.set_cursor_position((prompt_area.x + col, prompt_area.y + row));
        }
    }

    frame.render_widget(
        Paragraph::new(scenario.description)
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true }),
        description_area,
    );

    let pending_here = app.controller.is_generating(id);
    let key_hint = match id {
        ScenarioId::Coder => "1",
        ScenarioId::Poet => "2",
    };
    let button = if pending_here {
        Line::from(Span::styled(
            " ⟳ Generating... ",
            Style::default().fg(Color::White).bg(Color::DarkGray),
        ))
    } else {
        Line::from(vec![
            Span::styled(format!(" {key_hint} "), Style::default().bg(Color::DarkGray).fg(Color::White)),
            Span::styled(
                format!(" {} ", scenario.button_label),
                Style::default().fg(Color::Black).bg(accent).bold(),
            ),
        ])
    };
    frame.render_widget(
        Paragraph::new(button).alignment(Alignment::Center),
        button_area,
    );
}

/// Rows the paragraph occupies at `width`, using ratatui's own word wrapping
/// and display widths.
fn wrapped_line_count(paragraph: &Paragraph, width: u16) -> u16 {
    paragraph
        .line_count(width.max(1))
        .min(usize::from(u16::MAX)) as u16
}

fn in_flight_label(count: usize) -> String {
    if count == 1 {
        "1 request still in flight".to_string()
    } else {
        format!("{count} requests still in flight")
    }
}

fn render_output(app: &mut App, frame: &mut Frame, area: Rect) {
    app.output_area = Some(area);

    let outcome = app.outcome().clone();

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(focus_border(app.focus == FocusPane::Output, Color::Magenta))
        .title(Line::from(vec![
            Span::styled(" ● ", Style::default().fg(Color::Red)),
            Span::styled("● ", Style::default().fg(Color::Yellow)),
            Span::styled("● ", Style::default().fg(Color::Green)),
            Span::styled("Terminal Output ", Style::default().fg(Color::Gray).bold()),
        ]));

    if let (Some(badge), Some(id)) = (outcome.badge(), outcome.scenario()) {
        let scenario = id.scenario();
        block = block.title(
            Line::from(Span::styled(
                format!(" {} · {} ", scenario.title, badge),
                Style::default().fg(accent_color(scenario.accent)),
            ))
            .right_aligned(),
        );
    }

    // Another request can still be running after an earlier one filled the slot
    let in_flight = app.controller.in_flight();
    if in_flight > 0 && !outcome.is_pending() {
        let dots = ".".repeat(usize::from(app.animation_frame) + 1);
        block = block.title_bottom(
            Line::from(Span::styled(
                format!(" ⟳ {}{dots} ", in_flight_label(in_flight)),
                Style::default().fg(Color::Magenta),
            ))
            .right_aligned(),
        );
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    app.output_height = inner.height;

    let body = match &outcome {
        GenerationOutcome::Idle => {
            app.total_output_lines = 0;
            Paragraph::new(Span::styled(
                "Select a scenario above to generate output...",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ))
            .alignment(Alignment::Center)
        }
        GenerationOutcome::Pending { temperature, .. } => {
            app.total_output_lines = 0;
            let dots = ".".repeat(usize::from(app.animation_frame) + 1);
            let mut lines = vec![Line::from(Span::styled(
                format!("Thinking at {temperature} temperature{dots}"),
                Style::default().fg(Color::Magenta),
            ))];
            if in_flight > 1 {
                lines.push(Line::from(Span::styled(
                    in_flight_label(in_flight),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            Paragraph::new(lines).alignment(Alignment::Center)
        }
        GenerationOutcome::Failed { message, .. } => {
            let paragraph =
                Paragraph::new(Span::styled(message.clone(), Style::default().fg(Color::Red)))
                    .wrap(Wrap { trim: false });
            app.total_output_lines = wrapped_line_count(&paragraph, inner.width);
            paragraph
        }
        GenerationOutcome::Succeeded {
            text, completed_at, ..
        } => {
            let mut content = Text::styled(text.clone(), Style::default().fg(Color::Gray));
            content.push_line(Line::default());
            content.push_line(Line::from(Span::styled(
                format!("completed {}", completed_at.format("%H:%M:%S")),
                Style::default().fg(Color::DarkGray),
            )));
            let paragraph = Paragraph::new(content).wrap(Wrap { trim: false });
            app.total_output_lines = wrapped_line_count(&paragraph, inner.width);
            paragraph.scroll((app.output_scroll, 0))
        }
    };

    frame.render_widget(body, inner);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " EDIT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    let pairs: &[(&str, &str)] = match app.input_mode {
        InputMode::Editing => &[
            (" Enter ", " generate "),
            (" Alt+Enter ", " newline "),
            (" Ctrl+u ", " clear "),
            (" Esc ", " done "),
        ],
        InputMode::Normal => &[
            (" h/l ", " temp "),
            (" Tab ", " focus "),
            (" e ", " edit "),
            (" 1/2 ", " generate "),
            (" j/k ", " scroll "),
            (" K ", " API key "),
            (" q ", " quit "),
        ],
    };
    for (key, label) in pairs {
        hints.push(Span::styled(*key, key_style));
        hints.push(Span::styled(*label, label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

fn render_api_key_input(app: &App, frame: &mut Frame, area: Rect) {
    // Calculate popup size and position (centered)
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 8;

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height).intersection(area);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Gemini API Key ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let lines = vec![
        Line::from(Span::styled(
            "Paste your API key. Enter to use it, Esc to cancel.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Held in memory for this session only; never saved.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::default(),
        Line::from(Span::styled(
            "•".repeat(app.api_key_input.chars().count()),
            Style::default().fg(Color::Cyan),
        )),
        Line::default(),
        Line::from(Span::styled(
            "Get a key from Google AI Studio: https://aistudio.google.com/app/apikey",
            Style::default().fg(Color::Magenta),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

    // Show cursor on the masked input line
    if inner.height > 3 {
        let cursor_x = (app.api_key_input_cursor as u16).min(inner.width.saturating_sub(1));
        frame.set_cursor_position((inner.x + cursor_x, inner.y + 3));
    }
}
