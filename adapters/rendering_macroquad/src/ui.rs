//! Immediate-mode UI helpers for the Macroquad rendering backend.
//!
//! This module hosts all uses of `macroquad::ui` so the rest of the adapter can
//! remain agnostic of Macroquad's UI types.

use firefighter_core::{CellCoord, CellState};
use firefighter_rendering::SceneStats;
use macroquad::{
    color::{Color, WHITE},
    math::{RectOffset, Vec2},
    ui::{hash, Ui},
};

/// Outcome of rendering the statistics overlay for the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct StatsOverlayResult {
    /// Whether the hide button was pressed during this frame.
    pub hide_pressed: bool,
}

/// Data shown by the statistics overlay.
#[derive(Clone, Copy, Debug)]
pub(crate) struct StatsOverlayContext {
    /// Turn and census figures for the current scene.
    pub stats: SceneStats,
    /// Cell beneath the pointer together with its state.
    pub hovered: Option<(CellCoord, CellState)>,
}

/// Renders the statistics overlay in the top-left corner of the window.
pub(crate) fn draw_stats_overlay(ui: &mut Ui, context: StatsOverlayContext) -> StatsOverlayResult {
    let background = Color::from_rgba(24, 24, 24, 200);
    let mut skin = ui.default_skin();

    skin.window_style = ui
        .style_builder()
        .color(background)
        .color_hovered(background)
        .color_clicked(background)
        .color_inactive(background)
        .text_color(WHITE)
        .margin(RectOffset::new(12.0, 12.0, 12.0, 12.0))
        .build();
    skin.label_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .margin(RectOffset::new(0.0, 0.0, 2.0, 2.0))
        .build();
    skin.button_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .color(Color::from_rgba(70, 70, 70, 255))
        .color_hovered(Color::from_rgba(96, 96, 96, 255))
        .color_clicked(Color::from_rgba(56, 56, 56, 255))
        .margin(RectOffset::new(0.0, 0.0, 6.0, 6.0))
        .build();

    ui.push_skin(&skin);

    let mut hide_pressed = false;
    let lines = overlay_lines(&context);
    let origin = Vec2::new(8.0, 8.0);
    let size = Vec2::new(220.0, 196.0);
    let _ = ui.window(hash!("stats_overlay"), origin, size, |ui| {
        for line in &lines {
            ui.label(None, line);
        }
        hide_pressed = ui.button(None, "Hide (S)");
    });

    ui.pop_skin();

    StatsOverlayResult { hide_pressed }
}

fn overlay_lines(context: &StatsOverlayContext) -> Vec<String> {
    let stats = context.stats;
    let status = if stats.frozen {
        "Contained"
    } else {
        "Spreading"
    };
    let hovered = match context.hovered {
        Some((cell, state)) => format!(
            "Cell ({}, {}): {}",
            cell.column(),
            cell.row(),
            state_label(state)
        ),
        None => "Cell: -".to_owned(),
    };

    vec![
        format!("Turn: {}", stats.turn),
        format!("Status: {status}"),
        format!("Burning: {}", stats.burning),
        format!("Protected: {}", stats.protected),
        format!("Firefighters: {}", stats.firefighters),
        format!("Unprotected: {}", stats.unprotected),
        hovered,
    ]
}

const fn state_label(state: CellState) -> &'static str {
    match state {
        CellState::Unprotected => "unprotected",
        CellState::Burning => "burning",
        CellState::Protected => "protected",
        CellState::Firefighter => "firefighter",
    }
}
