#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for the firefighter simulation.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, so the adapter depends on macroquad without its default `audio`
//! feature.
//!
//! Each frame the composite buffer is painted into a CPU-side image, uploaded
//! to a single nearest-filtered texture and stretched over the window. The
//! statistics overlay uses Macroquad's immediate-mode UI; all UI-specific calls
//! live inside the local `ui` module.

mod ui;

use self::ui::{draw_stats_overlay, StatsOverlayContext, StatsOverlayResult};
use anyhow::{Context, Result};
use firefighter_core::CellCoord;
use firefighter_rendering::{
    paint_scene, CellPalette, Clock, Color, FrameInput, InputEvent, Key, Modifiers,
    MonotonicClock, PixelSurface, PointerState, Presentation, RenderingBackend, Scene, Viewport,
};
use glam::Vec2;
use macroquad::{
    color::WHITE,
    input::{
        get_char_pressed, get_keys_pressed, is_key_down, is_key_released,
        is_mouse_button_pressed, is_mouse_button_released, is_quit_requested, mouse_position,
        prevent_quit, KeyCode, MouseButton,
    },
    math::Vec2 as MacroquadVec2,
    texture::{DrawTextureParams, FilterMode, Image, Texture2D},
};
use std::time::{Duration, Instant};

/// Tracks UI-sourced interactions so they can be merged with keyboard input on the next frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct OverlayInputState {
    toggle_latched: bool,
}

impl OverlayInputState {
    /// Returns whether the UI requested an overlay toggle and clears the latch
    /// so the action fires only once.
    pub fn take_toggle(&mut self) -> bool {
        let latched = self.toggle_latched;
        self.toggle_latched = false;
        latched
    }

    /// Records that the overlay button requested a toggle this frame.
    pub fn register_toggle(&mut self) {
        self.toggle_latched = true;
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    show_overlay: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Configures whether the statistics overlay is visible at startup.
    #[must_use]
    pub fn with_overlay(mut self, visible: bool) -> Self {
        self.show_overlay = visible;
        self
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct FrameBreakdown {
    frame: Duration,
    simulation: Duration,
    render: Duration,
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    simulation_accum: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    avg_simulation: Duration,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns averages once one second has elapsed.
    fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsMetrics> {
        self.elapsed += breakdown.frame;
        self.frames = self.frames.saturating_add(1);
        self.simulation_accum += breakdown.simulation;
        self.render_accum += breakdown.render;

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let frames = self.frames;
        let metrics = FpsMetrics {
            per_second: frames as f32 / seconds,
            avg_simulation: self.simulation_accum / frames,
            avg_render: self.render_accum / frames,
        };

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.simulation_accum = Duration::ZERO;
        self.render_accum = Duration::ZERO;
        Some(metrics)
    }
}

/// Pixel surface writing into a Macroquad CPU-side image.
struct ImageSurface {
    image: Image,
}

impl PixelSurface for ImageSurface {
    fn size(&self) -> (u32, u32) {
        (
            u32::from(self.image.width),
            u32::from(self.image.height),
        )
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        let (width, height) = self.size();
        if x < width && y < height {
            self.image.set_pixel(x, y, to_macroquad_color(color));
        }
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            show_overlay,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            viewport,
            palette,
            scene,
        } = presentation;

        let (pixel_width, pixel_height) = viewport.pixel_size();
        let image_width =
            u16::try_from(pixel_width).context("grid is too wide to fit in a single texture")?;
        let image_height =
            u16::try_from(pixel_height).context("grid is too tall to fit in a single texture")?;
        let window_width =
            i32::try_from(pixel_width).context("window width exceeds platform limits")?;
        let window_height =
            i32::try_from(pixel_height).context("window height exceeds platform limits")?;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width,
            window_height,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        log::info!(
            "opening {window_width}x{window_height} window for a {}x{} grid",
            viewport.grid_size().width(),
            viewport.grid_size().height()
        );

        macroquad::Window::from_config(config, async move {
            prevent_quit();

            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut surface = ImageSurface {
                image: Image::gen_image_color(image_width, image_height, background),
            };
            let texture = Texture2D::from_image(&surface.image);
            texture.set_filter(FilterMode::Nearest);

            let mut clock = MonotonicClock::start();
            let mut fps_counter = FpsCounter::default();
            let mut pointer = PointerState::default();
            let mut overlay_visible = show_overlay;
            let mut overlay_input = OverlayInputState::default();

            loop {
                let frame_dt = clock.tick();
                let events = poll_input_events(pointer.position);
                for event in &events {
                    pointer.apply(event);
                }

                let screen = Vec2::new(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                let hovered_cell = hovered_cell(&viewport, screen, pointer.position);
                let frame_input = FrameInput {
                    events,
                    pointer,
                    hovered_cell,
                };
                if frame_input.quit_requested() {
                    break;
                }
                if overlay_input.take_toggle() || frame_input.typed('s') {
                    overlay_visible = !overlay_visible;
                }

                let simulation_start = Instant::now();
                update_scene(frame_dt, frame_input, &mut scene);
                let simulation_duration = simulation_start.elapsed();

                let render_start = Instant::now();
                macroquad::window::clear_background(background);
                paint_scene(&scene, &palette, viewport, &mut surface);
                texture.update(&surface.image);
                macroquad::texture::draw_texture_ex(
                    &texture,
                    0.0,
                    0.0,
                    WHITE,
                    DrawTextureParams {
                        dest_size: Some(MacroquadVec2::new(screen.x, screen.y)),
                        ..DrawTextureParams::default()
                    },
                );
                if let Some(cell) = hovered_cell {
                    draw_hover_outline(&scene, &palette, &viewport, screen, cell);
                }

                if overlay_visible {
                    let mut overlay_ui = macroquad::ui::root_ui();
                    let StatsOverlayResult { hide_pressed } = draw_stats_overlay(
                        &mut overlay_ui,
                        StatsOverlayContext {
                            stats: scene.stats,
                            hovered: hovered_cell.and_then(|cell| {
                                scene.cell_at(cell).map(|state| (cell, state))
                            }),
                        },
                    );
                    if hide_pressed {
                        overlay_input.register_toggle();
                    }
                }
                let render_duration = render_start.elapsed();

                let fps_metrics = fps_counter.record_frame(FrameBreakdown {
                    frame: frame_dt,
                    simulation: simulation_duration,
                    render: render_duration,
                });
                if show_fps {
                    if let Some(FpsMetrics {
                        per_second,
                        avg_simulation,
                        avg_render,
                    }) = fps_metrics
                    {
                        log::info!(
                            "FPS: {:.2} | sim: {:>6.2}ms render: {:>6.2}ms",
                            per_second,
                            avg_simulation.as_secs_f64() * 1_000.0,
                            avg_render.as_secs_f64() * 1_000.0,
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }

            log::info!("window closed");
        });

        Ok(())
    }
}

fn poll_input_events(last_pointer: Option<Vec2>) -> Vec<InputEvent> {
    let mut events = Vec::new();

    let (x, y) = mouse_position();
    let position = Vec2::new(x, y);
    if last_pointer != Some(position) {
        events.push(InputEvent::PointerMoved { position });
    }
    if is_mouse_button_pressed(MouseButton::Left) {
        events.push(InputEvent::PointerDown);
    }
    if is_mouse_button_released(MouseButton::Left) {
        events.push(InputEvent::PointerUp);
    }

    let modifiers = Modifiers {
        shift: is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift),
        control: is_key_down(KeyCode::LeftControl) || is_key_down(KeyCode::RightControl),
        alt: is_key_down(KeyCode::LeftAlt) || is_key_down(KeyCode::RightAlt),
    };
    let characters: Vec<char> = std::iter::from_fn(get_char_pressed).collect();
    let mut codes: Vec<KeyCode> = get_keys_pressed().into_iter().collect();
    codes.sort_by_key(|code| *code as u32);
    events.extend(key_down_events(&codes, characters, modifiers));

    for code in [KeyCode::Escape, KeyCode::Enter, KeyCode::Space] {
        if is_key_released(code) {
            events.push(InputEvent::KeyUp {
                key: translate_key(code),
            });
        }
    }

    if is_quit_requested() {
        events.push(InputEvent::QuitRequested);
    }

    events
}

/// Builds one `KeyDown` per pressed key, pairing each character key with the
/// character it produced. Characters left unpaired get their own events.
fn key_down_events(
    codes: &[KeyCode],
    mut characters: Vec<char>,
    modifiers: Modifiers,
) -> Vec<InputEvent> {
    let mut events = Vec::with_capacity(codes.len() + characters.len());
    for &code in codes {
        let key = translate_key(code);
        let character = match key {
            Key::Character(expected) => characters
                .iter()
                .position(|typed| typed.to_ascii_lowercase() == expected)
                .map(|index| characters.remove(index)),
            _ => None,
        };
        events.push(InputEvent::KeyDown {
            key,
            modifiers,
            character,
        });
    }
    events.extend(characters.into_iter().map(|typed| InputEvent::KeyDown {
        key: Key::Character(typed.to_ascii_lowercase()),
        modifiers,
        character: Some(typed),
    }));
    events
}

fn translate_key(code: KeyCode) -> Key {
    let character = match code {
        KeyCode::Escape => return Key::Escape,
        KeyCode::Enter | KeyCode::KpEnter => return Key::Enter,
        KeyCode::Space => return Key::Space,
        KeyCode::A => 'a',
        KeyCode::B => 'b',
        KeyCode::C => 'c',
        KeyCode::D => 'd',
        KeyCode::E => 'e',
        KeyCode::F => 'f',
        KeyCode::G => 'g',
        KeyCode::H => 'h',
        KeyCode::I => 'i',
        KeyCode::J => 'j',
        KeyCode::K => 'k',
        KeyCode::L => 'l',
        KeyCode::M => 'm',
        KeyCode::N => 'n',
        KeyCode::O => 'o',
        KeyCode::P => 'p',
        KeyCode::Q => 'q',
        KeyCode::R => 'r',
        KeyCode::S => 's',
        KeyCode::T => 't',
        KeyCode::U => 'u',
        KeyCode::V => 'v',
        KeyCode::W => 'w',
        KeyCode::X => 'x',
        KeyCode::Y => 'y',
        KeyCode::Z => 'z',
        KeyCode::Key0 => '0',
        KeyCode::Key1 => '1',
        KeyCode::Key2 => '2',
        KeyCode::Key3 => '3',
        KeyCode::Key4 => '4',
        KeyCode::Key5 => '5',
        KeyCode::Key6 => '6',
        KeyCode::Key7 => '7',
        KeyCode::Key8 => '8',
        KeyCode::Key9 => '9',
        _ => return Key::Other,
    };
    Key::Character(character)
}

/// Converts a window position into grid pixels, undoing the stretch applied
/// when the texture is drawn over a resized window.
fn window_to_grid_pixels(viewport: &Viewport, screen: Vec2, position: Vec2) -> Option<Vec2> {
    let (pixel_width, pixel_height) = viewport.pixel_size();
    if screen.x <= f32::EPSILON || screen.y <= f32::EPSILON {
        return None;
    }
    let scale = Vec2::new(pixel_width as f32 / screen.x, pixel_height as f32 / screen.y);
    Some(position * scale)
}

fn hovered_cell(viewport: &Viewport, screen: Vec2, pointer: Option<Vec2>) -> Option<CellCoord> {
    let position = pointer?;
    let grid_position = window_to_grid_pixels(viewport, screen, position)?;
    viewport.cell_at(grid_position)
}

fn draw_hover_outline(
    scene: &Scene,
    palette: &CellPalette,
    viewport: &Viewport,
    screen: Vec2,
    cell: CellCoord,
) {
    let Some(state) = scene.cell_at(cell) else {
        return;
    };
    let (pixel_width, pixel_height) = viewport.pixel_size();
    if pixel_width == 0 || pixel_height == 0 {
        return;
    }
    let zoom = viewport.zoom() as f32;
    let step = Vec2::new(
        screen.x / pixel_width as f32 * zoom,
        screen.y / pixel_height as f32 * zoom,
    );
    let color = to_macroquad_color(palette.color_for(state).lighten(0.5));
    macroquad::shapes::draw_rectangle_lines(
        cell.column() as f32 * step.x,
        cell.row() as f32 * step.y,
        step.x,
        step.y,
        1.0_f32.max(step.x.min(step.y) * 0.2),
        color,
    );
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
