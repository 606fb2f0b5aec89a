#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for firefighter adapters.

use anyhow::Result as AnyResult;
use firefighter_core::{CellCoord, CellState, CompositeView, GridSize};
use glam::Vec2;
use std::{
    error::Error,
    fmt,
    time::{Duration, Instant},
};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Creates an opaque color from a packed `0xRRGGBB` value.
    #[must_use]
    pub const fn from_rgb_hex(rgb: u32) -> Self {
        Self::from_rgb_u8(
            ((rgb >> 16) & 0xff) as u8,
            ((rgb >> 8) & 0xff) as u8,
            (rgb & 0xff) as u8,
        )
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Colors used to present each cell state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellPalette {
    /// Color of cells that are neither burning nor protected.
    pub unprotected: Color,
    /// Color of burning cells.
    pub burning: Color,
    /// Color of protected cells.
    pub protected: Color,
    /// Color of cells occupied by firefighters.
    pub firefighter: Color,
}

impl Default for CellPalette {
    fn default() -> Self {
        Self {
            unprotected: Color::from_rgb_hex(0xffff00),
            burning: Color::from_rgb_hex(0xff0000),
            protected: Color::from_rgb_hex(0x00ff00),
            firefighter: Color::from_rgb_hex(0x0000ff),
        }
    }
}

impl CellPalette {
    /// Color used for the provided cell state.
    #[must_use]
    pub const fn color_for(&self, state: CellState) -> Color {
        match state {
            CellState::Unprotected => self.unprotected,
            CellState::Burning => self.burning,
            CellState::Protected => self.protected,
            CellState::Firefighter => self.firefighter,
        }
    }
}

/// Keys the adapters distinguish when translating keyboard input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Escape key.
    Escape,
    /// Return or keypad enter.
    Enter,
    /// Space bar.
    Space,
    /// Alphanumeric key, lowercased.
    Character(char),
    /// Any key without a dedicated variant.
    Other,
}

/// Modifier keys held while a key event was produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    /// Either shift key.
    pub shift: bool,
    /// Either control key.
    pub control: bool,
    /// Either alt key.
    pub alt: bool,
}

/// Discrete input event captured by an adapter during a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// Pointer moved to the provided window position in pixels.
    PointerMoved {
        /// Pointer location relative to the top-left window corner.
        position: Vec2,
    },
    /// Primary pointer button was pressed.
    PointerDown,
    /// Primary pointer button was released.
    PointerUp,
    /// Key was pressed.
    KeyDown {
        /// Key that was pressed.
        key: Key,
        /// Modifiers held at the time.
        modifiers: Modifiers,
        /// Text produced by the key press, if any.
        character: Option<char>,
    },
    /// Key was released.
    KeyUp {
        /// Key that was released.
        key: Key,
    },
    /// The window system asked the application to close.
    QuitRequested,
}

/// Last known pointer position and button state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    /// Pointer location in window pixels, once it has been observed.
    pub position: Option<Vec2>,
    /// Whether the primary button is currently held.
    pub pressed: bool,
}

impl PointerState {
    /// Folds an input event into the pointer state.
    pub fn apply(&mut self, event: &InputEvent) {
        match event {
            InputEvent::PointerMoved { position } => self.position = Some(*position),
            InputEvent::PointerDown => self.pressed = true,
            InputEvent::PointerUp => self.pressed = false,
            _ => {}
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Events captured since the previous frame, in arrival order.
    pub events: Vec<InputEvent>,
    /// Pointer state after applying `events`.
    pub pointer: PointerState,
    /// Grid cell beneath the pointer, if it hovers over the grid.
    pub hovered_cell: Option<CellCoord>,
}

impl FrameInput {
    /// Reports whether the frame asked the application to exit.
    ///
    /// Both an explicit window close and a released Escape key count.
    #[must_use]
    pub fn quit_requested(&self) -> bool {
        self.events.iter().any(|event| {
            matches!(
                event,
                InputEvent::QuitRequested
                    | InputEvent::KeyUp {
                        key: Key::Escape
                    }
            )
        })
    }

    /// Reports whether a key producing `character` was pressed this frame.
    #[must_use]
    pub fn typed(&self, character: char) -> bool {
        self.events.iter().any(|event| {
            matches!(
                event,
                InputEvent::KeyDown {
                    character: Some(typed),
                    ..
                } if typed.eq_ignore_ascii_case(&character)
            )
        })
    }

    /// Reports whether the primary pointer button went down this frame.
    #[must_use]
    pub fn pointer_pressed(&self) -> bool {
        self.events
            .iter()
            .any(|event| matches!(event, InputEvent::PointerDown))
    }
}

/// Mapping between grid cells and window pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    size: GridSize,
    zoom: u32,
}

impl Viewport {
    /// Creates a viewport drawing each cell as a `zoom` x `zoom` pixel square.
    pub fn new(size: GridSize, zoom: u32) -> Result<Self, RenderingError> {
        if zoom == 0 {
            return Err(RenderingError::InvalidZoom { zoom });
        }
        Ok(Self { size, zoom })
    }

    /// Dimensions of the presented grid.
    #[must_use]
    pub const fn grid_size(&self) -> GridSize {
        self.size
    }

    /// Pixels per cell edge.
    #[must_use]
    pub const fn zoom(&self) -> u32 {
        self.zoom
    }

    /// Window dimensions in pixels required to show the whole grid.
    #[must_use]
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.size.width().saturating_mul(self.zoom),
            self.size.height().saturating_mul(self.zoom),
        )
    }

    /// Cell under the provided window position, if any.
    #[must_use]
    pub fn cell_at(&self, position: Vec2) -> Option<CellCoord> {
        if !position.is_finite() || position.x < 0.0 || position.y < 0.0 {
            return None;
        }
        let cell = (position / self.zoom as f32).floor();
        let cell = CellCoord::new(cell.x as u32, cell.y as u32);
        self.size.contains(cell).then_some(cell)
    }
}

/// Statistics presented alongside the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SceneStats {
    /// Most recently started turn.
    pub turn: u64,
    /// Cells that are neither burning nor protected.
    pub unprotected: usize,
    /// Cells that are burning.
    pub burning: usize,
    /// Cells that are protected.
    pub protected: usize,
    /// Cells occupied by firefighters.
    pub firefighters: usize,
    /// Whether the simulation has frozen.
    pub frozen: bool,
}

/// Snapshot of the composite buffer handed to backends each frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    size: GridSize,
    cells: Vec<CellState>,
    /// Statistics shown by the overlay.
    pub stats: SceneStats,
}

impl Scene {
    /// Creates a scene of the provided size with every cell unprotected.
    #[must_use]
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            cells: vec![CellState::Unprotected; size.cell_count()],
            stats: SceneStats::default(),
        }
    }

    /// Dimensions of the presented grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Copies the composite buffer into the scene, reusing its allocation.
    pub fn refresh(&mut self, composite: CompositeView<'_>, stats: SceneStats) {
        self.size = composite.size();
        self.cells.clear();
        self.cells.extend_from_slice(composite.cells());
        self.stats = stats;
    }

    /// State of the provided cell, if it is in bounds.
    #[must_use]
    pub fn cell_at(&self, cell: CellCoord) -> Option<CellState> {
        CompositeView::new(&self.cells, self.size).state(cell)
    }

    /// Read-only view over the scene cells.
    #[must_use]
    pub fn view(&self) -> CompositeView<'_> {
        CompositeView::new(&self.cells, self.size)
    }
}

/// Write-only pixel target.
pub trait PixelSurface {
    /// Dimensions of the surface in pixels.
    fn size(&self) -> (u32, u32);

    /// Writes a single pixel. Writes outside the surface are ignored.
    fn set_pixel(&mut self, x: u32, y: u32, color: Color);
}

/// In-memory pixel surface.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl FrameBuffer {
    /// Allocates a buffer filled with `clear`.
    #[must_use]
    pub fn new(width: u32, height: u32, clear: Color) -> Self {
        let count = GridSize::new(width, height).cell_count();
        Self {
            width,
            height,
            pixels: vec![clear; count],
        }
    }

    /// Color stored at the provided pixel.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        GridSize::new(self.width, self.height)
            .index(CellCoord::new(x, y))
            .and_then(|index| self.pixels.get(index).copied())
    }
}

impl PixelSurface for FrameBuffer {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        let index = GridSize::new(self.width, self.height).index(CellCoord::new(x, y));
        if let Some(slot) = index.and_then(|index| self.pixels.get_mut(index)) {
            *slot = color;
        }
    }
}

/// Paints every cell of `scene` as a `zoom` x `zoom` square onto `surface`.
pub fn paint_scene<S>(scene: &Scene, palette: &CellPalette, viewport: Viewport, surface: &mut S)
where
    S: PixelSurface + ?Sized,
{
    let zoom = viewport.zoom();
    for (cell, state) in scene.view().iter() {
        let color = palette.color_for(state);
        let left = cell.column().saturating_mul(zoom);
        let top = cell.row().saturating_mul(zoom);
        for y in top..top.saturating_add(zoom) {
            for x in left..left.saturating_add(zoom) {
                surface.set_pixel(x, y, color);
            }
        }
    }
}

/// Source of frame deltas.
pub trait Clock {
    /// Time elapsed since the previous call.
    fn tick(&mut self) -> Duration;
}

/// Clock backed by the operating system's monotonic timer.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    last: Instant,
}

impl MonotonicClock {
    /// Starts the clock at the current instant.
    #[must_use]
    pub fn start() -> Self {
        Self {
            last: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        elapsed
    }
}

/// Clock that advances by a fixed step on every tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ManualClock {
    step: Duration,
    elapsed: Duration,
}

impl ManualClock {
    /// Creates a clock advancing by `step` per tick.
    #[must_use]
    pub const fn new(step: Duration) -> Self {
        Self {
            step,
            elapsed: Duration::ZERO,
        }
    }

    /// Total time reported so far.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl Clock for ManualClock {
    fn tick(&mut self) -> Duration {
        self.elapsed = self.elapsed.saturating_add(self.step);
        self.step
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Mapping between cells and window pixels.
    pub viewport: Viewport,
    /// Colors used for each cell state.
    pub palette: CellPalette,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, viewport: Viewport, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            viewport,
            palette: CellPalette::default(),
            scene,
        }
    }
}

/// Rendering backend capable of presenting firefighter scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the real frame delta,
    /// per-frame input captured by the adapter, and may mutate the scene before
    /// it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// Zoom must be positive to avoid a zero-sized cell.
    InvalidZoom {
        /// Provided zoom that failed validation.
        zoom: u32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidZoom { zoom } => {
                write!(f, "zoom must be positive (received {zoom})")
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_unpack_channels() {
        assert_eq!(Color::from_rgb_hex(0xff0000), Color::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(Color::from_rgb_hex(0x00ff00), Color::from_rgb_u8(0, 255, 0));
    }

    #[test]
    fn default_palette_distinguishes_every_state() {
        let palette = CellPalette::default();
        let states = [
            CellState::Unprotected,
            CellState::Burning,
            CellState::Protected,
            CellState::Firefighter,
        ];
        for (index, first) in states.iter().enumerate() {
            for second in &states[index + 1..] {
                assert_ne!(palette.color_for(*first), palette.color_for(*second));
            }
        }
        assert_eq!(
            palette.color_for(CellState::Burning),
            Color::from_rgb_u8(255, 0, 0)
        );
    }

    #[test]
    fn viewport_rejects_zero_zoom_without_panicking() {
        let error = Viewport::new(GridSize::new(4, 4), 0).expect_err("zero zoom must be rejected");

        assert_eq!(error, RenderingError::InvalidZoom { zoom: 0 });
        assert_eq!(error.to_string(), "zoom must be positive (received 0)");
    }

    #[test]
    fn viewport_maps_pixels_to_cells() {
        let viewport = Viewport::new(GridSize::new(10, 5), 3).expect("valid zoom");

        assert_eq!(viewport.pixel_size(), (30, 15));
        assert_eq!(
            viewport.cell_at(Vec2::new(0.0, 0.0)),
            Some(CellCoord::new(0, 0))
        );
        assert_eq!(
            viewport.cell_at(Vec2::new(29.9, 14.2)),
            Some(CellCoord::new(9, 4))
        );
        assert_eq!(viewport.cell_at(Vec2::new(30.0, 2.0)), None);
        assert_eq!(viewport.cell_at(Vec2::new(-0.5, 2.0)), None);
    }

    #[test]
    fn paint_scene_fills_zoomed_squares() {
        let size = GridSize::new(2, 1);
        let cells = [CellState::Burning, CellState::Firefighter];
        let mut scene = Scene::new(size);
        scene.refresh(CompositeView::new(&cells, size), SceneStats::default());
        let viewport = Viewport::new(size, 2).expect("valid zoom");
        let palette = CellPalette::default();
        let (width, height) = viewport.pixel_size();
        let mut buffer = FrameBuffer::new(width, height, Color::new(0.0, 0.0, 0.0, 1.0));

        paint_scene(&scene, &palette, viewport, &mut buffer);

        for y in 0..2 {
            assert_eq!(buffer.pixel(0, y), Some(palette.burning));
            assert_eq!(buffer.pixel(1, y), Some(palette.burning));
            assert_eq!(buffer.pixel(2, y), Some(palette.firefighter));
            assert_eq!(buffer.pixel(3, y), Some(palette.firefighter));
        }
        assert_eq!(buffer.pixel(4, 0), None);
    }

    #[test]
    fn frame_buffer_ignores_out_of_bounds_writes() {
        let clear = Color::new(0.0, 0.0, 0.0, 1.0);
        let mut buffer = FrameBuffer::new(2, 2, clear);

        buffer.set_pixel(2, 0, Color::from_rgb_hex(0xffffff));
        buffer.set_pixel(0, 5, Color::from_rgb_hex(0xffffff));

        assert_eq!(buffer.size(), (2, 2));
        assert!((0..2).all(|y| (0..2).all(|x| buffer.pixel(x, y) == Some(clear))));
    }

    #[test]
    fn quit_is_requested_by_close_or_escape_release() {
        let escape = FrameInput {
            events: vec![InputEvent::KeyUp { key: Key::Escape }],
            ..FrameInput::default()
        };
        let close = FrameInput {
            events: vec![InputEvent::QuitRequested],
            ..FrameInput::default()
        };
        let typing = FrameInput {
            events: vec![InputEvent::KeyDown {
                key: Key::Character('s'),
                modifiers: Modifiers::default(),
                character: Some('S'),
            }],
            ..FrameInput::default()
        };

        assert!(escape.quit_requested());
        assert!(close.quit_requested());
        assert!(!typing.quit_requested());
        assert!(typing.typed('s'));
    }

    #[test]
    fn pointer_state_tracks_latest_events() {
        let mut pointer = PointerState::default();
        for event in [
            InputEvent::PointerMoved {
                position: Vec2::new(4.0, 9.0),
            },
            InputEvent::PointerDown,
        ] {
            pointer.apply(&event);
        }
        assert_eq!(pointer.position, Some(Vec2::new(4.0, 9.0)));
        assert!(pointer.pressed);

        pointer.apply(&InputEvent::PointerUp);
        assert!(!pointer.pressed);
    }

    #[test]
    fn manual_clock_reports_fixed_steps() {
        let mut clock = ManualClock::new(Duration::from_millis(16));
        assert_eq!(clock.tick(), Duration::from_millis(16));
        assert_eq!(clock.tick(), Duration::from_millis(16));
        assert_eq!(clock.elapsed(), Duration::from_millis(32));
    }

    #[test]
    fn scene_refresh_copies_composite_and_stats() {
        let size = GridSize::new(2, 2);
        let cells = [
            CellState::Unprotected,
            CellState::Burning,
            CellState::Protected,
            CellState::Firefighter,
        ];
        let stats = SceneStats {
            turn: 3,
            burning: 1,
            ..SceneStats::default()
        };
        let mut scene = Scene::new(size);

        scene.refresh(CompositeView::new(&cells, size), stats);

        assert_eq!(scene.cell_at(CellCoord::new(1, 0)), Some(CellState::Burning));
        assert_eq!(scene.cell_at(CellCoord::new(2, 0)), None);
        assert_eq!(scene.stats, stats);
    }
}
