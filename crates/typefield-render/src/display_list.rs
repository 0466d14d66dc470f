//! Display-list renderer.
//!
//! Builds a flat list of backend-neutral [`DrawCommand`]s for a frame:
//! grid, guides, text, links, selection feedback, then screen-space overlays
//! such as the text box. World-space commands are mapped to the screen with
//! [`DisplayList::transform`].

use crate::renderer::{GridStyle, RenderContext, RenderResult, Renderer, RendererError};
use kurbo::{Affine, BezPath, Point, Rect, Shape};
use peniko::Color;
use typefield_core::assistant::AssistantStatus;
use typefield_core::bounds::bounds_of;
use typefield_core::editor::Editor;
use typefield_core::links::resolve_link;
use typefield_core::modes::Mode;
use typefield_core::objects::{CanvasObject, LINE_HEIGHT_FACTOR, TextObject};

/// Upper bound on grid rows/columns per frame.
const MAX_GRID_STEPS: usize = 4096;
/// Link stroke width in world units.
const LINK_WIDTH: f64 = 1.5;
/// Gap between an object and its selection outline, in screen pixels.
const SELECTION_PAD: f64 = 3.0;

/// Coordinate space of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Space {
    /// Mapped through the camera transform.
    World,
    /// Already in screen pixels.
    Screen,
}

/// One drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Fill {
        space: Space,
        path: BezPath,
        color: Color,
    },
    Stroke {
        space: Space,
        path: BezPath,
        color: Color,
        /// Width in the command's own space.
        width: f64,
        dashed: bool,
    },
    /// A single line of text; `origin` is the baseline-left point.
    Text {
        space: Space,
        origin: Point,
        text: String,
        font_size: f64,
        color: Color,
        bold: bool,
        italic: bool,
    },
}

/// Commands for one frame plus the world-to-screen transform.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    pub transform: Affine,
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Text runs in draw order.
    pub fn text_runs(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    fn reset(&mut self, transform: Affine) {
        self.transform = transform;
        self.commands.clear();
    }

    fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    fn stroke(&mut self, space: Space, path: BezPath, color: Color, width: f64, dashed: bool) {
        self.push(DrawCommand::Stroke {
            space,
            path,
            color,
            width,
            dashed,
        });
    }
}

/// Renderer producing a [`DisplayList`].
#[derive(Debug, Default)]
pub struct DisplayListRenderer {
    list: DisplayList,
    frames: u64,
}

impl DisplayListRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently built frame.
    pub fn display_list(&self) -> &DisplayList {
        &self.list
    }

    /// Number of frames built so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn render_grid(&mut self, ctx: &RenderContext, world: Rect, grid_size: f64) {
        if !grid_size.is_finite() || grid_size <= 0.0 {
            return;
        }
        let start_x = (world.x0 / grid_size).floor() * grid_size;
        let start_y = (world.y0 / grid_size).floor() * grid_size;
        let end_x = (world.x1 / grid_size).ceil() * grid_size;
        let end_y = (world.y1 / grid_size).ceil() * grid_size;
        let columns = ((end_x - start_x) / grid_size).round() as usize;
        let rows = ((end_y - start_y) / grid_size).round() as usize;
        if columns > MAX_GRID_STEPS || rows > MAX_GRID_STEPS {
            log::debug!("Skipping grid: {columns}x{rows} cells");
            return;
        }
        let scale = ctx.editor.canvas.viewport.scale();
        let xs = (0..=columns).map(|i| start_x + i as f64 * grid_size);
        let ys = || (0..=rows).map(|j| start_y + j as f64 * grid_size);

        let mut path = BezPath::new();
        match ctx.grid_style {
            GridStyle::None => return,
            GridStyle::Lines => {
                for x in xs {
                    path.move_to(Point::new(x, start_y));
                    path.line_to(Point::new(x, end_y));
                }
                for y in ys() {
                    path.move_to(Point::new(start_x, y));
                    path.line_to(Point::new(end_x, y));
                }
                let color = Color::from_rgba8(200, 200, 200, 100);
                self.list.stroke(Space::World, path, color, 0.5 / scale, false);
            }
            GridStyle::Crosses => {
                let arm = 3.0 / scale;
                for x in xs {
                    for y in ys() {
                        path.move_to(Point::new(x - arm, y));
                        path.line_to(Point::new(x + arm, y));
                        path.move_to(Point::new(x, y - arm));
                        path.line_to(Point::new(x, y + arm));
                    }
                }
                let color = Color::from_rgba8(180, 180, 180, 60);
                self.list.stroke(Space::World, path, color, 1.0 / scale, false);
            }
            GridStyle::Dots => {
                let half = 1.5 / scale;
                for x in xs {
                    for y in ys() {
                        let dot = Rect::new(x - half, y - half, x + half, y + half);
                        path.extend(dot.path_elements(0.1));
                    }
                }
                let color = Color::from_rgba8(160, 160, 160, 70);
                self.list.push(DrawCommand::Fill {
                    space: Space::World,
                    path,
                    color,
                });
            }
        }
    }

    fn render_text(&mut self, text: &TextObject, ink: Color) {
        let color = text.color.map(Color::from).unwrap_or(ink);
        for (i, line) in text.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            self.list.push(DrawCommand::Text {
                space: Space::World,
                origin: text.baseline_of(i),
                text: line.to_string(),
                font_size: text.effective_size(),
                color,
                bold: text.bold,
                italic: text.italic,
            });
        }
    }

    fn render_objects(&mut self, ctx: &RenderContext) {
        let canvas = &ctx.editor.canvas;
        let scale = canvas.viewport.scale();
        let geometry = canvas.link_geometry();
        for object in canvas.document.paint_order() {
            let selected = canvas.selection.contains(object.id());
            match object {
                CanvasObject::Guide(guide) => {
                    let color = Color::from_rgba8(150, 150, 150, 160);
                    self.list
                        .stroke(Space::World, guide.rect().to_path(0.1), color, 1.0 / scale, true);
                }
                CanvasObject::Text(text) => self.render_text(text, ctx.palette.ink),
                CanvasObject::Link(link) => {
                    let Some(resolved) =
                        resolve_link(link, &canvas.document, canvas.measure(), &geometry)
                    else {
                        continue;
                    };
                    let color = if selected {
                        ctx.palette.accent
                    } else {
                        Color::from(link.color)
                    };
                    self.list
                        .stroke(Space::World, resolved.body, color, LINK_WIDTH, false);
                    if let Some(head) = resolved.head {
                        self.list.stroke(Space::World, head, color, LINK_WIDTH, false);
                    }
                    continue;
                }
            }
            if selected {
                if let Some(bounds) = bounds_of(object, &canvas.document, canvas.measure()) {
                    let outline = bounds.inflate(SELECTION_PAD / scale, SELECTION_PAD / scale);
                    self.list.stroke(
                        Space::World,
                        outline.to_path(0.1),
                        ctx.palette.accent,
                        1.0 / scale,
                        false,
                    );
                }
            }
        }
    }

    /// Dashed outline where the dragged reference object will land on release.
    fn render_drag_preview(&mut self, ctx: &RenderContext) {
        let canvas = &ctx.editor.canvas;
        if !canvas.toggles.snap_enabled {
            return;
        }
        let Some(drag) = canvas.selection.drag().filter(|drag| drag.moved) else {
            return;
        };
        let scale = canvas.viewport.scale();
        let Some(landing) = drag.preview_position(scale, canvas.grid_size(), true) else {
            return;
        };
        let Some(object) = canvas.document.get(drag.reference) else {
            return;
        };
        let (Some(current), Some(bounds)) = (
            object.position(),
            bounds_of(object, &canvas.document, canvas.measure()),
        ) else {
            return;
        };
        let ghost = bounds + (landing - current);
        self.list.stroke(
            Space::World,
            ghost.to_path(0.1),
            ctx.palette.accent,
            1.0 / scale,
            true,
        );
    }

    fn render_link_preview(&mut self, ctx: &RenderContext) {
        if let Some(preview) = ctx.editor.link_state().preview() {
            let scale = ctx.editor.canvas.viewport.scale();
            self.list.stroke(
                Space::World,
                preview.clone(),
                ctx.palette.accent,
                LINK_WIDTH / scale.max(1.0),
                true,
            );
        }
    }

    fn render_marquee(&mut self, ctx: &RenderContext) {
        let Some(marquee) = ctx.editor.canvas.selection.marquee() else {
            return;
        };
        let path = marquee.rect().to_path(0.1);
        self.list.push(DrawCommand::Fill {
            space: Space::Screen,
            path: path.clone(),
            color: Color::from_rgba8(59, 130, 246, 25),
        });
        self.list
            .stroke(Space::Screen, path, ctx.palette.accent, 1.0, true);
    }

    /// The text box with the typing buffer and caret, in screen space.
    fn render_text_box(&mut self, ctx: &RenderContext) {
        let editor: &Editor = ctx.editor;
        if editor.mode() != Mode::Typography {
            return;
        }
        let canvas = &editor.canvas;
        let viewport = &canvas.viewport;
        let lt = viewport.lt_position();
        let size = viewport.display_size;
        let line_height = size * LINE_HEIGHT_FACTOR;
        let lines: Vec<&str> = canvas.typing_text.split('\n').collect();

        let height = lines.len() as f64 * line_height;
        let frame = Rect::new(lt.x, lt.y, lt.x + viewport.text_box_width(), lt.y + height);
        let frame_color = Color::from_rgba8(190, 190, 190, 140);
        self.list
            .stroke(Space::Screen, frame.to_path(0.1), frame_color, 1.0, true);

        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            self.list.push(DrawCommand::Text {
                space: Space::Screen,
                origin: Point::new(lt.x, lt.y + size + i as f64 * line_height),
                text: (*line).to_string(),
                font_size: size,
                color: ctx.palette.ink,
                bold: false,
                italic: false,
            });
        }

        if ctx.caret_visible {
            let last = lines.len().saturating_sub(1);
            let x = lt.x + canvas.measure().text_width(lines.get(last).copied().unwrap_or(""), size);
            let top = lt.y + last as f64 * line_height;
            let mut caret = BezPath::new();
            caret.move_to(Point::new(x, top));
            caret.line_to(Point::new(x, top + line_height));
            self.list
                .stroke(Space::Screen, caret, ctx.palette.ink, 1.5, false);
        }
    }

    fn render_status(&mut self, ctx: &RenderContext) {
        let (text, color) = match &ctx.editor.canvas.assistant_status {
            AssistantStatus::Idle => return,
            AssistantStatus::Pending => (
                "Asking assistant...".to_string(),
                Color::from_rgba8(100, 100, 100, 255),
            ),
            AssistantStatus::Failed(message) => (
                format!("Assistant failed: {message}"),
                Color::from_rgba8(200, 40, 40, 255),
            ),
        };
        self.list.push(DrawCommand::Text {
            space: Space::Screen,
            origin: Point::new(12.0, 24.0),
            text,
            font_size: 13.0,
            color,
            bold: false,
            italic: true,
        });
    }
}

impl Renderer for DisplayListRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        let size = ctx.viewport_size;
        if !(size.width.is_finite() && size.height.is_finite()) || size.is_zero_area() {
            return Err(RendererError::EmptyViewport {
                width: size.width,
                height: size.height,
            });
        }
        let canvas = &ctx.editor.canvas;
        self.list.reset(canvas.viewport.camera.transform());
        self.list.push(DrawCommand::Clear(self.clear_color(ctx)));

        if canvas.toggles.grid_visible {
            self.render_grid(ctx, canvas.viewport.visible_world_rect(), canvas.grid_size());
        }
        self.render_objects(ctx);
        self.render_drag_preview(ctx);
        self.render_link_preview(ctx);
        self.render_marquee(ctx);
        self.render_text_box(ctx);
        self.render_status(ctx);

        self.frames += 1;
        log::trace!("Frame {} with {} command(s)", self.frames, self.list.len());
        Ok(())
    }
}
