//! Editor controller: selection, painting mode, brush and user notices.
//!
//! Selection and painting mode are mutually exclusive. While painting, a
//! click paints the hit object instead of selecting it, and the gizmo and
//! property panel stay hidden.

pub mod brush;

pub use brush::{Brush, BrushKind, DEFAULT_PAINT_COLOR};

use crate::assets::upload::{UploadOutcome, UploadTarget};
use crate::assets::TextureStore;
use crate::render::{TransformGizmo, TransformMode};
use crate::scene::{Background, ObjectId, Rgb, SceneSession};
use std::collections::VecDeque;

/// Tool and modifier buttons that only announce themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderTool {
    Sculpt,
    Shape,
    Edit,
    Subsurface,
    Mirror,
    Array,
}

impl PlaceholderTool {
    pub const TOOLS: [PlaceholderTool; 3] = [Self::Sculpt, Self::Shape, Self::Edit];
    pub const MODIFIERS: [PlaceholderTool; 3] = [Self::Subsurface, Self::Mirror, Self::Array];

    pub fn label(self) -> &'static str {
        match self {
            Self::Sculpt => "Sculpt",
            Self::Shape => "Shape",
            Self::Edit => "Edit",
            Self::Subsurface => "Subsurf",
            Self::Mirror => "Mirror",
            Self::Array => "Array",
        }
    }

    pub fn notice(self) -> &'static str {
        match self {
            Self::Sculpt => "Sculpt tool selected.",
            Self::Shape => "Shape tool selected.",
            Self::Edit => "Edit tool selected.",
            Self::Subsurface => "Subsurface modifier applied (placeholder).",
            Self::Mirror => "Mirror modifier applied (placeholder).",
            Self::Array => "Array modifier applied (placeholder).",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Selected(ObjectId),
    Painted(ObjectId),
    PaintFailed(ObjectId),
    Cleared,
}

pub struct EditorState {
    selection: Option<ObjectId>,
    pub gizmo: TransformGizmo,
    properties_visible: bool,
    object_color: Rgb,
    painting_mode: bool,
    pub brush: Brush,
    notices: VecDeque<String>,
}

impl EditorState {
    pub fn new(paint_color: Rgb) -> Self {
        Self {
            selection: None,
            gizmo: TransformGizmo::new(),
            properties_visible: false,
            object_color: [0xff, 0xff, 0xff],
            painting_mode: false,
            brush: Brush::with_color(paint_color),
            notices: VecDeque::new(),
        }
    }

    pub fn selection(&self) -> Option<ObjectId> {
        self.selection
    }

    pub fn properties_visible(&self) -> bool {
        self.properties_visible
    }

    pub fn object_color(&self) -> Rgb {
        self.object_color
    }

    pub fn painting_mode(&self) -> bool {
        self.painting_mode
    }

    pub fn transform_mode(&self) -> TransformMode {
        self.gizmo.mode()
    }

    /// Resolves a viewport click whose ray hit `target` (or nothing).
    pub fn handle_click(
        &mut self,
        session: &mut SceneSession,
        target: Option<ObjectId>,
    ) -> ClickOutcome {
        let Some(id) = target.filter(|id| session.object(*id).is_some()) else {
            self.clear_selection();
            return ClickOutcome::Cleared;
        };
        if self.painting_mode {
            return self.paint(session, id);
        }
        self.select(session, id);
        ClickOutcome::Selected(id)
    }

    fn select(&mut self, session: &SceneSession, id: ObjectId) {
        let Some(object) = session.object(id) else {
            return;
        };
        self.selection = Some(id);
        self.gizmo.attach(id);
        self.properties_visible = true;
        self.object_color = object.material.color;
        log::info!("Selected: {}", object.name);
    }

    fn paint(&mut self, session: &mut SceneSession, id: ObjectId) -> ClickOutcome {
        let Some(object) = session.object_mut(id) else {
            return ClickOutcome::Cleared;
        };
        match self.brush.apply(&mut object.material) {
            Ok(()) => {
                log::debug!("Painted {} with {}", object.name, self.brush.kind.label());
                ClickOutcome::Painted(id)
            }
            Err(err) => {
                self.notify(err.to_string());
                ClickOutcome::PaintFailed(id)
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.gizmo.detach();
        self.properties_visible = false;
    }

    pub fn toggle_painting_mode(&mut self) -> bool {
        self.set_painting_mode(!self.painting_mode);
        self.painting_mode
    }

    /// Entering painting mode always drops the gizmo and property panel.
    pub fn set_painting_mode(&mut self, enabled: bool) {
        self.painting_mode = enabled;
        if enabled {
            self.gizmo.detach();
            self.properties_visible = false;
        }
        log::info!(
            "Painting mode {}",
            if enabled { "enabled" } else { "disabled" }
        );
    }

    pub fn set_brush_kind(&mut self, kind: BrushKind) {
        self.brush.kind = kind;
    }

    pub fn set_brush_color(&mut self, color: Rgb) {
        self.brush.color = color;
    }

    pub fn set_transform_mode(&mut self, mode: TransformMode) {
        self.gizmo.set_mode(mode);
    }

    /// Object color picker; applies to the selection immediately.
    pub fn set_object_color(&mut self, session: &mut SceneSession, color: Rgb) {
        self.object_color = color;
        let Some(object) = self.selection.and_then(|id| session.object_mut(id)) else {
            return;
        };
        object.material.color = color;
    }

    pub fn use_placeholder(&mut self, tool: PlaceholderTool) {
        self.notify(tool.notice());
    }

    /// Returns whether a file should be picked and read for `target`.
    pub fn request_upload(&mut self, target: UploadTarget) -> bool {
        match target.unsupported_notice() {
            Some(notice) => {
                self.notify(notice);
                false
            }
            None => true,
        }
    }

    /// Applies a finished upload on the frame thread. Failures are only logged.
    pub fn complete_upload(
        &mut self,
        session: &mut SceneSession,
        textures: &mut TextureStore,
        outcome: UploadOutcome,
    ) {
        let image = match outcome.result {
            Ok(image) => image,
            Err(err) => {
                log::warn!("{} upload failed: {err}", outcome.target.label());
                return;
            }
        };
        let name = image.name.clone();
        let key = textures.insert(image);
        match outcome.target {
            UploadTarget::Background => session.set_background(Background::Texture(key)),
            UploadTarget::Reference => session.add_reference_plane(key),
            UploadTarget::BrushTexture => self.brush.texture = Some(key),
            UploadTarget::Model | UploadTarget::Shader => {
                log::warn!("Ignoring {} upload {name}", outcome.target.label());
                return;
            }
        }
        log::info!("Loaded {} {name}", outcome.target.label());
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("Notice: {message}");
        self.notices.push_back(message);
    }

    pub fn current_notice(&self) -> Option<&str> {
        self.notices.front().map(String::as_str)
    }

    pub fn dismiss_notice(&mut self) -> Option<String> {
        self.notices.pop_front()
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(DEFAULT_PAINT_COLOR)
    }
}
