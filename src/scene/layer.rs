use crate::render::texture::Texture;

/// How a layer mixes with what is already on the surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Source-over.
    #[default]
    Normal,
    /// Multiply colors.
    Multiply,
    /// Screen colors.
    Screen,
}

impl BlendMode {
    pub(crate) fn to_cpu(self) -> vello_cpu::peniko::BlendMode {
        use vello_cpu::peniko::Mix;
        match self {
            BlendMode::Normal => vello_cpu::peniko::BlendMode::default(),
            BlendMode::Multiply => vello_cpu::peniko::BlendMode::from(Mix::Multiply),
            BlendMode::Screen => vello_cpu::peniko::BlendMode::from(Mix::Screen),
        }
    }
}

/// A textured layer drawn in texture space.
///
/// An empty texture slot means "not loaded yet"; renderers and samplers skip it.
#[derive(Clone, Debug)]
pub struct Sprite {
    texture: Option<Texture>,
    /// Layer opacity in `[0, 1]`.
    pub opacity: f32,
    /// Hidden layers are not drawn on screen (sampling ignores this flag).
    pub visible: bool,
    /// On-screen blend mode.
    pub blend: BlendMode,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            texture: None,
            opacity: 1.0,
            visible: true,
            blend: BlendMode::Normal,
        }
    }
}

impl Sprite {
    /// A visible, fully opaque sprite showing `texture`.
    pub fn new(texture: Texture) -> Self {
        Self {
            texture: Some(texture),
            ..Self::default()
        }
    }

    /// The attached texture, if loaded.
    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    /// Swap the attached texture.
    pub fn set_texture(&mut self, texture: Option<Texture>) {
        self.texture = texture;
    }

    /// Builder-style opacity.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Builder-style blend mode.
    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    /// Builder-style visibility.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Copy of this sprite with display state neutralized: visible, opaque, normal blend.
    pub fn isolated(&self) -> Self {
        Self {
            texture: self.texture.clone(),
            ..Self::default()
        }
    }

    pub(crate) fn is_drawable(&self) -> bool {
        self.visible && self.opacity > 0.0 && self.texture.is_some()
    }
}

/// Opaque identifier handed to overlay click listeners.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OverlayHandle(pub u64);

/// Highlighted-segment overlay.
#[derive(Clone, Debug)]
pub struct Overlay {
    /// Handle passed to click listeners.
    pub handle: OverlayHandle,
    /// Segment shown by this overlay.
    pub segment_id: crate::masks::color_map::SegmentId,
    /// Overlay sprite.
    pub sprite: Sprite,
}

/// Container for the composite mask and the single highlighted-segment overlay.
#[derive(Clone, Debug, Default)]
pub struct MaskContainer {
    /// Semantic composite mask layer.
    pub composite: Option<Sprite>,
    /// Highlighted-segment overlay (at most one).
    pub overlay: Option<Overlay>,
}

/// The scene's fixed set of layer slots, bottom to top.
#[derive(Clone, Debug)]
pub struct LayerTree {
    /// Base image layer.
    pub base: Sprite,
    /// Composite mask and overlay container.
    pub masks: MaskContainer,
    /// Freehand selection layer, created when drawing is first enabled.
    pub selection: Option<crate::brush::stroke::SelectionLayer>,
}

impl LayerTree {
    pub(crate) fn new(base: Texture) -> Self {
        Self {
            base: Sprite::new(base),
            masks: MaskContainer::default(),
            selection: None,
        }
    }
}
