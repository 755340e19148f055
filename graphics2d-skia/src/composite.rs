//! Compositing rules.

use crate::error::{Graphics2dError, Graphics2dResult};
use tiny_skia::BlendMode;

/// Porter-Duff rules of the emulated API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaRule {
    Clear,
    Src,
    #[default]
    SrcOver,
    DstOver,
    SrcIn,
    DstIn,
    SrcOut,
    DstOut,
    Dst,
    SrcAtop,
    DstAtop,
    Xor,
}

impl AlphaRule {
    /// Engine blend mode for the rule. `Xor` has no engine equivalent.
    pub fn blend_mode(self) -> Option<BlendMode> {
        match self {
            AlphaRule::Clear => Some(BlendMode::Clear),
            AlphaRule::Src => Some(BlendMode::Source),
            AlphaRule::SrcOver => Some(BlendMode::SourceOver),
            AlphaRule::DstOver => Some(BlendMode::DestinationOver),
            AlphaRule::SrcIn => Some(BlendMode::SourceIn),
            AlphaRule::DstIn => Some(BlendMode::DestinationIn),
            AlphaRule::SrcOut => Some(BlendMode::SourceOut),
            AlphaRule::DstOut => Some(BlendMode::DestinationOut),
            AlphaRule::Dst => Some(BlendMode::Destination),
            AlphaRule::SrcAtop => Some(BlendMode::SourceAtop),
            AlphaRule::DstAtop => Some(BlendMode::DestinationAtop),
            AlphaRule::Xor => None,
        }
    }
}

/// A Porter-Duff rule with a constant extra alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlphaComposite {
    pub rule: AlphaRule,
    pub alpha: f32,
}

impl AlphaComposite {
    pub const SRC_OVER: AlphaComposite = AlphaComposite {
        rule: AlphaRule::SrcOver,
        alpha: 1.0,
    };

    pub fn new(rule: AlphaRule, alpha: f32) -> Graphics2dResult<Self> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(Graphics2dError::InvalidArgument(format!(
                "composite alpha {} outside [0, 1]",
                alpha
            )));
        }
        Ok(Self { rule, alpha })
    }

    /// Fully opaque composite with the given rule.
    pub fn of(rule: AlphaRule) -> Self {
        Self { rule, alpha: 1.0 }
    }
}

impl Default for AlphaComposite {
    fn default() -> Self {
        Self::SRC_OVER
    }
}

/// The installed composite.
#[derive(Debug, Clone, PartialEq)]
pub enum Composite {
    Alpha(AlphaComposite),
    /// Application-defined composite identified by name. Stored but not
    /// rendered.
    Custom(String),
}

impl Default for Composite {
    fn default() -> Self {
        Composite::Alpha(AlphaComposite::SRC_OVER)
    }
}

impl From<AlphaComposite> for Composite {
    fn from(ac: AlphaComposite) -> Self {
        Composite::Alpha(ac)
    }
}

impl Composite {
    /// Engine blend mode, `None` when the composite cannot be expressed.
    pub fn blend_mode(&self) -> Option<BlendMode> {
        match self {
            Composite::Alpha(ac) => ac.rule.blend_mode(),
            Composite::Custom(_) => None,
        }
    }

    /// Extra alpha applied to every draw, `None` for custom composites.
    pub fn alpha(&self) -> Option<f32> {
        match self {
            Composite::Alpha(ac) => Some(ac.alpha),
            Composite::Custom(_) => None,
        }
    }
}
