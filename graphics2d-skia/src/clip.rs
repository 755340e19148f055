//! Mutable clip emulation on top of a save/restore-only engine clip.
//!
//! The engine can only narrow its clip until the enclosing save is
//! restored. To replace the clip the stack unwinds to its save mark, saves
//! again, reapplies the transform and intersects with the new region. The
//! region itself is kept as a device-space shape so it survives later
//! transform changes.

use crate::canvas::TargetCanvas;
use crate::geometry::Shape;
use crate::path_convert::{shape_to_engine_path, to_engine_transform};
use kurbo::Affine;
use tiny_skia::Transform;

/// Whether a clip is in force, and its device-space region.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ClipState {
    #[default]
    NoClip,
    Active(Shape),
}

/// Clip region of one bridge plus the engine save level it owns.
#[derive(Debug, Clone)]
pub struct ClipStack {
    mark: usize,
    state: ClipState,
}

impl ClipStack {
    /// Take a save mark on `canvas` with no clip installed.
    pub fn new(canvas: &mut dyn TargetCanvas) -> Self {
        Self {
            mark: canvas.save(),
            state: ClipState::NoClip,
        }
    }

    /// Take a fresh save mark while remembering an inherited region. The
    /// engine clip of the parent is already in force below the mark.
    pub fn inherit(canvas: &mut dyn TargetCanvas, state: ClipState) -> Self {
        Self {
            mark: canvas.save(),
            state,
        }
    }

    pub fn mark(&self) -> usize {
        self.mark
    }

    pub fn state(&self) -> &ClipState {
        &self.state
    }

    /// The device-space region, `None` when unclipped.
    pub fn device_clip(&self) -> Option<&Shape> {
        match &self.state {
            ClipState::NoClip => None,
            ClipState::Active(shape) => Some(shape),
        }
    }

    /// Replace the clip with `user_shape` mapped through `transform`, or
    /// remove it when `None`. Leaves the engine matrix at `transform`.
    pub fn install(
        &mut self,
        canvas: &mut dyn TargetCanvas,
        transform: Affine,
        user_shape: Option<&Shape>,
        anti_alias: bool,
    ) {
        canvas.restore_to_count(self.mark);
        self.mark = canvas.save();
        let matrix = to_engine_transform(transform);
        canvas.set_matrix(matrix);

        let Some(shape) = user_shape else {
            self.state = ClipState::NoClip;
            return;
        };
        let device = shape.transformed(transform);
        canvas.set_matrix(Transform::identity());
        match shape_to_engine_path(&device) {
            Some(path) => canvas.clip_path(
                &path,
                device.winding_rule().unwrap_or_default().into(),
                anti_alias,
            ),
            None => canvas.clip_empty(),
        }
        canvas.set_matrix(matrix);
        log::debug!(target: "graphics2d", "clip installed, device bounds {:?}", device.bounds());
        self.state = ClipState::Active(device);
    }

    /// Give back every engine level taken since the mark, including the
    /// mark itself.
    pub fn release(&mut self, canvas: &mut dyn TargetCanvas) {
        if canvas.save_count() > self.mark {
            canvas.restore_to_count(self.mark);
        }
    }
}
