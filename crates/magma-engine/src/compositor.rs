//! Output collaborators: bloom compositing and presentation.
//!
//! The renderer produces a [`FrameImage`] and hands it on; what happens
//! next (a bloom pass, a swap chain, a PNG on disk) lives behind these
//! traits and is injected at scheduler construction.

use magma_core::{FrameId, FrameImage, ResourceError};

use crate::config::BloomSettings;

/// Post-processing pass applied to every rendered frame.
pub trait Compositor: Send {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Transform `image` in place.
    ///
    /// Returning [`ResourceError::ContextLost`] abandons the frame.
    fn composite(
        &mut self,
        image: &mut FrameImage,
        settings: &BloomSettings,
    ) -> Result<(), ResourceError>;
}

/// Compositor that leaves the image untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct Passthrough;

impl Compositor for Passthrough {
    fn name(&self) -> &str {
        "passthrough"
    }

    fn composite(
        &mut self,
        _image: &mut FrameImage,
        _settings: &BloomSettings,
    ) -> Result<(), ResourceError> {
        Ok(())
    }
}

/// Final consumer of composited frames.
pub trait Presenter: Send {
    /// Display (or store) one frame.
    ///
    /// Returning [`ResourceError::ContextLost`] marks the frame as lost.
    fn present(&mut self, image: &FrameImage, frame: FrameId) -> Result<(), ResourceError>;
}

/// Presenter that discards every frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn present(&mut self, _image: &FrameImage, _frame: FrameId) -> Result<(), ResourceError> {
        Ok(())
    }
}
