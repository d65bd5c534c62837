//! Image-to-surface coordinate conversion.
//!
//! The visual-capture tool returns a frame whose pixel dimensions usually
//! differ from the interactive surface it shows (device pixel ratio,
//! capture downscaling). Any coordinate the model reads off the image
//! must therefore be scaled before it can drive a click:
//!
//! `logical = measured * (surface_dimension / image_dimension)` per axis.
//!
//! The orchestrator does not rewrite the model's coordinates itself — it
//! appends a conversion instruction to the capture result so the model
//! applies the scaling when it chooses a point.

use pageclaw_core::Capture;

/// Per-axis scale factors from image pixels to surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub x: f64,
    pub y: f64,
}

impl ScaleFactors {
    /// Factors for a capture. Zero-sized images yield identity factors so
    /// a degenerate capture cannot poison later arithmetic.
    pub fn for_capture(capture: &Capture) -> Self {
        Self::new(
            (capture.surface_width, capture.surface_height),
            (capture.image.width, capture.image.height),
        )
    }

    /// Factors from explicit surface and image dimensions.
    pub fn new(surface: (u32, u32), image: (u32, u32)) -> Self {
        let factor = |s: u32, i: u32| if i == 0 { 1.0 } else { f64::from(s) / f64::from(i) };
        Self {
            x: factor(surface.0, image.0),
            y: factor(surface.1, image.1),
        }
    }

    /// Scale a point measured on the image into surface coordinates.
    pub fn apply(&self, measured: (f64, f64)) -> (f64, f64) {
        (measured.0 * self.x, measured.1 * self.y)
    }
}

/// The conversion instruction appended to a successful capture result.
pub fn conversion_instruction(capture: &Capture) -> String {
    let factors = ScaleFactors::for_capture(capture);
    format!(
        "The screenshot is {}x{} pixels but the page is {}x{} logical pixels. \
         Before using any coordinate measured on the screenshot, multiply the \
         x value by {:.4} and the y value by {:.4}.",
        capture.image.width,
        capture.image.height,
        capture.surface_width,
        capture.surface_height,
        factors.x,
        factors.y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pageclaw_core::ImagePayload;

    fn capture(sw: u32, sh: u32, iw: u32, ih: u32) -> Capture {
        Capture {
            image: ImagePayload::from_bytes("image/png", b"frame", iw, ih),
            surface_width: sw,
            surface_height: sh,
        }
    }

    #[test]
    fn scales_measured_point_into_surface_space() {
        let factors = ScaleFactors::new((1280, 960), (800, 600));
        assert_eq!(factors.apply((400.0, 300.0)), (640.0, 480.0));
    }

    #[test]
    fn identity_when_dimensions_match() {
        let factors = ScaleFactors::new((800, 600), (800, 600));
        assert_eq!(factors.apply((123.0, 45.0)), (123.0, 45.0));
    }

    #[test]
    fn zero_sized_image_falls_back_to_identity() {
        let factors = ScaleFactors::new((1280, 960), (0, 0));
        assert_eq!(factors.apply((10.0, 20.0)), (10.0, 20.0));
    }

    #[test]
    fn instruction_names_both_dimensions_and_factors() {
        let text = conversion_instruction(&capture(1280, 960, 800, 600));
        assert!(text.contains("800x600"));
        assert!(text.contains("1280x960"));
        assert!(text.contains("1.6000"));
    }
}
