//! Vision-token cost estimation for page images.
//!
//! Patch-based models bill an image by the number of 32x32 patches it
//! covers, scaled down when the raw patch count exceeds the per-image
//! cap, then multiplied by a per-model fudge factor. The estimate is
//! computed once when a corpus is indexed and stored on each
//! [`PageRecord`](super::model::PageRecord) so retrieval can report
//! costs without touching image files.

/// Edge length of one billing patch, in pixels.
pub const PATCH_EDGE: u32 = 32;

/// Maximum patches billed for a single image. Larger images are scaled
/// down to fit.
pub const MAX_PATCHES: u64 = 1536;

/// Model assumed when the caller does not name one.
pub const DEFAULT_COST_MODEL: &str = "gpt-4.1-mini";

const DEFAULT_MULTIPLIER: f64 = 1.62;

fn model_multiplier(model: &str) -> f64 {
    match model {
        "gpt-5-mini" | "gpt-4.1-mini" => 1.62,
        "gpt-5-nano" | "gpt-4.1-nano" => 2.46,
        _ => DEFAULT_MULTIPLIER,
    }
}

/// Estimated token cost of sending a `width` x `height` image to
/// `model`.
///
/// The raw cost is the number of 32x32 patches needed to cover the
/// image, rounding partial patches up. When that exceeds
/// [`MAX_PATCHES`] the image is notionally resized by the factor that
/// brings the patch area back to the cap, and whole patches are
/// counted on the resized dimensions. The final cost applies the
/// per-model multiplier and rounds up.
pub fn estimate_image_tokens(width: u32, height: u32, model: &str) -> u64 {
    let raw_patches =
        u64::from(width.div_ceil(PATCH_EDGE)) * u64::from(height.div_ceil(PATCH_EDGE));

    let patches = if raw_patches > MAX_PATCHES {
        let patch_area = f64::from(PATCH_EDGE) * f64::from(PATCH_EDGE);
        let shrink =
            (patch_area * MAX_PATCHES as f64 / (f64::from(width) * f64::from(height))).sqrt();
        let fit_w = (f64::from(width) * shrink / f64::from(PATCH_EDGE)).floor() as u64;
        let fit_h = (f64::from(height) * shrink / f64::from(PATCH_EDGE)).floor() as u64;
        fit_w * fit_h
    } else {
        raw_patches
    };

    (patches as f64 * model_multiplier(model)).ceil() as u64
}
