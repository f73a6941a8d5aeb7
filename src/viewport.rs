//! Viewport fitting.
//!
//! Content coordinates are whatever the generator chose; the surface is a
//! fixed raster. The fit is a single uniform scale plus a centering
//! translation, computed once per scene from the static bounds.

use kurbo::{Affine, Rect, Vec2};

/// Uniform scale and translation mapping content space onto the surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitTransform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl FitTransform {
    pub const IDENTITY: FitTransform = FitTransform {
        scale: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    pub fn to_affine(self) -> Affine {
        Affine::translate(Vec2::new(self.offset_x, self.offset_y)) * Affine::scale(self.scale)
    }
}

/// Fits `bounds` into a `surface_w` x `surface_h` surface.
///
/// The scale never exceeds 1.0 (small content is centered, not magnified)
/// and never drops below `max(0.2, fit * 0.8)` so dense scenes stay legible;
/// the floor itself is capped at 1.0 so it can never reintroduce upscaling.
/// Degenerate bounds leave the viewport alone.
pub fn fit_bounds(bounds: Option<Rect>, surface_w: f64, surface_h: f64) -> FitTransform {
    let Some(bounds) = bounds else {
        return FitTransform::IDENTITY;
    };
    let (bw, bh) = (bounds.width(), bounds.height());
    if bw <= 0.0 || bh <= 0.0 || surface_w <= 0.0 || surface_h <= 0.0 {
        return FitTransform::IDENTITY;
    }

    let fit = (surface_w / bw).min(surface_h / bh);
    let floor = (0.2f64.max(fit * 0.8)).min(1.0);
    let scale = fit.clamp(floor, 1.0);

    FitTransform {
        scale,
        offset_x: (surface_w - bw * scale) / 2.0 - bounds.x0 * scale,
        offset_y: (surface_h - bh * scale) / 2.0 - bounds.y0 * scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_content_is_never_upscaled() {
        let fit = fit_bounds(Some(Rect::new(0.0, 0.0, 100.0, 100.0)), 900.0, 600.0);
        assert_eq!(fit.scale, 1.0);
        assert_eq!(fit.offset_x, 400.0);
        assert_eq!(fit.offset_y, 250.0);
    }

    #[test]
    fn oversized_content_scales_down() {
        let fit = fit_bounds(Some(Rect::new(0.0, 0.0, 1800.0, 600.0)), 900.0, 600.0);
        assert_eq!(fit.scale, 0.5);
        assert_eq!(fit.offset_x, 0.0);
        assert_eq!(fit.offset_y, 150.0);
    }

    #[test]
    fn extreme_content_hits_the_readability_floor() {
        // fit would be 0.1; the floor of max(0.2, 0.08) wins.
        let fit = fit_bounds(Some(Rect::new(0.0, 0.0, 9000.0, 600.0)), 900.0, 600.0);
        assert_eq!(fit.scale, 0.2);
    }

    #[test]
    fn offsets_account_for_bounds_origin() {
        let fit = fit_bounds(Some(Rect::new(20.0, 120.0, 180.0, 280.0)), 900.0, 600.0);
        assert_eq!(fit.scale, 1.0);
        // (900 - 160)/2 - 20, (600 - 160)/2 - 120.
        assert_eq!(fit.offset_x, 350.0);
        assert_eq!(fit.offset_y, 100.0);
    }

    #[test]
    fn missing_bounds_give_identity() {
        assert_eq!(fit_bounds(None, 900.0, 600.0), FitTransform::IDENTITY);
    }

    #[test]
    fn affine_maps_bounds_min_onto_surface() {
        let bounds = Rect::new(0.0, 0.0, 1800.0, 1200.0);
        let fit = fit_bounds(Some(bounds), 900.0, 600.0);
        let affine = fit.to_affine();
        let origin = affine * kurbo::Point::new(0.0, 0.0);
        assert_eq!(origin, kurbo::Point::new(0.0, 0.0));
        let corner = affine * kurbo::Point::new(1800.0, 1200.0);
        assert_eq!(corner, kurbo::Point::new(900.0, 600.0));
    }
}
