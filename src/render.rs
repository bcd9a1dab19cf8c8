//! Rasterization of layer markup and surface compositing.
//!
//! Each tailor's colored layer tree is serialized to markup and rasterized
//! here onto that tailor's private surface; the composite controller then
//! blends those surfaces together in z order. Layers and the composite
//! always share the same square canvas size, so compositing is a
//! whole-surface source-over blend.

use image::{Rgba, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};

/// Rasterizes serialized layer markup onto a fresh square surface.
///
/// The markup's viewBox is expected to match `size` (see
/// [`crate::drawable::to_svg_markup`]), so rendering is 1:1.
///
/// Returns `None` if the markup cannot be parsed or the surface cannot be
/// allocated; the caller treats that layer as empty.
pub fn rasterize_layer(markup: &str, size: u32) -> Option<RgbaImage> {
    let options = Options::default();
    let tree = Tree::from_str(markup, &options).ok()?;

    let mut pixmap = Pixmap::new(size, size)?;
    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

    Some(pixmap_to_rgba(&pixmap))
}

fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }
    image
}

/// Blends a layer surface over a composite surface of the same size.
pub fn composite_surface(dest: &mut RgbaImage, src: &RgbaImage) {
    debug_assert_eq!(dest.dimensions(), src.dimensions());
    for (dst, src) in dest.pixels_mut().zip(src.pixels()) {
        *dst = blend_over(*src, *dst);
    }
}

/// Source-over alpha blend of two RGBA pixels.
fn blend_over(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let src_a = src[3] as f32 / 255.0;
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);

    if out_a == 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |s: u8, d: u8| {
        let s = s as f32 / 255.0;
        let d = d as f32 / 255.0;
        let out = (s * src_a + d * dst_a * (1.0 - src_a)) / out_a;
        (out * 255.0).round() as u8
    };

    Rgba([
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE_MARKUP: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="8" viewBox="0 0 8 8"><path d="M0 0h8v8H0z" fill="#ff0000"/></svg>"##;

    #[test]
    fn rasterize_fills_the_canvas() {
        let surface = rasterize_layer(SQUARE_MARKUP, 8).unwrap();
        assert_eq!(surface.dimensions(), (8, 8));
        assert_eq!(surface.get_pixel(4, 4).0, [255, 0, 0, 255]);
    }

    #[test]
    fn rasterize_rejects_garbage_markup() {
        assert!(rasterize_layer("<not-svg>", 8).is_none());
    }

    #[test]
    fn opaque_layer_replaces_what_is_beneath() {
        let mut dest = RgbaImage::from_pixel(4, 4, Rgba([0, 255, 0, 255]));
        let src = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]));

        composite_surface(&mut dest, &src);
        assert_eq!(dest.get_pixel(1, 1).0, [0, 0, 255, 255]);
    }

    #[test]
    fn transparent_layer_leaves_the_composite_alone() {
        let mut dest = RgbaImage::from_pixel(4, 4, Rgba([0, 255, 0, 255]));
        let src = RgbaImage::new(4, 4);

        composite_surface(&mut dest, &src);
        assert_eq!(dest.get_pixel(1, 1).0, [0, 255, 0, 255]);
    }

    #[test]
    fn semi_transparent_layer_blends() {
        let mut dest = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
        let src = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 128]));

        composite_surface(&mut dest, &src);
        let pixel = dest.get_pixel(0, 0);
        assert!(pixel[0] > 0, "some red should remain");
        assert!(pixel[2] > 0, "some blue should arrive");
        assert_eq!(pixel[3], 255);
    }
}
