//! The tray icon, drawn at startup.

use image::{Rgba, RgbaImage};

const SIZE: u32 = 32;
const BORDER: u32 = 3;
const RADIUS: u32 = 6;

const KEYCAP: Rgba<u8> = Rgba([236, 236, 236, 255]);
const OUTLINE: Rgba<u8> = Rgba([48, 48, 48, 255]);
const BOLT: Rgba<u8> = Rgba([255, 196, 0, 255]);

/// Name of the freedesktop icon used for notifications.
pub const NOTIFICATION_ICON: &str = "input-keyboard";

/// A keycap with a lightning bolt.
pub fn app_icon() -> anyhow::Result<tray_icon::Icon> {
    let image = draw();
    let (width, height) = image.dimensions();
    Ok(tray_icon::Icon::from_rgba(image.into_raw(), width, height)?)
}

fn draw() -> RgbaImage {
    let mut image = RgbaImage::new(SIZE, SIZE);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        if !inside_rounded(x, y, 0, RADIUS) {
            continue;
        }
        *pixel = if inside_rounded(x, y, BORDER, RADIUS - BORDER / 2) {
            KEYCAP
        } else {
            OUTLINE
        };
        if in_bolt(x, y) {
            *pixel = BOLT;
        }
    }
    image
}

/// Whether (x, y) lies in the square inset by `inset` with corners of
/// `radius`.
fn inside_rounded(x: u32, y: u32, inset: u32, radius: u32) -> bool {
    let (lo, hi) = (inset, SIZE - 1 - inset);
    if x < lo || x > hi || y < lo || y > hi {
        return false;
    }
    let cx = x.clamp(lo + radius, hi - radius);
    let cy = y.clamp(lo + radius, hi - radius);
    let (dx, dy) = (x.abs_diff(cx), y.abs_diff(cy));
    dx * dx + dy * dy <= radius * radius
}

/// Two slanted strokes, the lower one shifted right.
fn in_bolt(x: u32, y: u32) -> bool {
    let center = match y {
        6..=16 => 20 - (y - 6) / 2,
        17..=26 => 22 - (y - 17) / 2,
        _ => return false,
    };
    x.abs_diff(center) <= 2
}
