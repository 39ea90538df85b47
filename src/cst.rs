use crate::pixels::{Pixel, MAX_HUE};

const HSV_SHIFT: i32 = 12;
const HSV_ROUND: i32 = 1 << (HSV_SHIFT - 1);

// round(numerator / i) for i in 1..=255, entry 0 unused
const fn div_table(numerator: i32) -> [i32; 256] {
    let mut table = [0; 256];
    let mut i = 1;
    while i < 256 {
        table[i] = (2 * numerator + i as i32) / (2 * i as i32);
        i += 1;
    }
    table
}

const SATURATION_DIV: [i32; 256] = div_table(255 << HSV_SHIFT);
const HUE_DIV: [i32; 256] = div_table(((MAX_HUE as i32) << HSV_SHIFT) / 6);

/// 8-bit RGB to HSV with fixed point arithmetic, hue on the `[0, 180)` half-degree scale.
///
/// Bit-compatible with the OpenCV `BGR2HSV` conversion for 8-bit images.
#[inline]
pub fn rgb_to_hsv(pixel: Pixel) -> Pixel {
    let [r, g, b] = pixel.map(i32::from);
    let v = r.max(g).max(b);
    let diff = v - r.min(g).min(b);

    let s = (diff * SATURATION_DIV[v as usize] + HSV_ROUND) >> HSV_SHIFT;

    let h = if v == r {
        g - b
    } else if v == g {
        b - r + 2 * diff
    } else {
        r - g + 4 * diff
    };
    let mut h = (h * HUE_DIV[diff as usize] + HSV_ROUND) >> HSV_SHIFT;
    if h < 0 {
        h += MAX_HUE as i32;
    }

    [h as u8, s as u8, v as u8]
}

/// HSV (all components as fractions of a turn / of full scale) to fractional RGB.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> [f64; 3] {
    if s == 0.0 {
        return [v, v, v];
    }
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match (sector as i64).rem_euclid(6) {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}
