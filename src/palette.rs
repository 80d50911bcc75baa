//! Categorical color palette: evenly spaced hues at fixed saturation/value.

use ratatui::style::Color;

const SATURATION: f64 = 0.6;
const VALUE: f64 = 1.0;

/// Convert an HSV triple (h, s, v all in [0, 1]) to 8-bit RGB.
fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (u8, u8, u8) {
    let h = (h.fract() + 1.0).fract() * 6.0;
    let i = h.floor();
    let f = h - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match i as u32 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    (
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
    )
}

/// Generate `n` visually distinct colors, hue `i/n` at fixed saturation and
/// value. Deterministic and order-preserving; `n == 0` yields an empty list.
pub fn generate(n: usize) -> Vec<Color> {
    let mut colors = Vec::with_capacity(n);
    for i in 0..n {
        let h = i as f64 / n as f64;
        let (r, g, b) = hsv_to_rgb(h, SATURATION, VALUE);
        colors.push(Color::Rgb(r, g, b));
    }
    colors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_zero_is_empty() {
        assert!(generate(0).is_empty());
    }

    #[test]
    fn generate_is_deterministic() {
        let a = generate(7);
        let b = generate(7);
        assert_eq!(a, b);
        assert_eq!(a.len(), 7);
    }

    #[test]
    fn generate_first_color_is_desaturated_red() {
        // hue 0, sat 0.6, val 1.0 -> (255, 102, 102)
        assert_eq!(generate(1)[0], Color::Rgb(255, 102, 102));
    }

    #[test]
    fn generate_colors_are_distinct() {
        let colors = generate(12);
        for (i, a) in colors.iter().enumerate() {
            for b in colors.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn hsv_conversion_known_points() {
        assert_eq!(hsv_to_rgb(0.0, 0.0, 1.0), (255, 255, 255));
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), (255, 0, 0));
        assert_eq!(hsv_to_rgb(1.0 / 3.0, 1.0, 1.0), (0, 255, 0));
        assert_eq!(hsv_to_rgb(2.0 / 3.0, 1.0, 1.0), (0, 0, 255));
    }
}
