//! CSS colour parsing and WCAG contrast.
//!
//! Accepted forms: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()`/`rgba()`
//! with comma or space separators, `hsl()`/`hsla()`, a bare HSL triple as
//! used in custom properties (`222.2 84% 4.9%`), and a subset of named
//! colours. Alpha is ignored for contrast purposes.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// WCAG AA minimum for normal text
pub const MIN_CONTRAST: f64 = 4.5;

static RGB_FN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^rgba?\(\s*(\d{1,3}(?:\.\d+)?)\s*[,\s]\s*(\d{1,3}(?:\.\d+)?)\s*[,\s]\s*(\d{1,3}(?:\.\d+)?)")
        .unwrap()
});

static HSL_FN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^hsla?\(\s*(-?[\d.]+)(?:deg)?\s*[,\s]\s*([\d.]+)%\s*[,\s]\s*([\d.]+)%").unwrap()
});

static HSL_TRIPLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-?[\d.]+)(?:deg)?\s+([\d.]+)%\s+([\d.]+)%(?:\s*/\s*[\d.]+%?)?$").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb`, lowercase
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Relative luminance per WCAG 2.x
    pub fn luminance(&self) -> f64 {
        let srgb = [self.r, self.g, self.b].map(|c| {
            let v = c as f64 / 255.0;
            if v <= 0.04045 {
                v / 12.92
            } else {
                ((v + 0.055) / 1.055).powf(2.4)
            }
        });
        0.2126 * srgb[0] + 0.7152 * srgb[1] + 0.0722 * srgb[2]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Contrast ratio between two colours, in `1.0..=21.0`. Symmetric.
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let l1 = a.luminance();
    let l2 = b.luminance();
    let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Parse any supported colour value
pub fn parse_color(value: &str) -> Option<Rgb> {
    let v = value.trim().trim_end_matches("!important").trim().to_lowercase();
    if v.starts_with('#') {
        parse_hex(&v)
    } else if v.starts_with("rgb") {
        parse_rgb(&v)
    } else if v.starts_with("hsl") {
        let caps = HSL_FN.captures(&v)?;
        hsl_caps(&caps)
    } else if let Some(caps) = HSL_TRIPLE.captures(&v) {
        hsl_caps(&caps)
    } else {
        parse_named(&v)
    }
}

pub fn parse_hex(hex: &str) -> Option<Rgb> {
    let hex = hex.trim().trim_start_matches('#');
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 | 4 => Some(Rgb::new(
            channel(&hex[0..1].repeat(2))?,
            channel(&hex[1..2].repeat(2))?,
            channel(&hex[2..3].repeat(2))?,
        )),
        6 | 8 => Some(Rgb::new(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        _ => None,
    }
}

fn parse_rgb(value: &str) -> Option<Rgb> {
    let caps = RGB_FN.captures(value)?;
    let channel = |i: usize| -> Option<u8> {
        let n: f64 = caps[i].parse().ok()?;
        (0.0..=255.0).contains(&n).then(|| n.round() as u8)
    };
    Some(Rgb::new(channel(1)?, channel(2)?, channel(3)?))
}

fn hsl_caps(caps: &regex::Captures<'_>) -> Option<Rgb> {
    let h: f64 = caps[1].parse().ok()?;
    let s: f64 = caps[2].parse().ok()?;
    let l: f64 = caps[3].parse().ok()?;
    Some(hsl_to_rgb(h, s / 100.0, l / 100.0))
}

/// Convert HSL (hue in degrees, saturation and lightness in `0..=1`)
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let h = h.rem_euclid(360.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;
    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb::new(to_u8(r), to_u8(g), to_u8(b))
}

pub fn parse_named(name: &str) -> Option<Rgb> {
    let rgb = match name {
        "white" => Rgb::new(255, 255, 255),
        "black" => Rgb::new(0, 0, 0),
        "red" => Rgb::new(255, 0, 0),
        "green" => Rgb::new(0, 128, 0),
        "blue" => Rgb::new(0, 0, 255),
        "yellow" => Rgb::new(255, 255, 0),
        "gray" | "grey" => Rgb::new(128, 128, 128),
        "silver" => Rgb::new(192, 192, 192),
        "maroon" => Rgb::new(128, 0, 0),
        "olive" => Rgb::new(128, 128, 0),
        "lime" => Rgb::new(0, 255, 0),
        "aqua" | "cyan" => Rgb::new(0, 255, 255),
        "teal" => Rgb::new(0, 128, 128),
        "navy" => Rgb::new(0, 0, 128),
        "fuchsia" | "magenta" => Rgb::new(255, 0, 255),
        "purple" => Rgb::new(128, 0, 128),
        "orange" => Rgb::new(255, 165, 0),
        _ => return None,
    };
    Some(rgb)
}

/// True for literal colour syntax (hex, rgb, hsl); named colours and
/// variable references are not literals
pub fn is_color_literal(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    (v.starts_with('#') && parse_hex(&v).is_some())
        || v.starts_with("rgb(")
        || v.starts_with("rgba(")
        || (v.starts_with("hsl(") && !v.contains("var("))
        || (v.starts_with("hsla(") && !v.contains("var("))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(parse_color("#fff"), Some(Rgb::new(255, 255, 255)));
        assert_eq!(parse_color("#FFFFFF"), Some(Rgb::new(255, 255, 255)));
        assert_eq!(parse_color("#11223380"), Some(Rgb::new(0x11, 0x22, 0x33)));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#ggg"), None);
    }

    #[test]
    fn test_parse_rgb_forms() {
        assert_eq!(parse_color("rgb(10, 20, 30)"), Some(Rgb::new(10, 20, 30)));
        assert_eq!(parse_color("rgba(10,20,30,0.5)"), Some(Rgb::new(10, 20, 30)));
        assert_eq!(parse_color("rgb(10 20 30 / 50%)"), Some(Rgb::new(10, 20, 30)));
        assert_eq!(parse_color("rgb(300, 0, 0)"), None);
    }

    #[test]
    fn test_parse_hsl_forms() {
        assert_eq!(parse_color("hsl(0, 0%, 100%)"), Some(Rgb::new(255, 255, 255)));
        assert_eq!(parse_color("hsl(0 100% 50%)"), Some(Rgb::new(255, 0, 0)));
        assert_eq!(parse_color("0 0% 0%"), Some(Rgb::new(0, 0, 0)));
        assert_eq!(parse_color("120 100% 25%"), Some(Rgb::new(0, 128, 0)));
    }

    #[test]
    fn test_named_and_unknown() {
        assert_eq!(parse_color("White"), Some(Rgb::new(255, 255, 255)));
        assert_eq!(parse_color("inherit"), None);
        assert_eq!(parse_color("var(--x)"), None);
    }

    #[test]
    fn test_contrast_extremes() {
        let white = Rgb::new(255, 255, 255);
        let black = Rgb::new(0, 0, 0);
        assert!((contrast_ratio(white, black) - 21.0).abs() < 1e-9);
        assert!((contrast_ratio(white, white) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_contrast_symmetric() {
        let a = Rgb::new(0x77, 0x77, 0x77);
        let b = Rgb::new(0x88, 0x88, 0x88);
        assert_eq!(contrast_ratio(a, b), contrast_ratio(b, a));
        assert!(contrast_ratio(a, b) < MIN_CONTRAST);
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(Rgb::new(255, 0, 16).to_hex(), "#ff0010");
    }

    #[test]
    fn test_is_color_literal() {
        assert!(is_color_literal("#333"));
        assert!(is_color_literal("rgb(1,2,3)"));
        assert!(!is_color_literal("hsl(var(--primary))"));
        assert!(!is_color_literal("red"));
    }
}
