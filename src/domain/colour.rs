// Colour model: tagged RGB/HSL/HSV representations with mutually consistent
// conversions, hex parsing and a palette for distinguishing data series.
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::number::round_float;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsv {
    pub hue: f64,
    pub saturation: f64,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
}

/// A colour is always exactly one of the three representations. Conversions
/// are total, so the "unsupported format" case of the wire protocol cannot
/// occur once a value has been deserialized.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Colour {
    Rgb(Rgb),
    Hsl(Hsl),
    Hsv(Hsv),
}

impl Colour {
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Colour::Rgb(Rgb {
            red,
            green,
            blue,
            alpha: None,
        })
    }

    pub fn to_rgb(&self) -> Rgb {
        match self {
            Colour::Rgb(rgb) => *rgb,
            Colour::Hsl(hsl) => hsl_to_rgb(*hsl),
            Colour::Hsv(hsv) => hsl_to_rgb(hsv_to_hsl(*hsv)),
        }
    }

    pub fn to_hsl(&self) -> Hsl {
        match self {
            Colour::Rgb(rgb) => rgb_to_hsl(*rgb),
            Colour::Hsl(hsl) => *hsl,
            Colour::Hsv(hsv) => hsv_to_hsl(*hsv),
        }
    }

    pub fn to_hsv(&self) -> Hsv {
        match self {
            Colour::Rgb(rgb) => hsl_to_hsv(rgb_to_hsl(*rgb)),
            Colour::Hsl(hsl) => hsl_to_hsv(*hsl),
            Colour::Hsv(hsv) => *hsv,
        }
    }

    /// The alpha component, treating an absent one as fully opaque.
    pub fn alpha(&self) -> f64 {
        let alpha = match self {
            Colour::Rgb(rgb) => rgb.alpha,
            Colour::Hsl(hsl) => hsl.alpha,
            Colour::Hsv(hsv) => hsv.alpha,
        };
        alpha.unwrap_or(1.0)
    }

    /// 6-digit hex representation, extended to 8 digits when the colour is
    /// not fully opaque.
    pub fn to_hex(&self) -> String {
        let rgb = self.to_rgb();
        let mut hex = format!("#{:02x}{:02x}{:02x}", rgb.red, rgb.green, rgb.blue);
        let alpha = rgb.alpha.unwrap_or(1.0);
        if alpha != 1.0 {
            hex.push_str(&format!("{:02x}", (alpha * 255.0).round() as u8));
        }
        hex
    }

    /// Black or white, whichever reads better on top of this colour.
    pub fn contrast_foreground(&self) -> Colour {
        let rgb = self.to_rgb();
        let luma = (rgb.red as u32 * 299 + rgb.green as u32 * 587 + rgb.blue as u32 * 114) / 1000;
        if luma >= 128 {
            Colour::rgb(0, 0, 0)
        } else {
            Colour::rgb(255, 255, 255)
        }
    }
}

impl fmt::Display for Colour {
    /// CSS-compatible string, HSV going through its HSL equivalent.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Colour::Rgb(rgb) => {
                let alpha = rgb.alpha.unwrap_or(1.0);
                write!(f, "rgba({}, {}, {}, {})", rgb.red, rgb.green, rgb.blue, alpha)
            }
            Colour::Hsl(hsl) => {
                let alpha = hsl.alpha.unwrap_or(1.0);
                write!(
                    f,
                    "hsla({}, {}%, {}%, {})",
                    hsl.hue, hsl.saturation, hsl.lightness, alpha
                )
            }
            Colour::Hsv(hsv) => Colour::Hsl(hsv_to_hsl(*hsv)).fmt(f),
        }
    }
}

/// Two colours are equal when their canonical HSL forms match, so different
/// representations of the same visual colour compare equal. Absent alpha
/// counts as 1.0.
impl PartialEq for Colour {
    fn eq(&self, other: &Self) -> bool {
        let a = self.to_hsl();
        let b = other.to_hsl();
        a.hue == b.hue
            && a.saturation == b.saturation
            && a.lightness == b.lightness
            && a.alpha.unwrap_or(1.0) == b.alpha.unwrap_or(1.0)
    }
}

fn rgb_to_hsl(colour: Rgb) -> Hsl {
    let red = colour.red as f64 / 255.0;
    let green = colour.green as f64 / 255.0;
    let blue = colour.blue as f64 / 255.0;
    let min = red.min(green).min(blue);
    let max = red.max(green).max(blue);
    let lightness = (min + max) / 2.0;
    let mut hue = 0.0;
    let mut saturation = 0.0;
    if max != min {
        let chroma = max - min;
        saturation = chroma / (1.0 - (2.0 * lightness - 1.0).abs());
        hue = if max == red {
            ((green - blue) / chroma).rem_euclid(6.0)
        } else if max == green {
            (blue - red) / chroma + 2.0
        } else {
            (red - green) / chroma + 4.0
        };
    }
    Hsl {
        hue: (hue * 60.0).round(),
        saturation: (saturation * 100.0).round(),
        lightness: (lightness * 100.0).round(),
        alpha: colour.alpha.map(|a| round_float(a, 2)),
    }
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let mut t = t;
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn hsl_to_rgb(colour: Hsl) -> Rgb {
    let hue = colour.hue / 360.0;
    let saturation = colour.saturation / 100.0;
    let lightness = colour.lightness / 100.0;
    let (red, green, blue) = if saturation == 0.0 {
        (lightness, lightness, lightness)
    } else {
        let q = if lightness < 0.5 {
            lightness * (1.0 + saturation)
        } else {
            lightness + saturation - lightness * saturation
        };
        let p = 2.0 * lightness - q;
        (
            hue_to_channel(p, q, hue + 1.0 / 3.0),
            hue_to_channel(p, q, hue),
            hue_to_channel(p, q, hue - 1.0 / 3.0),
        )
    };
    Rgb {
        red: (red * 255.0).round() as u8,
        green: (green * 255.0).round() as u8,
        blue: (blue * 255.0).round() as u8,
        alpha: colour.alpha.map(|a| round_float(a, 2)),
    }
}

fn hsv_to_hsl(colour: Hsv) -> Hsl {
    let lightness = (colour.value / 2.0) * (2.0 - colour.saturation / 100.0);
    let mut saturation = 0.0;
    if lightness > 0.0 && lightness < 100.0 {
        saturation = if lightness < 50.0 {
            colour.saturation * colour.value / (lightness * 2.0)
        } else {
            colour.saturation * colour.value / ((100.0 - lightness) * 2.0)
        };
    }
    Hsl {
        hue: colour.hue.round(),
        saturation: saturation.round(),
        lightness: lightness.round(),
        alpha: colour.alpha.map(|a| round_float(a, 2)),
    }
}

fn hsl_to_hsv(colour: Hsl) -> Hsv {
    let temp = colour.saturation * colour.lightness.min(100.0 - colour.lightness) / 100.0;
    let divisor = colour.lightness + temp;
    let saturation = if divisor == 0.0 {
        0.0
    } else {
        200.0 * temp / divisor
    };
    Hsv {
        hue: colour.hue.round(),
        saturation: saturation.round(),
        value: (colour.lightness + temp).round(),
        alpha: colour.alpha.map(|a| round_float(a, 2)),
    }
}

/// Parses a hex colour with an optional `#` prefix. 3/4-digit shorthands
/// double each digit; anything other than a 6/8-digit result is rejected.
pub fn parse_hex(input: &str) -> Option<Colour> {
    let trimmed = input.strip_prefix('#').unwrap_or(input);
    let hex_string = if trimmed.len() == 3 || trimmed.len() == 4 {
        trimmed
            .chars()
            .flat_map(|c| [c, c])
            .collect::<String>()
    } else {
        trimmed.to_string()
    };
    if hex_string.len() != 6 && hex_string.len() != 8 {
        return None;
    }
    if !hex_string.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let hex = u32::from_str_radix(&hex_string, 16).ok()?;
    let rgb = if hex_string.len() == 8 {
        Rgb {
            red: ((hex >> 24) & 255) as u8,
            green: ((hex >> 16) & 255) as u8,
            blue: ((hex >> 8) & 255) as u8,
            alpha: Some((hex & 255) as f64 / 255.0),
        }
    } else {
        Rgb {
            red: ((hex >> 16) & 255) as u8,
            green: ((hex >> 8) & 255) as u8,
            blue: (hex & 255) as u8,
            alpha: None,
        }
    };
    Some(Colour::Rgb(rgb))
}

// Kelly's distinct colours, with a few too-similar entries removed.
pub const DISTINCT_COLOURS: [Colour; 18] = [
    Colour::rgb(255, 179, 0),   // vivid_yellow
    Colour::rgb(128, 62, 117),  // strong_purple
    Colour::rgb(255, 104, 0),   // vivid_orange
    Colour::rgb(166, 189, 215), // very_light_blue
    Colour::rgb(193, 0, 32),    // vivid_red
    Colour::rgb(206, 162, 98),  // grayish_yellow
    Colour::rgb(129, 112, 102), // medium_gray
    Colour::rgb(0, 125, 52),    // vivid_green
    Colour::rgb(246, 118, 142), // strong_purplish_pink
    Colour::rgb(0, 83, 138),    // strong_blue
    Colour::rgb(83, 55, 122),   // strong_violet
    Colour::rgb(179, 40, 81),   // strong_purplish_red
    Colour::rgb(244, 200, 0),   // vivid_greenish_yellow
    Colour::rgb(127, 24, 13),   // strong_reddish_brown
    Colour::rgb(147, 170, 0),   // vivid_yellowish_green
    Colour::rgb(89, 51, 21),    // deep_yellowish_brown
    Colour::rgb(241, 58, 19),   // vivid_reddish_orange
    Colour::rgb(35, 44, 22),    // dark_olive_green
];

pub const DEFAULT_COLOUR: Colour = Colour::rgb(241, 58, 19);

pub type ColourMap = HashMap<String, Colour>;

/// Assigns palette colours to names cyclically by position in the list.
/// A name occurring twice keeps a single (the later) assignment, and more
/// than 18 names wrap around the palette.
pub fn assign_colours(names: &[String]) -> ColourMap {
    let mut colour_map = ColourMap::new();
    for (i, name) in names.iter().enumerate() {
        colour_map.insert(name.clone(), distinct_colour(i));
    }
    colour_map
}

pub fn distinct_colour(i: usize) -> Colour {
    DISTINCT_COLOURS[i % DISTINCT_COLOURS.len()]
}
