use serde::{Deserialize, Serialize};

/// Straight-alpha RGBA color. Premultiplication happens at the raster
/// boundary, not here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BLACK: Rgba8 = Rgba8::new(0, 0, 0, 255);
    pub const WHITE: Rgba8 = Rgba8::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Scales the alpha channel by `f` (clamped to [0, 1]).
    pub fn scale_alpha(self, f: f64) -> Self {
        let f = f.clamp(0.0, 1.0);
        Self {
            a: (f64::from(self.a) * f).round() as u8,
            ..self
        }
    }

    /// Mixes the color toward white by `amount` (clamped to [0, 1]).
    /// Alpha is preserved.
    pub fn lighten(self, amount: f64) -> Self {
        let t = amount.clamp(0.0, 1.0);
        let mix = |c: u8| -> u8 { (f64::from(c) + (255.0 - f64::from(c)) * t).round() as u8 };
        Self {
            r: mix(self.r),
            g: mix(self.g),
            b: mix(self.b),
            a: self.a,
        }
    }
}

/// Wire representation for configured colors: hex string, `{r,g,b,a}`
/// object (channels 0-255, alpha 0-1), or `[r,g,b]`/`[r,g,b,a]` array.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorDef {
    Hex(String),
    Rgba {
        r: f64,
        g: f64,
        b: f64,
        #[serde(default = "default_alpha")]
        a: f64,
    },
    Array(Vec<f64>),
}

fn default_alpha() -> f64 {
    1.0
}

impl ColorDef {
    pub fn resolve(&self) -> Option<Rgba8> {
        match self {
            ColorDef::Hex(s) => parse_color(s),
            ColorDef::Rgba { r, g, b, a } => Some(Rgba8::new(
                channel(*r),
                channel(*g),
                channel(*b),
                (a.clamp(0.0, 1.0) * 255.0).round() as u8,
            )),
            ColorDef::Array(v) => match v.as_slice() {
                [r, g, b] => Some(Rgba8::new(channel(*r), channel(*g), channel(*b), 255)),
                [r, g, b, a] => Some(Rgba8::new(
                    channel(*r),
                    channel(*g),
                    channel(*b),
                    (a.clamp(0.0, 1.0) * 255.0).round() as u8,
                )),
                _ => None,
            },
        }
    }
}

fn channel(v: f64) -> u8 {
    v.clamp(0.0, 255.0).round() as u8
}

/// Parses a CSS-style color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`,
/// `rgb(...)`/`rgba(...)`, or one of a handful of named colors. Returns
/// `None` for anything else so callers can substitute their default.
pub fn parse_color(s: &str) -> Option<Rgba8> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(inner) = s
        .strip_prefix("rgba(")
        .or_else(|| s.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_func(inner);
    }
    named_color(s)
}

fn parse_hex(hex: &str) -> Option<Rgba8> {
    let nibble = |c: u8| -> Option<u8> {
        match c {
            b'0'..=b'9' => Some(c - b'0'),
            b'a'..=b'f' => Some(c - b'a' + 10),
            b'A'..=b'F' => Some(c - b'A' + 10),
            _ => None,
        }
    };
    let b = hex.as_bytes();
    match b.len() {
        // Short forms repeat each digit: #1af == #11aaff.
        3 | 4 => {
            let mut ch = [0u8; 4];
            ch[3] = 255;
            for (i, &c) in b.iter().enumerate() {
                let n = nibble(c)?;
                ch[i] = n << 4 | n;
            }
            Some(Rgba8::new(ch[0], ch[1], ch[2], ch[3]))
        }
        6 | 8 => {
            let mut ch = [0u8; 4];
            ch[3] = 255;
            for i in 0..b.len() / 2 {
                ch[i] = nibble(b[i * 2])? << 4 | nibble(b[i * 2 + 1])?;
            }
            Some(Rgba8::new(ch[0], ch[1], ch[2], ch[3]))
        }
        _ => None,
    }
}

fn parse_rgb_func(inner: &str) -> Option<Rgba8> {
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [r, g, b] => Some(Rgba8::new(
            channel(r.parse().ok()?),
            channel(g.parse().ok()?),
            channel(b.parse().ok()?),
            255,
        )),
        [r, g, b, a] => Some(Rgba8::new(
            channel(r.parse().ok()?),
            channel(g.parse().ok()?),
            channel(b.parse().ok()?),
            (a.parse::<f64>().ok()?.clamp(0.0, 1.0) * 255.0).round() as u8,
        )),
        _ => None,
    }
}

fn named_color(s: &str) -> Option<Rgba8> {
    let c = match s.to_ascii_lowercase().as_str() {
        "black" => Rgba8::BLACK,
        "white" => Rgba8::WHITE,
        "red" => Rgba8::new(255, 0, 0, 255),
        "green" => Rgba8::new(0, 128, 0, 255),
        "blue" => Rgba8::new(0, 0, 255, 255),
        "yellow" => Rgba8::new(255, 255, 0, 255),
        "orange" => Rgba8::new(255, 165, 0, 255),
        "purple" => Rgba8::new(128, 0, 128, 255),
        "cyan" => Rgba8::new(0, 255, 255, 255),
        "magenta" => Rgba8::new(255, 0, 255, 255),
        "gray" | "grey" => Rgba8::new(128, 128, 128, 255),
        "transparent" => Rgba8::new(0, 0, 0, 0),
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_forms_parse() {
        assert_eq!(parse_color("#000"), Some(Rgba8::BLACK));
        assert_eq!(parse_color("#fff"), Some(Rgba8::WHITE));
        assert_eq!(parse_color("#1af"), Some(Rgba8::new(0x11, 0xaa, 0xff, 255)));
        assert_eq!(parse_color("#336699"), Some(Rgba8::new(0x33, 0x66, 0x99, 255)));
        assert_eq!(
            parse_color("#33669980"),
            Some(Rgba8::new(0x33, 0x66, 0x99, 0x80))
        );
    }

    #[test]
    fn functional_and_named_forms_parse() {
        assert_eq!(parse_color("rgb(255, 0, 0)"), Some(Rgba8::new(255, 0, 0, 255)));
        assert_eq!(
            parse_color("rgba(0, 0, 0, 0.5)"),
            Some(Rgba8::new(0, 0, 0, 128))
        );
        assert_eq!(parse_color("Black"), Some(Rgba8::BLACK));
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#zzz"), None);
        assert_eq!(parse_color("chartreuse-ish"), None);
        assert_eq!(parse_color("rgb(1,2)"), None);
    }

    #[test]
    fn color_def_variants_resolve() {
        let hex: ColorDef = serde_json::from_str("\"#000\"").unwrap();
        assert_eq!(hex.resolve(), Some(Rgba8::BLACK));

        let obj: ColorDef = serde_json::from_str(r#"{"r":255,"g":255,"b":255}"#).unwrap();
        assert_eq!(obj.resolve(), Some(Rgba8::WHITE));

        let arr: ColorDef = serde_json::from_str("[0,0,0,0.5]").unwrap();
        assert_eq!(arr.resolve(), Some(Rgba8::new(0, 0, 0, 128)));
    }

    #[test]
    fn lighten_moves_toward_white() {
        let c = Rgba8::new(100, 100, 100, 200).lighten(0.5);
        assert_eq!(c, Rgba8::new(178, 178, 178, 200));
    }
}
