//! Color assignment: categorical hue families keyed by frame name, and a
//! diverging scale for the compilation ratio.

use std::collections::HashMap;

use graal_flame_protocol::Rgb;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// Closed set of categorical color themes. Each variant owns one fixed RGB
/// formula over three weights in [0, 1); the formulas define the visual
/// identity of the themes and are not tunable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HueFamily {
    Hot,
    Mem,
    Io,
    Red,
    Green,
    Blue,
    Yellow,
    Purple,
    Aqua,
    Orange,
    Grey,
}

#[derive(Debug, Error)]
#[error("unknown color family: {0}")]
pub struct UnknownFamily(String);

impl std::str::FromStr for HueFamily {
    type Err = UnknownFamily;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hot" => Ok(Self::Hot),
            "mem" => Ok(Self::Mem),
            "io" => Ok(Self::Io),
            "red" => Ok(Self::Red),
            "green" => Ok(Self::Green),
            "blue" => Ok(Self::Blue),
            "yellow" => Ok(Self::Yellow),
            "purple" => Ok(Self::Purple),
            "aqua" => Ok(Self::Aqua),
            "orange" => Ok(Self::Orange),
            "grey" => Ok(Self::Grey),
            other => Err(UnknownFamily(other.to_string())),
        }
    }
}

impl HueFamily {
    /// Map three weights to a color using this family's formula.
    pub fn color(self, v1: f64, v2: f64, v3: f64) -> Rgb {
        let c = |base: f64, span: f64, v: f64| (base + (span * v).floor()) as u8;
        match self {
            Self::Hot => Rgb::new(c(205.0, 50.0, v3), c(0.0, 230.0, v1), c(0.0, 55.0, v2)),
            Self::Mem => Rgb::new(0, c(190.0, 50.0, v2), c(0.0, 210.0, v1)),
            Self::Io => {
                let x = c(80.0, 60.0, v1);
                Rgb::new(x, x, c(190.0, 55.0, v2))
            }
            Self::Red => {
                let x = c(50.0, 80.0, v1);
                Rgb::new(c(200.0, 55.0, v1), x, x)
            }
            Self::Green => {
                let x = c(50.0, 60.0, v1);
                Rgb::new(x, c(200.0, 55.0, v1), x)
            }
            Self::Blue => {
                let x = c(80.0, 60.0, v1);
                Rgb::new(x, x, c(205.0, 50.0, v1))
            }
            Self::Yellow => {
                let x = c(175.0, 55.0, v1);
                Rgb::new(x, x, c(50.0, 20.0, v1))
            }
            Self::Purple => {
                let x = c(190.0, 65.0, v1);
                Rgb::new(x, c(80.0, 60.0, v1), x)
            }
            Self::Aqua => Rgb::new(c(50.0, 60.0, v1), c(165.0, 55.0, v1), c(165.0, 55.0, v1)),
            Self::Orange => Rgb::new(c(190.0, 65.0, v1), c(90.0, 65.0, v1), 0),
            Self::Grey => {
                let x = c(110.0, 55.0, v1);
                Rgb::new(x, x, x)
            }
        }
    }
}

/// Hue family for a frame's source language tag. Unrecognized tags get the
/// catch-all family; frames without a tag keep the render's default.
pub fn language_family(language: Option<&str>, default: HueFamily) -> HueFamily {
    match language {
        Some("ruby") => HueFamily::Orange,
        Some("llvm") => HueFamily::Green,
        Some(_) => HueFamily::Blue,
        None => default,
    }
}

/// Predictable hash of a function name in [0, 1), weighted towards early
/// characters so related names land on related colors.
pub fn name_hash(name: &str) -> f64 {
    // Drop a leading module prefix ("module`func" style) before hashing.
    let name = match name.find('`') {
        Some(pos) => &name[pos + 1..],
        None => name,
    };

    let mut vector = 0.0;
    let mut weight = 1.0;
    let mut max = 1.0;
    let mut modulo = 10u32;
    for ch in name.chars() {
        let i = f64::from(ch as u32 % modulo);
        vector += (i / f64::from(modulo - 1)) * weight;
        modulo += 1;
        max += weight;
        weight *= 0.70;
        if modulo > 12 {
            break;
        }
    }
    1.0 - vector / max
}

/// Diverging color for a compilation ratio in [-max, max]: positive values
/// fade towards red, negative towards blue, zero is near-white.
pub fn scale_color(value: f64, max: f64, negate: bool) -> Rgb {
    let value = if negate { -value } else { value };
    if value > 0.0 {
        let x = (210.0 * (max - value) / max) as u8;
        Rgb::new(255, x, x)
    } else {
        let x = (210.0 * (max + value) / max) as u8;
        Rgb::new(x, x, 255)
    }
}

/// How the categorical weights are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// Fresh uniform weights per distinct name. Stable within one render
    /// pass via the memo map, but not across passes.
    Random,
    /// Weights from [`name_hash`]: identical colors across independent runs
    /// on the same input.
    Hashed,
}

/// Per-render color memo: equal names always share a color within a pass.
#[derive(Debug)]
pub struct Palette {
    mode: ColorMode,
    map: HashMap<(String, HueFamily), Rgb>,
    rng: SmallRng,
}

impl Palette {
    pub fn new(mode: ColorMode) -> Self {
        Self {
            mode,
            map: HashMap::new(),
            rng: SmallRng::from_os_rng(),
        }
    }

    /// Deterministic RNG stream, for tests of the random mode.
    pub fn with_seed(mode: ColorMode, seed: u64) -> Self {
        Self {
            mode,
            map: HashMap::new(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn color_for(&mut self, name: &str, family: HueFamily) -> Rgb {
        if let Some(color) = self.map.get(&(name.to_string(), family)) {
            return *color;
        }
        let (v1, v2, v3) = match self.mode {
            ColorMode::Hashed => {
                let v1 = name_hash(name);
                let reversed: String = name.chars().rev().collect();
                let v2 = name_hash(&reversed);
                (v1, v2, v2)
            }
            ColorMode::Random => (
                self.rng.random::<f64>(),
                self.rng.random::<f64>(),
                self.rng.random::<f64>(),
            ),
        };
        let color = family.color(v1, v2, v3);
        self.map.insert((name.to_string(), family), color);
        color
    }
}
