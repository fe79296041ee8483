// Copyright © 2020 Brian Merchant.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    #[serde(alias = "linear")]
    Lin,
    Log,
}

impl Default for Scale {
    fn default() -> Self {
        Scale::Lin
    }
}

/// Decades shown on a log scale that has no usable minimum.
pub const LOG_FALLBACK_DECADES: i32 = 3;

/// Maps data values onto `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Norm {
    pub vmin: f64,
    pub vmax: f64,
    pub scale: Scale,
}

impl Norm {
    /// A log scale needs positive limits: a `vmax` that is not positive
    /// becomes 1 and such a `vmin` sits `LOG_FALLBACK_DECADES` below
    /// `vmax`.
    pub fn new(vmin: f64, vmax: f64, scale: Scale) -> Norm {
        if scale == Scale::Lin {
            return Norm { vmin, vmax, scale };
        }
        let usable = |v: f64| v > 0.0 && v.is_finite();
        let vmax = if usable(vmax) { vmax } else { 1.0 };
        let vmin = if usable(vmin) {
            vmin
        } else {
            vmax * 10f64.powi(-LOG_FALLBACK_DECADES)
        };
        Norm { vmin, vmax, scale }
    }

    /// `None` for values that cannot be shown (NaN, or non-positive on
    /// a log scale). Values outside the range are clipped.
    pub fn normalize(&self, v: f64) -> Option<f64> {
        if !v.is_finite() {
            return None;
        }
        let (v, lo, hi) = match self.scale {
            Scale::Lin => (v, self.vmin, self.vmax),
            Scale::Log => {
                if v <= 0.0 || self.vmin <= 0.0 {
                    return None;
                }
                (v.ln(), self.vmin.ln(), self.vmax.ln())
            }
        };
        if hi <= lo {
            return Some(0.0);
        }
        Some(((v - lo) / (hi - lo)).max(0.0).min(1.0))
    }

}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Palette {
    Viridis,
    Inferno,
    Magma,
    GistHeat,
    Blues,
    RdBu,
    Gray,
}

const VIRIDIS: &[u32] = &[
    0x440154, 0x482878, 0x3e4989, 0x31688e, 0x26828e, 0x1f9e89, 0x35b779,
    0x6ece58, 0xb5de2b, 0xfde725,
];
const INFERNO: &[u32] = &[
    0x000004, 0x1b0c41, 0x4a0c6b, 0x781c6d, 0xa52c60, 0xcf4446, 0xed6925,
    0xfb9b06, 0xf7d13d, 0xfcffa4,
];
const MAGMA: &[u32] = &[
    0x000004, 0x180f3d, 0x440f76, 0x721f81, 0x9e2f7f, 0xcd4071, 0xf1605d,
    0xfd9668, 0xfeca8d, 0xfcfdbf,
];
const BLUES: &[u32] = &[
    0xf7fbff, 0xdeebf7, 0xc6dbef, 0x9ecae1, 0x6baed6, 0x4292c6, 0x2171b5,
    0x08519c, 0x08306b,
];
const RDBU: &[u32] = &[
    0x67001f, 0xb2182b, 0xd6604d, 0xf4a582, 0xfddbc7, 0xf7f7f7, 0xd1e5f0,
    0x92c5de, 0x4393c3, 0x2166ac, 0x053061,
];

static NAMES: Lazy<Vec<(&'static str, Palette)>> = Lazy::new(|| {
    vec![
        ("viridis", Palette::Viridis),
        ("inferno", Palette::Inferno),
        ("magma", Palette::Magma),
        ("gist_heat", Palette::GistHeat),
        ("Blues", Palette::Blues),
        ("RdBu", Palette::RdBu),
        ("gray", Palette::Gray),
    ]
});

fn split_rgb(c: u32) -> (f64, f64, f64) {
    (
        ((c >> 16) & 0xff) as f64,
        ((c >> 8) & 0xff) as f64,
        (c & 0xff) as f64,
    )
}

fn interpolate(stops: &[u32], t: f64) -> (u8, u8, u8) {
    let x = t * (stops.len() - 1) as f64;
    let i = (x.floor() as usize).min(stops.len() - 2);
    let f = x - i as f64;
    let (r0, g0, b0) = split_rgb(stops[i]);
    let (r1, g1, b1) = split_rgb(stops[i + 1]);
    let mix = |a: f64, b: f64| (a + f * (b - a)).round() as u8;
    (mix(r0, r1), mix(g0, g1), mix(b0, b1))
}

/// A named colour map, optionally reversed with an `_r` suffix
/// (`Blues_r`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColorMap {
    pub palette: Palette,
    pub reversed: bool,
}

impl ColorMap {
    pub fn new(palette: Palette) -> Self {
        ColorMap {
            palette,
            reversed: false,
        }
    }

    pub fn reversed(self) -> Self {
        ColorMap {
            reversed: !self.reversed,
            ..self
        }
    }

    /// Colour at `t` in `[0, 1]`.
    pub fn rgb(&self, t: f64) -> (u8, u8, u8) {
        let t = t.max(0.0).min(1.0);
        let t = if self.reversed { 1.0 - t } else { t };
        match self.palette {
            Palette::Viridis => interpolate(VIRIDIS, t),
            Palette::Inferno => interpolate(INFERNO, t),
            Palette::Magma => interpolate(MAGMA, t),
            Palette::Blues => interpolate(BLUES, t),
            Palette::RdBu => interpolate(RDBU, t),
            Palette::Gray => {
                let v = (255.0 * t).round() as u8;
                (v, v, v)
            }
            Palette::GistHeat => {
                let c = |x: f64| (255.0 * x.max(0.0).min(1.0)).round() as u8;
                (c(1.5 * t), c(2.0 * t - 1.0), c(4.0 * t - 3.0))
            }
        }
    }
}

impl FromStr for ColorMap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, reversed) = match s.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (s, false),
        };
        NAMES
            .iter()
            .find(|(name, _)| *name == base)
            .map(|&(_, palette)| ColorMap { palette, reversed })
            .ok_or_else(|| format!("unknown colour map: {}", s))
    }
}

impl TryFrom<String> for ColorMap {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for ColorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = NAMES
            .iter()
            .find(|(_, p)| *p == self.palette)
            .map(|(name, _)| *name)
            .unwrap_or("viridis");
        write!(f, "{}{}", name, if self.reversed { "_r" } else { "" })
    }
}

impl From<ColorMap> for String {
    fn from(c: ColorMap) -> String {
        c.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_norm_clips_and_masks() {
        let n = Norm {
            vmin: 1e-7,
            vmax: 1e-4,
            scale: Scale::Log,
        };
        assert_eq!(n.normalize(1e-7), Some(0.0));
        assert_eq!(n.normalize(1e-2), Some(1.0));
        assert_eq!(n.normalize(1e-9), Some(0.0));
        assert!((n.normalize(1e-5).unwrap() - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(n.normalize(0.0), None);
        assert_eq!(n.normalize(f64::NAN), None);
    }

    #[test]
    fn log_norm_replaces_unusable_limits() {
        let n = Norm::new(0.0, 1e-4, Scale::Log);
        assert_eq!((n.vmin, n.vmax), (1e-7, 1e-4));
        let n = Norm::new(-1.0, 0.0, Scale::Log);
        assert_eq!((n.vmin, n.vmax), (1e-3, 1.0));
        let n = Norm::new(f64::NAN, f64::INFINITY, Scale::Log);
        assert_eq!((n.vmin, n.vmax), (1e-3, 1.0));
        assert_eq!(n.normalize(1.0), Some(1.0));
        let n = Norm::new(0.0, 5.0, Scale::Lin);
        assert_eq!((n.vmin, n.vmax), (0.0, 5.0));
    }

    #[test]
    fn lin_norm() {
        let n = Norm {
            vmin: -2.5,
            vmax: 2.5,
            scale: Scale::Lin,
        };
        assert_eq!(n.normalize(0.0), Some(0.5));
        assert_eq!(n.normalize(-10.0), Some(0.0));
    }

    #[test]
    fn names_round_trip_through_serde() {
        let c: ColorMap = serde_json::from_str("\"Blues_r\"").unwrap();
        assert_eq!(c, ColorMap::new(Palette::Blues).reversed());
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"Blues_r\"");
        assert!(serde_json::from_str::<ColorMap>("\"jet\"").is_err());
    }

    #[test]
    fn reversed_maps_swap_ends() {
        let c = ColorMap::new(Palette::Inferno);
        assert_eq!(c.rgb(0.0), (0, 0, 4));
        assert_eq!(c.reversed().rgb(1.0), (0, 0, 4));
        assert_eq!(ColorMap::new(Palette::GistHeat).rgb(1.0), (255, 255, 255));
    }
}
