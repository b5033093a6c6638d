//! Curve interpolation and LUT generation
//!
//! Control points are anchored at (0,0) and (1,1) and joined with a
//! Catmull-Rom spline, sampled into a 256-entry lookup table.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::op::clamp_unit;

/// Number of entries in a lookup table
pub const LUT_SIZE: usize = 256;

/// Default number of memoized LUTs
pub const DEFAULT_LUT_CACHE_CAPACITY: usize = 64;

/// Normalized input -> output mapping, both coordinates in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f32,
    pub y: f32,
}

impl CurvePoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    fn clamped(self) -> Self {
        Self {
            x: self.x.clamp(0.0, 1.0),
            y: self.y.clamp(0.0, 1.0),
        }
    }
}

/// Channel a curve applies to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum CurveChannel {
    /// Master curve, applied identically to R, G and B
    #[default]
    #[serde(rename = "rgb")]
    Rgb,
    /// Treated like the master curve
    #[serde(rename = "luminosity")]
    Luminosity,
    #[serde(rename = "r")]
    Red,
    #[serde(rename = "g")]
    Green,
    #[serde(rename = "b")]
    Blue,
}

impl CurveChannel {
    pub const ALL: [CurveChannel; 5] = [
        CurveChannel::Rgb,
        CurveChannel::Luminosity,
        CurveChannel::Red,
        CurveChannel::Green,
        CurveChannel::Blue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CurveChannel::Rgb => "rgb",
            CurveChannel::Luminosity => "luminosity",
            CurveChannel::Red => "r",
            CurveChannel::Green => "g",
            CurveChannel::Blue => "b",
        }
    }

    /// Lenient parse accepting both short and long channel names
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "rgb" | "master" => Some(CurveChannel::Rgb),
            "luminosity" | "luma" => Some(CurveChannel::Luminosity),
            "r" | "red" => Some(CurveChannel::Red),
            "g" | "green" => Some(CurveChannel::Green),
            "b" | "blue" => Some(CurveChannel::Blue),
            _ => None,
        }
    }
}

impl fmt::Display for CurveChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurveChannel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        CurveChannel::parse(s).ok_or_else(|| format!("unknown curve channel '{}'", s))
    }
}

/// 256-entry lookup table: `lut[input] = output`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Lut([u8; LUT_SIZE]);

impl Lut {
    /// Identity table (no change)
    pub fn identity() -> Self {
        let mut table = [0u8; LUT_SIZE];
        for (i, value) in table.iter_mut().enumerate() {
            *value = i as u8;
        }
        Self(table)
    }

    pub fn from_table(table: [u8; LUT_SIZE]) -> Self {
        Self(table)
    }

    pub fn get(&self, input: u8) -> u8 {
        self.0[input as usize]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn is_identity(&self) -> bool {
        self.0.iter().enumerate().all(|(i, &v)| v == i as u8)
    }

    /// Blend a single channel value toward its mapped value
    pub fn apply(&self, value: u8, intensity: f32) -> u8 {
        apply_lut(self, value, intensity)
    }
}

impl Serialize for Lut {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl<'de> Deserialize<'de> for Lut {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let values = Vec::<u8>::deserialize(deserializer)?;
        let table: [u8; LUT_SIZE] = values.try_into().map_err(|v: Vec<u8>| {
            D::Error::custom(format!("lut must have {} entries, got {}", LUT_SIZE, v.len()))
        })?;
        Ok(Self(table))
    }
}

/// Build a lookup table from sparse control points
///
/// Non-finite points are dropped, the rest clamped into the unit square and
/// sorted by x. The curve is anchored at (0,0) and (1,1) unless the user
/// placed points there.
pub fn build_lut(points: &[CurvePoint]) -> Lut {
    let anchors = anchor_points(points);
    let mut table = Lut::identity().0;
    let last = anchors.len() - 1;

    for i in 0..last {
        let p1 = anchors[i];
        let p2 = anchors[i + 1];
        // Missing neighbors at the ends are extrapolated linearly.
        let p0 = if i == 0 {
            2.0 * p1.y - p2.y
        } else {
            anchors[i - 1].y
        };
        let p3 = if i + 1 == last {
            2.0 * p2.y - p1.y
        } else {
            anchors[i + 2].y
        };

        let start = lut_index(p1.x);
        let end = lut_index(p2.x);
        for x in start..=end {
            let t = if end > start {
                (x - start) as f32 / (end - start) as f32
            } else {
                0.0
            };
            let y = catmull_rom(p0, p1.y, p2.y, p3, t);
            table[x] = (y.clamp(0.0, 1.0) * 255.0).round().clamp(0.0, 255.0) as u8;
        }
    }

    Lut(table)
}

/// Sanitized, sorted control points with the (0,0)/(1,1) anchors added
fn anchor_points(points: &[CurvePoint]) -> Vec<CurvePoint> {
    let mut anchors: Vec<CurvePoint> = points
        .iter()
        .filter(|p| p.is_finite())
        .map(|p| p.clamped())
        .collect();
    anchors.sort_by(|a, b| a.x.total_cmp(&b.x));

    let origin = CurvePoint::new(0.0, 0.0);
    let unit = CurvePoint::new(1.0, 1.0);
    if anchors.first() != Some(&origin) {
        anchors.insert(0, origin);
    }
    if anchors.last() != Some(&unit) {
        anchors.push(unit);
    }
    anchors
}

fn lut_index(x: f32) -> usize {
    (x * 255.0).round().clamp(0.0, 255.0) as usize
}

/// Uniform Catmull-Rom segment between p1 (t = 0) and p2 (t = 1)
fn catmull_rom(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * (2.0 * p1
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}

/// `round(v + (lut[v] - v) * clamp(intensity, 0, 1))`
pub fn apply_lut(lut: &Lut, value: u8, intensity: f32) -> u8 {
    let v = value as f32;
    let mapped = lut.get(value) as f32;
    (v + (mapped - v) * clamp_unit(intensity))
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Apply a curve to one RGB pixel
///
/// Master channels (`rgb`, `luminosity`) map all three components; the
/// single-channel selectors touch only their own component.
pub fn apply_curve_rgb(lut: &Lut, channel: CurveChannel, intensity: f32, rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb;
    match channel {
        CurveChannel::Rgb | CurveChannel::Luminosity => [
            apply_lut(lut, r, intensity),
            apply_lut(lut, g, intensity),
            apply_lut(lut, b, intensity),
        ],
        CurveChannel::Red => [apply_lut(lut, r, intensity), g, b],
        CurveChannel::Green => [r, apply_lut(lut, g, intensity), b],
        CurveChannel::Blue => [r, g, apply_lut(lut, b, intensity)],
    }
}

type CurveKey = Vec<(u32, u32)>;

/// Memoized LUTs keyed by the exact control points they were built from
///
/// Rebuilding is only needed when points change, not on every composite
/// pass. When the cache is full it is flushed wholesale.
#[derive(Debug, Clone)]
pub struct LutCache {
    entries: HashMap<CurveKey, Arc<Lut>>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl LutCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            hits: 0,
            misses: 0,
        }
    }

    /// Fetch the LUT for these points, building it on first use
    pub fn get_or_build(&mut self, points: &[CurvePoint]) -> Arc<Lut> {
        let key: CurveKey = points
            .iter()
            .map(|p| (p.x.to_bits(), p.y.to_bits()))
            .collect();

        if let Some(lut) = self.entries.get(&key) {
            self.hits += 1;
            return Arc::clone(lut);
        }

        self.misses += 1;
        if self.entries.len() >= self.capacity {
            log::debug!("LUT cache full ({} entries), flushing", self.entries.len());
            self.entries.clear();
        }
        let lut = Arc::new(build_lut(points));
        self.entries.insert(key, Arc::clone(&lut));
        lut
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for LutCache {
    fn default() -> Self {
        Self::new(DEFAULT_LUT_CACHE_CAPACITY)
    }
}
