use serde::{Deserialize, Serialize};

/// Geographic position. Serialized as `[lat, lon]`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Linear interpolation per axis: `self + (end - self) * progress`.
    pub fn lerp(self, end: Coordinate, progress: f64) -> Coordinate {
        Coordinate {
            lat: self.lat + (end.lat - self.lat) * progress,
            lon: self.lon + (end.lon - self.lon) * progress,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lat, lon]: [f64; 2]) -> Self {
        Self { lat, lon }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lat, c.lon]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    pub fn flipped(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }
}

/// One generated data point held in the sample window.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Sample {
    /// Local wall-clock time the sample was taken, `HH:MM:SS`
    pub label: String,
    pub value: f64,
}
