use chrono::{DateTime, Utc};
use serde::Serialize;

/// Which of the two readings a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingKind {
    Temperature,
    Humidity,
}

impl ReadingKind {
    /// Last topic segment used for this kind in the split layout.
    pub fn suffix(self) -> &'static str {
        match self {
            ReadingKind::Temperature => "temperature",
            ReadingKind::Humidity => "humidity",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "temperature" => Some(ReadingKind::Temperature),
            "humidity" => Some(ReadingKind::Humidity),
            _ => None,
        }
    }
}

/// A parsed value addressed to one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub index: usize,
    pub kind: ReadingKind,
    pub value: f64,
}

/// Latest known readings for one point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointState {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PointState {
    pub fn get(&self, kind: ReadingKind) -> Option<f64> {
        match kind {
            ReadingKind::Temperature => self.temperature,
            ReadingKind::Humidity => self.humidity,
        }
    }

    fn slot_mut(&mut self, kind: ReadingKind) -> &mut Option<f64> {
        match kind {
            ReadingKind::Temperature => &mut self.temperature,
            ReadingKind::Humidity => &mut self.humidity,
        }
    }

    pub fn is_absent(&self) -> bool {
        self.temperature.is_none() && self.humidity.is_none()
    }
}

/// Serializable view of a point, used by the HTTP snapshot endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PointSnapshot {
    pub index: usize,
    pub topic: Option<String>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fixed-size table of point states, indexed like the topic registry.
#[derive(Debug, Clone)]
pub struct PointTable {
    points: Vec<PointState>,
}

impl PointTable {
    /// Creates `len` points, all absent.
    pub fn new(len: usize) -> Self {
        Self {
            points: vec![PointState::default(); len],
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PointState> {
        self.points.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &PointState)> {
        self.points.iter().enumerate()
    }

    /// Stores a reading. Returns `false` if the index is outside the table.
    pub fn apply(&mut self, reading: Reading) -> bool {
        match self.points.get_mut(reading.index) {
            Some(point) => {
                *point.slot_mut(reading.kind) = Some(reading.value);
                point.updated_at = Some(Utc::now());
                true
            }
            None => false,
        }
    }

    /// Clears both readings of a point and returns the kinds that held a value.
    pub fn clear(&mut self, index: usize) -> Vec<ReadingKind> {
        let Some(point) = self.points.get_mut(index) else {
            return Vec::new();
        };

        let mut cleared = Vec::new();
        for kind in [ReadingKind::Temperature, ReadingKind::Humidity] {
            if point.slot_mut(kind).take().is_some() {
                cleared.push(kind);
            }
        }
        point.updated_at = None;
        cleared
    }
}
