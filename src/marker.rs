use crate::geometry::LatLng;

/// A user-placed point of interest, immutable once created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerRecord {
    pub latitude: f64,
    pub longitude: f64,
    /// Distance from the user at creation time; `0.0` when no fix was known.
    pub distance_meters: f32,
}

impl MarkerRecord {
    pub const fn new(latitude: f64, longitude: f64, distance_meters: f32) -> Self {
        Self {
            latitude,
            longitude,
            distance_meters,
        }
    }

    pub const fn at(position: LatLng, distance_meters: f32) -> Self {
        Self::new(position.latitude, position.longitude, distance_meters)
    }

    pub const fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }

    pub fn key(&self) -> MarkerKey {
        MarkerKey::from_position(self.position())
    }
}

/// Replace-key for marker records: the exact coordinate pair.
///
/// Coordinates are compared by bit pattern so any `f64` (including NaN) has a
/// stable identity; `-0.0` is folded into `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerKey {
    latitude_bits: i64,
    longitude_bits: i64,
}

impl MarkerKey {
    pub fn from_position(position: LatLng) -> Self {
        Self {
            latitude_bits: coordinate_bits(position.latitude),
            longitude_bits: coordinate_bits(position.longitude),
        }
    }

    pub const fn from_bits(latitude_bits: i64, longitude_bits: i64) -> Self {
        Self {
            latitude_bits,
            longitude_bits,
        }
    }

    pub const fn latitude_bits(&self) -> i64 {
        self.latitude_bits
    }

    pub const fn longitude_bits(&self) -> i64 {
        self.longitude_bits
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(
            f64::from_bits(self.latitude_bits as u64),
            f64::from_bits(self.longitude_bits as u64),
        )
    }
}

fn coordinate_bits(value: f64) -> i64 {
    if value == 0.0 {
        0
    } else {
        value.to_bits() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_ignores_distance() {
        let a = MarkerRecord::new(10.0, 20.0, 5.0);
        let b = MarkerRecord::new(10.0, 20.0, 900.0);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn key_folds_negative_zero() {
        let a = MarkerRecord::new(0.0, -0.0, 0.0);
        let b = MarkerRecord::new(-0.0, 0.0, 0.0);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn key_round_trips_through_bits() {
        let record = MarkerRecord::new(-23.5505, -46.6333, 0.0);
        let key = record.key();
        let restored = MarkerKey::from_bits(key.latitude_bits(), key.longitude_bits());
        assert_eq!(restored.position(), record.position());
    }

    #[test]
    fn nan_coordinates_still_have_an_identity() {
        let a = MarkerRecord::new(f64::NAN, 1.0, 0.0);
        let b = MarkerRecord::new(f64::NAN, 1.0, 0.0);
        assert_eq!(a.key(), b.key());
    }
}
