use serde::Deserialize;

/// Axis-aligned rectangle a pin must fall inside, loaded once at startup.
///
/// All four comparisons are strict: a point sitting exactly on an edge is
/// outside the fence.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GeofenceBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeofenceBounds {
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat > self.south && lat < self.north && lng > self.west && lng < self.east
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> GeofenceBounds {
        GeofenceBounds {
            south: 29.62725,
            west: -82.37236,
            north: 29.66,
            east: -82.30,
        }
    }

    #[test]
    fn interior_point_is_inside() {
        assert!(bounds().contains(29.64, -82.35));
    }

    #[test]
    fn boundary_points_are_outside() {
        let b = bounds();
        assert!(!b.contains(29.62725, -82.35));
        assert!(!b.contains(29.66, -82.35));
        assert!(!b.contains(29.64, -82.37236));
        assert!(!b.contains(29.64, -82.30));
    }

    #[test]
    fn far_away_point_is_outside() {
        assert!(!bounds().contains(40.7128, -74.0060));
    }

    #[test]
    fn corner_is_outside() {
        assert!(!bounds().contains(29.62725, -82.37236));
    }
}
