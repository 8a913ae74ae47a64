//! Quadrant polarity folding
//!
//! The four plane quadrants form a closed variant set; each carries its
//! polarity, axis flip flags, mirror set and fold angle as data. Folding
//! maps any planar position into the first quadrant while recording which
//! variant it came from.

use std::f64::consts::{FRAC_PI_2, PI};

/// Plane quadrant, counterclockwise from positive x/positive y
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    I,
    II,
    III,
    IV,
}

/// The data a quadrant variant carries
#[derive(Debug, Clone, PartialEq)]
pub struct QuadrantInfo {
    pub polarity: i8,
    pub flip_x: bool,
    pub flip_y: bool,
    pub mirrors: [Quadrant; 2],
    pub fold_angle: f64,
}

impl Quadrant {
    /// Classify a planar position; axes fall into the positive-side quadrant
    pub fn of(x: f64, y: f64) -> Quadrant {
        match (x >= 0.0, y >= 0.0) {
            (true, true) => Quadrant::I,
            (false, true) => Quadrant::II,
            (false, false) => Quadrant::III,
            (true, false) => Quadrant::IV,
        }
    }

    pub fn info(&self) -> QuadrantInfo {
        match self {
            Quadrant::I => QuadrantInfo {
                polarity: 1,
                flip_x: false,
                flip_y: false,
                mirrors: [Quadrant::II, Quadrant::IV],
                fold_angle: 0.0,
            },
            Quadrant::II => QuadrantInfo {
                polarity: -1,
                flip_x: true,
                flip_y: false,
                mirrors: [Quadrant::I, Quadrant::III],
                fold_angle: FRAC_PI_2,
            },
            Quadrant::III => QuadrantInfo {
                polarity: 1,
                flip_x: true,
                flip_y: true,
                mirrors: [Quadrant::II, Quadrant::IV],
                fold_angle: PI,
            },
            Quadrant::IV => QuadrantInfo {
                polarity: -1,
                flip_x: false,
                flip_y: true,
                mirrors: [Quadrant::I, Quadrant::III],
                fold_angle: PI + FRAC_PI_2,
            },
        }
    }
}

/// A position folded into the first quadrant with its source variant
#[derive(Debug, Clone, PartialEq)]
pub struct FoldedPosition {
    pub x: f64,
    pub y: f64,
    pub source: Quadrant,
    pub polarity: i8,
}

/// Fold a planar position into quadrant I by applying the variant's flips
pub fn fold(x: f64, y: f64) -> FoldedPosition {
    let source = Quadrant::of(x, y);
    let info = source.info();
    FoldedPosition {
        x: if info.flip_x { -x } else { x },
        y: if info.flip_y { -y } else { y },
        source,
        polarity: info.polarity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_lands_in_first_quadrant() {
        for &(x, y) in &[(3.0, 4.0), (-3.0, 4.0), (-3.0, -4.0), (3.0, -4.0)] {
            let folded = fold(x, y);
            assert!(folded.x >= 0.0 && folded.y >= 0.0);
            assert_eq!(folded.x, 3.0);
            assert_eq!(folded.y, 4.0);
        }
    }

    #[test]
    fn test_variant_data() {
        assert_eq!(Quadrant::of(-1.0, -1.0), Quadrant::III);
        let info = Quadrant::III.info();
        assert!(info.flip_x && info.flip_y);
        assert_eq!(info.polarity, 1);
        assert_eq!(info.mirrors, [Quadrant::II, Quadrant::IV]);

        // opposite-polarity quadrants mirror into positive ones
        assert_eq!(Quadrant::II.info().polarity, -1);
        assert_eq!(Quadrant::IV.info().polarity, -1);
    }

    #[test]
    fn test_fold_angles_quarter_turns() {
        let angles: Vec<f64> = [Quadrant::I, Quadrant::II, Quadrant::III, Quadrant::IV]
            .iter()
            .map(|q| q.info().fold_angle)
            .collect();
        for (i, a) in angles.iter().enumerate() {
            assert!((a - i as f64 * FRAC_PI_2).abs() < 1e-12);
        }
    }
}
