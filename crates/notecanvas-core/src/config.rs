//! Editor tuning knobs.

use crate::scene::HitTolerances;
use serde::{Deserialize, Serialize};

/// Tolerances, zoom limits and sizes used by the editor.
///
/// All distances are in scene units unless noted otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Background grid spacing.
    pub grid_size: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Wheel factor when scrolling up.
    pub zoom_in_factor: f64,
    /// Wheel factor when scrolling down.
    pub zoom_out_factor: f64,
    pub edge_tolerance: f64,
    pub curve_tolerance: f64,
    pub control_point_tolerance: f64,
    pub drawing_tolerance: f64,
    /// Zone corner handle tolerance in screen pixels.
    pub resize_handle_tolerance: f64,
    /// Marquees smaller than this on both axes count as clicks.
    pub marquee_threshold: f64,
    pub zone_min_size: f64,
    /// Longest side of an inserted image.
    pub image_max_size: f64,
    /// Decode loaded images on worker threads instead of inline.
    pub background_decode: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: 50.0,
            min_zoom: 0.1,
            max_zoom: 3.0,
            zoom_in_factor: 1.1,
            zoom_out_factor: 0.9,
            edge_tolerance: 10.0,
            curve_tolerance: 15.0,
            control_point_tolerance: 10.0,
            drawing_tolerance: 20.0,
            resize_handle_tolerance: 12.0,
            marquee_threshold: 5.0,
            zone_min_size: 50.0,
            image_max_size: 400.0,
            background_decode: true,
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON override. Missing fields keep defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Tolerances for [`Scene`](crate::Scene) hit-testing.
    pub fn hit_tolerances(&self) -> HitTolerances {
        HitTolerances {
            edge: self.edge_tolerance,
            curve: self.curve_tolerance,
            control_point: self.control_point_tolerance,
            drawing: self.drawing_tolerance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override() {
        let config = EditorConfig::from_json(r#"{"max_zoom": 5.0, "background_decode": false}"#)
            .unwrap();
        assert!((config.max_zoom - 5.0).abs() < f64::EPSILON);
        assert!(!config.background_decode);
        assert!((config.min_zoom - 0.1).abs() < f64::EPSILON);
        assert!((config.zone_min_size - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_tolerances_match_defaults() {
        assert_eq!(EditorConfig::default().hit_tolerances(), HitTolerances::default());
    }
}
