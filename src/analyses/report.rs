use serde::{Deserialize, Serialize};

/// A labeled point on one of the radiographs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// The result blob written next to each analysis. The measurement
/// values are placeholder data until a real model is wired in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub ap_landmarks: Vec<Point>,
    pub lat_landmarks: Vec<Point>,
    pub ap_reference_lines: Vec<Point>,
    pub lat_reference_lines: Vec<Point>,
    pub measurements: Vec<Measurement>,
    pub has_ap: bool,
    pub has_lat: bool,
    pub summary: String,
}

fn measurement(label: &str, value: &str, unit: &str) -> Measurement {
    Measurement {
        label: label.to_string(),
        value: value.to_string(),
        unit: Some(unit.to_string()),
    }
}

/// Generate placeholder wrist measurements for the views present.
pub fn generate_mock_report(has_ap: bool, has_lat: bool) -> AnalysisReport {
    let measurements = vec![
        measurement("Radial Angle", "22.3", "°"),
        measurement("Radial Length", "12.1", "mm"),
        measurement("Radial Shift", "1.2", "mm"),
        measurement("Ulnar Variance", "0.5", "mm"),
        measurement("Palmar Tilt", "11.2", "°"),
        measurement("Dorsal Shift", "2.1", "mm"),
    ];

    let summary = if has_ap && has_lat {
        "Analysis of both AP and lateral views shows normal wrist alignment with no \
         significant abnormalities in bone structure or positioning."
    } else if has_ap {
        "Analysis of AP view indicates normal alignment of radius and ulna. Consider \
         lateral view for complete evaluation of palmar tilt and dorsal shift."
    } else {
        "Analysis of lateral view shows appropriate palmar tilt. Consider AP view for \
         complete evaluation of radial angle and ulnar variance."
    };

    AnalysisReport {
        ap_landmarks: Vec::new(),
        lat_landmarks: Vec::new(),
        ap_reference_lines: Vec::new(),
        lat_reference_lines: Vec::new(),
        measurements,
        has_ap,
        has_lat,
        summary: summary.to_string(),
    }
}
