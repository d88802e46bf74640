//! Grasp attempt dataset
//!
//! Flat `(x, y, z, roll, pitch, yaw, success)` rows in trial order, with
//! CSV and JSON output for the downstream classifier tooling.

use crate::core::GraspAttempt;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// One dataset row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraspRecord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    /// `None` when the attempt was never judged
    pub success: Option<bool>,
}

impl GraspRecord {
    pub fn from_attempt(attempt: &GraspAttempt) -> Self {
        let position = attempt.pose.position();
        let orientation = attempt.pose.orientation();
        Self {
            x: position.x,
            y: position.y,
            z: position.z,
            roll: orientation.roll,
            pitch: orientation.pitch,
            yaw: orientation.yaw,
            success: attempt.success,
        }
    }
}

/// Ordered, append-only collection of grasp records.
///
/// Insertion order is trial order; duplicates are kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraspDataset {
    records: Vec<GraspRecord>,
}

impl GraspDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: GraspRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[GraspRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fraction of judged attempts that succeeded, if any were judged
    pub fn success_rate(&self) -> Option<f64> {
        let judged: Vec<bool> = self.records.iter().filter_map(|r| r.success).collect();
        if judged.is_empty() {
            return None;
        }
        let successes = judged.iter().filter(|s| **s).count();
        Some(successes as f64 / judged.len() as f64)
    }

    pub fn to_csv(&self) -> String {
        CsvFormatter::default().format_dataset(self)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.records)
    }

    /// Write the dataset as CSV to a file
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        fs::write(path, self.to_csv())
    }
}

/// CSV output for grasp datasets
#[derive(Debug, Clone, Copy)]
pub struct CsvFormatter {
    /// Include header row
    pub include_header: bool,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self {
            include_header: true,
        }
    }
}

impl CsvFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get CSV header
    pub fn header(&self) -> String {
        "x,y,z,roll,pitch,yaw,success".to_string()
    }

    /// Format one record as a CSV row. An unjudged attempt gets an empty
    /// success field.
    pub fn format_row(&self, record: &GraspRecord) -> String {
        let success = match record.success {
            Some(true) => "1",
            Some(false) => "0",
            None => "",
        };
        format!(
            "{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{}",
            record.x, record.y, record.z, record.roll, record.pitch, record.yaw, success
        )
    }

    pub fn format_dataset(&self, dataset: &GraspDataset) -> String {
        let mut out = String::new();
        if self.include_header {
            out.push_str(&self.header());
            out.push('\n');
        }
        for record in dataset.records() {
            out.push_str(&self.format_row(record));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EulerAngles, GraspAttempt, Pose};
    use nalgebra::Vector3;
    use std::f64::consts::PI;

    fn record(x: f64, success: Option<bool>) -> GraspRecord {
        GraspRecord {
            x,
            y: 0.25,
            z: 0.3,
            roll: PI,
            pitch: 0.5,
            yaw: -1.0,
            success,
        }
    }

    #[test]
    fn test_record_from_attempt() {
        let pose = Pose::new(
            Vector3::new(0.1, 0.2, 0.3),
            EulerAngles::inverted(0.4, 0.5),
        );
        let attempt = GraspAttempt::new(pose).with_success(true);
        let rec = GraspRecord::from_attempt(&attempt);

        assert_eq!(rec.x, 0.1);
        assert_eq!(rec.z, 0.3);
        assert_eq!(rec.roll, PI);
        assert_eq!(rec.yaw, 0.5);
        assert_eq!(rec.success, Some(true));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut dataset = GraspDataset::new();
        dataset.push(record(1.0, Some(true)));
        dataset.push(record(2.0, Some(false)));
        dataset.push(record(1.0, Some(true))); // duplicates are kept

        assert_eq!(dataset.len(), 3);
        let xs: Vec<f64> = dataset.records().iter().map(|r| r.x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 1.0]);
    }

    #[test]
    fn test_csv_format() {
        let mut dataset = GraspDataset::new();
        dataset.push(record(1.0, Some(true)));
        dataset.push(record(2.0, None));

        let csv = dataset.to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "x,y,z,roll,pitch,yaw,success");
        assert!(lines[1].starts_with("1.000000,0.250000,0.300000,"));
        assert!(lines[1].ends_with(",1"));
        assert!(lines[2].ends_with(','));
    }

    #[test]
    fn test_success_rate() {
        let mut dataset = GraspDataset::new();
        assert_eq!(dataset.success_rate(), None);

        dataset.push(record(1.0, Some(true)));
        dataset.push(record(2.0, Some(false)));
        dataset.push(record(3.0, Some(true)));
        dataset.push(record(4.0, None));
        assert_eq!(dataset.success_rate(), Some(2.0 / 3.0));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut dataset = GraspDataset::new();
        dataset.push(record(1.0, Some(false)));

        let json = dataset.to_json().unwrap();
        let parsed: Vec<GraspRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, dataset.records());
    }
}
