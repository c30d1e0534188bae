//! CSV format dataset implementation
//!
//! Supports loading datasets from CSV files where:
//! - The last column is the label
//! - All other columns are features
//! - First row can be headers (automatically detected)

use crate::core::{Dataset, Result, SVMError};
use crate::data::libsvm::normalize_label;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Dataset implementation for CSV format files
#[derive(Debug, Clone)]
pub struct CSVDataset {
    features: Vec<Vec<f64>>,
    labels: Vec<f64>,
}

impl CSVDataset {
    /// Load a dataset from a CSV file
    ///
    /// The last column is assumed to be the label.
    /// Headers are automatically detected if present.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a dataset from a reader, detecting a header row
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, true)
    }

    /// Load a dataset from a reader with explicit header option
    pub fn from_reader_with_options<R: BufRead>(reader: R, auto_detect_header: bool) -> Result<Self> {
        let mut features: Vec<Vec<f64>> = Vec::new();
        let mut labels = Vec::new();
        let mut first_data_line = true;

        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if first_data_line {
                first_data_line = false;
                if auto_detect_header && Self::is_header_line(line) {
                    continue;
                }
            }

            let (row, label) = Self::parse_data_line(line)?;
            if let Some(first) = features.first() {
                if first.len() != row.len() {
                    return Err(SVMError::Parse(format!(
                        "Line {} has {} features, expected {}",
                        line_num + 1,
                        row.len(),
                        first.len()
                    )));
                }
            }
            features.push(row);
            labels.push(label);
        }

        if labels.is_empty() {
            return Err(SVMError::EmptyDataset);
        }

        Ok(CSVDataset { features, labels })
    }

    /// Check if a line appears to be a header
    fn is_header_line(line: &str) -> bool {
        let fields: Vec<&str> = line.split(',').collect();

        if fields.len() < 2 {
            return false;
        }

        // Most feature columns failing to parse means a header
        let non_numeric_count = fields
            .iter()
            .take(fields.len() - 1)
            .filter(|field| field.trim().parse::<f64>().is_err())
            .count();

        non_numeric_count > fields.len() / 2
    }

    /// Parse a CSV data line into features and a label
    fn parse_data_line(line: &str) -> Result<(Vec<f64>, f64)> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();

        if fields.len() < 2 {
            return Err(SVMError::Parse(format!("Line has too few fields: {line}")));
        }

        let (label_str, feature_fields) = fields.split_last().ok_or_else(|| {
            SVMError::Parse(format!("Line has too few fields: {line}"))
        })?;
        let label = label_str
            .parse::<f64>()
            .map_err(|_| SVMError::Parse(format!("Invalid label: {label_str}")))?;

        let row = feature_fields
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                field.parse::<f64>().map_err(|_| {
                    SVMError::Parse(format!(
                        "Invalid feature value at column {}: {field}",
                        idx + 1
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        Ok((row, normalize_label(label)))
    }
}

impl Dataset for CSVDataset {
    fn len(&self) -> usize {
        self.labels.len()
    }

    fn dim(&self) -> usize {
        self.features.first().map_or(0, Vec::len)
    }

    fn features(&self, i: usize) -> &[f64] {
        &self.features[i]
    }

    fn label(&self, i: usize) -> f64 {
        self.labels[i]
    }

    fn get_labels(&self) -> Vec<f64> {
        self.labels.clone()
    }
}
