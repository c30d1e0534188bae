//! LibSVM format dataset implementation
//!
//! Supports loading datasets in the libsvm format:
//! label index:value index:value ...
//!
//! Example:
//! +1 1:0.5 3:1.2 7:0.8
//! -1 2:0.3 5:2.1
//!
//! Samples are stored densely; features missing from a line are zero.

use crate::core::{Dataset, Result, SVMError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Dataset implementation for LibSVM format files
#[derive(Debug, Clone)]
pub struct LibSVMDataset {
    features: Vec<Vec<f64>>,
    labels: Vec<f64>,
    dimensions: usize,
}

impl LibSVMDataset {
    /// Load a dataset from a LibSVM format file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a dataset from a reader (for testing and flexibility)
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        let mut dimensions = 0;

        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (label, pairs) = Self::parse_line(line).map_err(|e| {
                SVMError::Parse(format!("Error parsing line {}: {}", line_num + 1, e))
            })?;
            if let Some(&(max_idx, _)) = pairs.iter().max_by_key(|(idx, _)| *idx) {
                dimensions = dimensions.max(max_idx + 1);
            }
            labels.push(label);
            rows.push(pairs);
        }

        if rows.is_empty() {
            return Err(SVMError::EmptyDataset);
        }

        let features = rows
            .into_iter()
            .map(|pairs| {
                let mut dense = vec![0.0; dimensions];
                for (idx, value) in pairs {
                    dense[idx] = value;
                }
                dense
            })
            .collect();

        Ok(LibSVMDataset {
            features,
            labels,
            dimensions,
        })
    }

    /// Parse a single line into its label and zero-based `(index, value)` pairs
    fn parse_line(line: &str) -> Result<(f64, Vec<(usize, f64)>)> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        if parts.is_empty() {
            return Err(SVMError::Parse("Empty line".to_string()));
        }

        let label = parts[0]
            .parse::<f64>()
            .map_err(|_| SVMError::Parse(format!("Invalid label: {}", parts[0])))?;
        let label = normalize_label(label);

        let mut pairs = Vec::with_capacity(parts.len() - 1);
        for feature_str in &parts[1..] {
            let (index, value) = feature_str
                .split_once(':')
                .ok_or_else(|| SVMError::Parse(format!("Invalid feature format: {feature_str}")))?;

            let index = index
                .parse::<usize>()
                .map_err(|_| SVMError::Parse(format!("Invalid feature index: {index}")))?;
            let value = value
                .parse::<f64>()
                .map_err(|_| SVMError::Parse(format!("Invalid feature value: {value}")))?;

            // libsvm uses 1-based indexing
            if index == 0 {
                return Err(SVMError::Parse(format!(
                    "Feature index must be positive: {index}"
                )));
            }
            pairs.push((index - 1, value));
        }

        Ok((label, pairs))
    }

    /// Dense feature rows
    pub fn feature_rows(&self) -> &[Vec<f64>] {
        &self.features
    }
}

/// Map any numeric label onto {-1, +1} by sign
pub(crate) fn normalize_label(label: f64) -> f64 {
    if label > 0.0 {
        1.0
    } else {
        -1.0
    }
}

impl Dataset for LibSVMDataset {
    fn len(&self) -> usize {
        self.labels.len()
    }

    fn dim(&self) -> usize {
        self.dimensions
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
