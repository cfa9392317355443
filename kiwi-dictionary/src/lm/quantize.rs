//! Quantization codebook for log-probabilities and back-off weights.
//!
//! Training a codebook (the iterative 1-D non-uniform boundary-refinement
//! pass that picks bin centers) is a build-time concern this crate
//! doesn't perform; `Codebook` only loads and queries an already-trained
//! table of bin centers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Codebook {
    /// Sorted bin centers; `code` indexes directly into this table.
    centers: Vec<f32>,
}

impl Codebook {
    pub fn from_centers(centers: Vec<f32>) -> Self {
        debug_assert!(centers.windows(2).all(|w| w[0] <= w[1]));
        Codebook { centers }
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    pub fn dequantize(&self, code: u8) -> f32 {
        self.centers[code as usize]
    }

    /// Nearest-center code for `value`, for constructing default costs for
    /// user-added words against an already-trained codebook.
    pub fn quantize(&self, value: f32) -> u8 {
        match self
            .centers
            .binary_search_by(|c| c.partial_cmp(&value).unwrap())
        {
            Ok(idx) => idx as u8,
            Err(idx) => {
                if idx == 0 {
                    0
                } else if idx >= self.centers.len() {
                    (self.centers.len() - 1) as u8
                } else {
                    let before = self.centers[idx - 1];
                    let after = self.centers[idx];
                    if (value - before).abs() <= (after - value).abs() {
                        (idx - 1) as u8
                    } else {
                        idx as u8
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_dequantize_round_trips_to_nearest_center() {
        let codebook = Codebook::from_centers(vec![-10.0, -5.0, -1.0, 0.0]);
        for &v in &[-10.0, -5.0, -1.0, 0.0] {
            let code = codebook.quantize(v);
            assert_eq!(codebook.dequantize(code), v);
        }
        assert_eq!(codebook.quantize(-4.9), codebook.quantize(-5.0));
    }
}
