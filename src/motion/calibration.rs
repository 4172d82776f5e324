// src/motion/calibration.rs - World-to-stage coordinate transform

/// Row-major 3x3 homogeneous transform on the first two coordinates.
pub type CalibrationMatrix = [f64; 9];

pub const IDENTITY: CalibrationMatrix = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

#[derive(Debug, Clone)]
pub struct Calibration {
    matrix: CalibrationMatrix,
}

impl Default for Calibration {
    fn default() -> Self {
        Self { matrix: IDENTITY }
    }
}

impl Calibration {
    pub fn new(matrix: CalibrationMatrix) -> Self {
        Self { matrix }
    }

    pub fn set_matrix(&mut self, matrix: CalibrationMatrix) {
        self.matrix = matrix;
    }

    pub fn matrix(&self) -> &CalibrationMatrix {
        &self.matrix
    }

    /// Map world coordinates to stage coordinates.
    ///
    /// Only X and Y are transformed; any further coordinates pass through.
    /// Sequences with fewer than two entries are returned unchanged.
    pub fn apply(&self, coordinates: &[f64]) -> Vec<f64> {
        let mut result = coordinates.to_vec();
        if coordinates.len() < 2 {
            return result;
        }
        let m = &self.matrix;
        let (x, y) = (coordinates[0], coordinates[1]);
        let mut x_prime = x * m[0] + y * m[1] + m[2];
        let mut y_prime = x * m[3] + y * m[4] + m[5];
        let w_prime = x * m[6] + y * m[7] + m[8];
        if w_prime != 0.0 {
            x_prime /= w_prime;
            y_prime /= w_prime;
        }
        result[0] = x_prime;
        result[1] = y_prime;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identity_leaves_coordinates_unchanged() {
        let calib = Calibration::default();
        assert_eq!(calib.apply(&[10.0, -5.0]), vec![10.0, -5.0]);
        assert_eq!(calib.apply(&[3.0, 4.0, 7.5]), vec![3.0, 4.0, 7.5]);
    }

    #[test]
    fn test_scale_offset_rotation() {
        let mut calib = Calibration::default();
        calib.set_matrix([2.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 1.0]);
        let out = calib.apply(&[1.0, 1.0]);
        assert!(approx(out[0], 2.0) && approx(out[1], 2.0));

        calib.set_matrix([1.0, 0.0, 5.0, 0.0, 1.0, 10.0, 0.0, 0.0, 1.0]);
        let out = calib.apply(&[0.0, 0.0]);
        assert!(approx(out[0], 5.0) && approx(out[1], 10.0));

        // 90 degrees about the origin
        calib.set_matrix([0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        let out = calib.apply(&[2.0, 0.0]);
        assert!(approx(out[0], 0.0) && approx(out[1], 2.0));
    }

    #[test]
    fn test_projective_divide_and_degenerate_w() {
        let calib = Calibration::new([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 2.0]);
        let out = calib.apply(&[4.0, 6.0, 1.0]);
        assert!(approx(out[0], 2.0) && approx(out[1], 3.0));
        assert_eq!(out[2], 1.0);

        // w' == 0 skips the divide
        let calib = Calibration::new([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(calib.apply(&[4.0, 6.0]), vec![4.0, 6.0]);
    }

    #[test]
    fn test_short_input_passes_through() {
        let calib = Calibration::new([2.0, 0.0, 1.0, 0.0, 2.0, 1.0, 0.0, 0.0, 1.0]);
        assert_eq!(calib.apply(&[7.0]), vec![7.0]);
        assert!(calib.apply(&[]).is_empty());
    }
}
