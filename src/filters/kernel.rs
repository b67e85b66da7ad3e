//! Convolution kernels and morphological structuring elements.
//!
//! Both carry an explicit anchor `(row, col)`: the kernel cell that sits on
//! the output pixel. The default anchor is the center cell
//! `(rows / 2, cols / 2)`.

use std::str::FromStr;

use ndarray::{array, Array2};

use crate::error::{EditorError, Result};

/// Largest row or column count accepted from user-entered matrices.
pub const MAX_KERNEL_DIM: usize = 20;

/// Largest side of a generated box or Gaussian blur kernel.
pub const MAX_BLUR_SIZE: usize = 51;

fn check_anchor(shape: (usize, usize), anchor: (usize, usize)) -> Result<()> {
    if anchor.0 >= shape.0 || anchor.1 >= shape.1 {
        return Err(EditorError::invalid(format!(
            "anchor {:?} outside {}x{} kernel",
            anchor, shape.0, shape.1
        )));
    }
    Ok(())
}

/// Parse whitespace-separated rows, one row per non-empty line.
fn parse_matrix<T: FromStr>(text: &str) -> Result<Array2<T>> {
    let mut rows: Vec<Vec<T>> = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row = line
            .split_whitespace()
            .map(|token| {
                token.parse::<T>().map_err(|_| {
                    EditorError::invalid(format!(
                        "invalid kernel value '{token}' on line {}",
                        line_no + 1
                    ))
                })
            })
            .collect::<Result<Vec<T>>>()?;
        rows.push(row);
    }

    let height = rows.len();
    let width = rows.first().map_or(0, Vec::len);
    if height == 0 || width == 0 {
        return Err(EditorError::invalid("kernel matrix is empty"));
    }
    if rows.iter().any(|row| row.len() != width) {
        return Err(EditorError::invalid("kernel rows have different lengths"));
    }
    if height > MAX_KERNEL_DIM || width > MAX_KERNEL_DIM {
        return Err(EditorError::invalid(format!(
            "kernel is {height}x{width}; each dimension must be 1..={MAX_KERNEL_DIM}"
        )));
    }

    let flat: Vec<T> = rows.into_iter().flatten().collect();
    Ok(Array2::from_shape_vec((height, width), flat)?)
}

// ============================================================================
// Convolution kernel
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    weights: Array2<f32>,
    anchor: (usize, usize),
}

impl Kernel {
    pub fn new(weights: Array2<f32>, anchor: (usize, usize)) -> Result<Self> {
        let shape = weights.dim();
        if shape.0 == 0 || shape.1 == 0 {
            return Err(EditorError::invalid("kernel must not be empty"));
        }
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(EditorError::invalid("kernel weights must be finite"));
        }
        check_anchor(shape, anchor)?;
        Ok(Self { weights, anchor })
    }

    /// Kernel anchored at its center cell.
    pub fn centered(weights: Array2<f32>) -> Result<Self> {
        let (rows, cols) = weights.dim();
        Self::new(weights, (rows / 2, cols / 2))
    }

    /// Parse a user-entered matrix such as `"0 -1 0\n-1 5 -1\n0 -1 0"`.
    pub fn parse(text: &str) -> Result<Self> {
        Self::centered(parse_matrix::<f32>(text)?)
    }

    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    pub fn anchor(&self) -> (usize, usize) {
        self.anchor
    }

    pub fn sum(&self) -> f32 {
        self.weights.sum()
    }

    /// Divide by the weight sum when it is non-zero; zero-sum kernels
    /// (edge detectors) are returned unchanged.
    pub fn normalized(mut self) -> Self {
        let sum = self.sum();
        if sum != 0.0 {
            self.weights.mapv_inplace(|w| w / sum);
        }
        self
    }

    /// 3x3 sharpen: 9 at the center, -1 around it.
    pub fn sharpen() -> Self {
        let mut weights = Array2::from_elem((3, 3), -1.0f32);
        weights[[1, 1]] = 9.0;
        Self {
            weights,
            anchor: (1, 1),
        }
    }

    /// 3x3 emboss kernel, lit from the top left.
    pub fn emboss() -> Self {
        Self {
            weights: array![[-2.0, -1.0, 0.0], [-1.0, 1.0, 1.0], [0.0, 1.0, 2.0]],
            anchor: (1, 1),
        }
    }

    /// Normalized `size`x`size` mean filter. `size` must be odd and at most
    /// [`MAX_BLUR_SIZE`].
    pub fn box_blur(size: usize) -> Result<Self> {
        if size == 0 || size % 2 == 0 || size > MAX_BLUR_SIZE {
            return Err(EditorError::invalid(format!(
                "box blur size must be odd and 1..={MAX_BLUR_SIZE}, got {size}"
            )));
        }
        let weight = 1.0 / (size * size) as f32;
        Self::centered(Array2::from_elem((size, size), weight))
    }

    /// Normalized 2D Gaussian.
    ///
    /// Kernel size = 6 sigma (covers 99.7% of the distribution), forced odd.
    /// The resulting side may not exceed [`MAX_BLUR_SIZE`].
    pub fn gaussian(sigma: f32) -> Result<Self> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(EditorError::invalid(format!(
                "gaussian sigma must be positive, got {sigma}"
            )));
        }
        let span = (sigma * 6.0).ceil();
        if span > MAX_BLUR_SIZE as f32 {
            return Err(EditorError::invalid(format!(
                "gaussian sigma {sigma} needs a kernel wider than {MAX_BLUR_SIZE}"
            )));
        }

        let size = (span as usize) | 1;
        let half = (size / 2) as f32;
        let k1d: Vec<f32> = (0..size)
            .map(|i| {
                let x = i as f32 - half;
                (-x * x / (2.0 * sigma * sigma)).exp()
            })
            .collect();

        let weights = Array2::from_shape_fn((size, size), |(y, x)| k1d[y] * k1d[x]);
        Ok(Self::centered(weights)?.normalized())
    }

    /// Straight-line blur of `size` taps at `angle` degrees.
    ///
    /// Tap `i` lands on column `trunc(c + (i - c) cos θ)` and row
    /// `trunc(c + (i - c) sin θ)` with `c = size / 2`.
    pub fn motion_blur(size: usize, angle: f32) -> Result<Self> {
        if size == 0 || size > MAX_KERNEL_DIM * 2 {
            return Err(EditorError::invalid(format!(
                "motion blur size must be 1..={}, got {size}",
                MAX_KERNEL_DIM * 2
            )));
        }
        if !angle.is_finite() {
            return Err(EditorError::invalid("motion blur angle must be finite"));
        }

        let mut weights = Array2::<f32>::zeros((size, size));
        let (sin, cos) = (angle as f64).to_radians().sin_cos();
        let center = (size / 2) as f64;

        for i in 0..size {
            let offset = i as f64 - center;
            let x = (center + offset * cos) as isize;
            let y = (center + offset * sin) as isize;
            if (0..size as isize).contains(&x) && (0..size as isize).contains(&y) {
                weights[[y as usize, x as usize]] = 1.0;
            }
        }

        Ok(Self::centered(weights)?.normalized())
    }
}

// ============================================================================
// Structuring element
// ============================================================================

/// Binary footprint for morphology. Non-zero cells are part of the footprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    mask: Array2<bool>,
    anchor: (usize, usize),
}

impl StructuringElement {
    /// Build from a 0/1 (or any non-zero) matrix with an explicit anchor.
    pub fn new(cells: &Array2<u8>, anchor: (usize, usize)) -> Result<Self> {
        let shape = cells.dim();
        if shape.0 == 0 || shape.1 == 0 {
            return Err(EditorError::invalid("structuring element must not be empty"));
        }
        let mask = cells.mapv(|v| v != 0);
        if !mask.iter().any(|&on| on) {
            return Err(EditorError::invalid(
                "structuring element has no active cells",
            ));
        }
        check_anchor(shape, anchor)?;
        Ok(Self { mask, anchor })
    }

    pub fn centered(cells: &Array2<u8>) -> Result<Self> {
        let (rows, cols) = cells.dim();
        Self::new(cells, (rows / 2, cols / 2))
    }

    /// Full `rows`x`cols` rectangle anchored at its center.
    pub fn rect(rows: usize, cols: usize) -> Result<Self> {
        Self::centered(&Array2::from_elem((rows, cols), 1u8))
    }

    /// Plus-shaped element of odd `size`.
    pub fn cross(size: usize) -> Result<Self> {
        if size % 2 == 0 {
            return Err(EditorError::invalid(format!(
                "cross size must be odd, got {size}"
            )));
        }
        let mid = size / 2;
        let cells = Array2::from_shape_fn((size, size), |(y, x)| u8::from(y == mid || x == mid));
        Self::centered(&cells)
    }

    /// Parse a user-entered 0/1 matrix such as `"1 1 1\n1 1 1\n1 1 1"`.
    pub fn parse(text: &str) -> Result<Self> {
        Self::centered(&parse_matrix::<u8>(text)?)
    }

    pub fn mask(&self) -> &Array2<bool> {
        &self.mask
    }

    pub fn anchor(&self) -> (usize, usize) {
        self.anchor
    }

    /// `(dy, dx)` offsets of active cells relative to the anchor.
    pub fn offsets(&self) -> Vec<(isize, isize)> {
        let (ar, ac) = (self.anchor.0 as isize, self.anchor.1 as isize);
        self.mask
            .indexed_iter()
            .filter(|(_, &on)| on)
            .map(|((i, j), _)| (i as isize - ar, j as isize - ac))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kernel() {
        let kernel = Kernel::parse("0 -1 0\n-1 5 -1\n0 -1 0\n").unwrap();
        assert_eq!(kernel.weights().dim(), (3, 3));
        assert_eq!(kernel.anchor(), (1, 1));
        assert_eq!(kernel.sum(), 1.0);
    }

    #[test]
    fn test_parse_rejects_ragged_rows() {
        assert!(Kernel::parse("1 1 1\n1 1").is_err());
    }

    #[test]
    fn test_parse_rejects_garbage_and_empty() {
        assert!(Kernel::parse("1 x 1").is_err());
        assert!(StructuringElement::parse("  \n ").is_err());
    }

    #[test]
    fn test_parse_rejects_oversized() {
        let row = vec!["1"; MAX_KERNEL_DIM + 1].join(" ");
        assert!(StructuringElement::parse(&row).is_err());
    }

    #[test]
    fn test_normalized_divides_by_sum() {
        let kernel = Kernel::centered(Array2::from_elem((2, 2), 2.0)).unwrap().normalized();
        assert!(kernel.weights().iter().all(|&w| (w - 0.25).abs() < 1e-6));
    }

    #[test]
    fn test_normalized_keeps_zero_sum() {
        let weights = Array2::from_shape_vec((1, 3), vec![-1.0, 0.0, 1.0]).unwrap();
        let kernel = Kernel::centered(weights.clone()).unwrap().normalized();
        assert_eq!(kernel.weights(), &weights);
    }

    #[test]
    fn test_gaussian_sums_to_one() {
        let kernel = Kernel::gaussian(1.0).unwrap();
        assert_eq!(kernel.weights().dim(), (7, 7));
        assert!((kernel.sum() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_motion_blur_horizontal_line() {
        let kernel = Kernel::motion_blur(5, 0.0).unwrap();
        for x in 0..5 {
            assert!((kernel.weights()[[2, x]] - 0.2).abs() < 1e-6);
        }
        assert_eq!(kernel.weights()[[0, 0]], 0.0);
    }

    #[test]
    fn test_box_blur_requires_odd_size() {
        assert!(Kernel::box_blur(4).is_err());
        assert!(Kernel::box_blur(3).is_ok());
    }

    #[test]
    fn test_box_blur_size_is_capped() {
        assert_eq!(Kernel::box_blur(MAX_BLUR_SIZE).unwrap().weights().dim(), (51, 51));
        assert!(Kernel::box_blur(MAX_BLUR_SIZE + 2).is_err());
        assert!(Kernel::box_blur((1 << 33) + 1).is_err());
    }

    #[test]
    fn test_gaussian_sigma_is_capped() {
        // ceil(6 * 8.5) = 51, the widest accepted kernel
        assert_eq!(Kernel::gaussian(8.5).unwrap().weights().dim(), (51, 51));
        assert!(Kernel::gaussian(8.6).is_err());
        assert!(Kernel::gaussian(1e12).is_err());
    }

    #[test]
    fn test_anchor_must_be_inside() {
        assert!(Kernel::new(Array2::ones((3, 3)), (3, 0)).is_err());
        assert!(StructuringElement::new(&Array2::ones((2, 2)), (1, 2)).is_err());
    }

    #[test]
    fn test_element_requires_active_cell() {
        assert!(StructuringElement::centered(&Array2::zeros((3, 3))).is_err());
    }

    #[test]
    fn test_cross_offsets() {
        let element = StructuringElement::cross(3).unwrap();
        let mut offsets = element.offsets();
        offsets.sort();
        assert_eq!(offsets, vec![(-1, 0), (0, -1), (0, 0), (0, 1), (1, 0)]);
    }
}
