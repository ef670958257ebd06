//! Smoothed "blob" profiles used to seed density fields before integration.
//!
//! A blob is ≈1 inside a core radius around its center and ≈0 outside,
//! transitioning through a hyperbolic tangent over a given width.
//!
//! ```
//! use ndarray as nd;
//! use rdspace::profile::blob;
//!
//! let x: nd::Array1<f64> = nd::Array1::linspace(0.0, 4.0, 5);
//! let p = blob(&x, 2.0, 0.75, 0.22);
//! assert!(p[2] > 0.99);
//! assert!(p[0] < 0.01);
//! ```

use ndarray as nd;
use crate::Arr1;

/// Evaluate a one-dimensional blob profile centered at `x0` with core radius
/// `r0` and transition width `w`.
pub fn blob<S>(x: &Arr1<S>, x0: f64, r0: f64, w: f64) -> nd::Array1<f64>
where S: nd::Data<Elem = f64>
{
    x.mapv(|xk| 0.5 * (1.0 - (((xk - x0).abs() - r0) / w).tanh()))
}

/// Evaluate a two-dimensional radial blob profile centered at `(x0, y0)`.
///
/// The output is indexed `[i, j]` over the coordinate arrays `x` and `y`.
pub fn blob2<S, T>(
    x: &Arr1<S>,
    y: &Arr1<T>,
    center: (f64, f64),
    r0: f64,
    w: f64,
) -> nd::Array2<f64>
where
    S: nd::Data<Elem = f64>,
    T: nd::Data<Elem = f64>,
{
    let (x0, y0) = center;
    nd::Array2::from_shape_fn((x.len(), y.len()), |(i, j)| {
        let r = (x[i] - x0).hypot(y[j] - y0);
        0.5 * (1.0 - ((r - r0) / w).tanh())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_value_is_exact_midpoint() {
        let x = nd::array![0.0, 1.0, 2.0, 3.0, 4.0];
        let p = blob(&x, 2.0, 0.75, 0.22);
        let expected = 0.5 * (1.0 - (-0.75_f64 / 0.22).tanh());
        assert!((p[2] - expected).abs() < 1e-15);
        assert!(p[2] > 0.99);
    }

    #[test]
    fn peak_at_center_and_monotone_flanks() {
        let x = nd::array![0.0, 1.0, 2.0, 3.0, 4.0];
        let p = blob(&x, 2.0, 0.75, 0.22);
        assert!(p[2] > p[1] && p[1] > p[0]);
        assert!(p[2] > p[3] && p[3] > p[4]);
    }

    #[test]
    fn symmetric_about_center() {
        let x: nd::Array1<f64> = nd::Array1::linspace(-3.0, 3.0, 61);
        let p = blob(&x, 0.0, 0.75, 0.15);
        let n = p.len();
        for i in 0..n {
            assert!((p[i] - p[n - 1 - i]).abs() < 1e-12);
        }
    }

    #[test]
    fn far_field_vanishes() {
        let x = nd::array![50.0];
        let p = blob(&x, 0.0, 0.75, 0.22);
        assert!(p[0] < 1e-12);
    }

    #[test]
    fn radial_blob_matches_axial_cut() {
        let x: nd::Array1<f64> = nd::Array1::linspace(0.0, 4.0, 17);
        let y = nd::array![1.0];
        let p2 = blob2(&x, &y, (2.0, 1.0), 0.75, 0.22);
        let p1 = blob(&x, 2.0, 0.75, 0.22);
        for i in 0..x.len() {
            assert!((p2[[i, 0]] - p1[i]).abs() < 1e-15);
        }
    }
}
