//! Post-processing diagnostics on final-time fields.

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    Arr1,
    error::{ LengthError, PostError },
    utils::{ fft, ifft_inplace },
};

pub type PostResult<T> = Result<T, PostError>;

/// Points where a combined indicator `rho + rho12/2` falls below this value
/// are considered outside the corresponding population.
pub const INTERFACE_THRESHOLD: f64 = 0.1;

/// Resample a field onto a grid `scale` times finer by Fourier
/// interpolation, i.e. zero-padding the spectrum.
///
/// Values at the original grid points are preserved; a `scale` of 1 or less
/// returns the input unchanged.
pub fn rescale<S>(f: &Arr1<S>, scale: usize) -> nd::Array1<f64>
where S: nd::Data<Elem = f64>
{
    if scale <= 1 {
        return f.to_owned();
    }
    let n = f.len();
    let nn = n * scale;
    let spectrum = fft(&f.mapv(C64::from));
    let mut padded: nd::Array1<C64> = nd::Array1::zeros(nn);
    if n % 2 == 0 {
        let m = n / 2;
        for i in 0..m {
            padded[i] = spectrum[i];
        }
        // split the Nyquist bin symmetrically to keep the result real
        padded[m] = 0.5 * spectrum[m];
        padded[nn - m] = 0.5 * spectrum[m];
        for i in m + 1..n {
            padded[nn - n + i] = spectrum[i];
        }
    } else {
        let m = (n + 1) / 2;
        for i in 0..m {
            padded[i] = spectrum[i];
        }
        for i in m..n {
            padded[nn - n + i] = spectrum[i];
        }
    }
    ifft_inplace(&mut padded);
    padded.mapv(|z| z.re * scale as f64)
}

/// Width of the boundary region between the two populations.
///
/// Along the coordinate axis `x`, finds the smallest coordinate at which
/// `rho1 + rho12/2` falls below `threshold` and the largest coordinate at
/// which `rho2 + rho12/2` does, and returns the difference. For saturated
/// fields this is the gap between the surviving pure-population cores.
///
/// Fails with [`PostError::NoInterface`] when either indicator never drops
/// below the threshold, e.g. when the populations have fully merged.
pub fn interface_width<S, T, U, V>(
    x: &Arr1<S>,
    rho1: &Arr1<T>,
    rho2: &Arr1<U>,
    rho12: &Arr1<V>,
    threshold: f64,
) -> PostResult<f64>
where
    S: nd::Data<Elem = f64>,
    T: nd::Data<Elem = f64>,
    U: nd::Data<Elem = f64>,
    V: nd::Data<Elem = f64>,
{
    LengthError::check(x, rho1)?;
    LengthError::check(x, rho2)?;
    LengthError::check(x, rho12)?;
    let mut lo: Option<f64> = None;
    let mut hi: Option<f64> = None;
    let points
        = x.iter().zip(rho1).zip(rho2).zip(rho12)
        .map(|(((&xk, &r1), &r2), &r12)| (xk, r1, r2, r12));
    for (xk, r1, r2, r12) in points {
        if r1 + 0.5 * r12 < threshold {
            lo = Some(lo.map_or(xk, |v: f64| v.min(xk)));
        }
        if r2 + 0.5 * r12 < threshold {
            hi = Some(hi.map_or(xk, |v: f64| v.max(xk)));
        }
    }
    match (lo, hi) {
        (Some(lo), Some(hi)) => Ok(lo - hi),
        _ => Err(PostError::NoInterface(threshold)),
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::TAU;
    use super::*;
    use crate::{ grid::Basis, profile::blob };

    #[test]
    fn rescale_preserves_original_nodes() {
        let n = 16;
        let basis = Basis::fourier(n, (0.0, 1.0));
        let x = basis.grid();
        let f = x.mapv(|xk| (TAU * xk).cos() + 0.5 * (2.0 * TAU * xk).sin());
        let fine = rescale(&f, 3);
        assert_eq!(fine.len(), 3 * n);
        for i in 0..n {
            assert!((fine[3 * i] - f[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn rescale_identity_below_two() {
        let f = nd::array![1.0, 2.0, 3.0];
        assert_eq!(rescale(&f, 1), f);
        assert_eq!(rescale(&f, 0), f);
    }

    #[test]
    fn width_of_saturated_populations() {
        // post-run configuration: each population fills the domain except
        // for a dip carved out by the other one
        let basis = Basis::fourier(2048, (0.0, 9.0));
        let x = basis.grid();
        let rho1 = blob(&x, 7.0, 1.0, 0.15).mapv(|v| 1.0 - v);
        let rho2 = blob(&x, 2.0, 1.0, 0.15).mapv(|v| 1.0 - v);
        let rho12 = nd::Array1::zeros(x.len());
        let width
            = interface_width(&x, &rho1, &rho2, &rho12, INTERFACE_THRESHOLD)
            .unwrap();
        assert!(width > 0.0);
        assert!(width < basis.length());
        // the dips are 5 apart and each is ~2 wide, so the pure cores sit
        // roughly 3 apart
        assert!((width - 3.0).abs() < 0.5);
    }

    #[test]
    fn merged_populations_have_no_interface() {
        let basis = Basis::fourier(128, (0.0, 9.0));
        let x = basis.grid();
        let ones: nd::Array1<f64> = nd::Array1::ones(x.len());
        let zeros: nd::Array1<f64> = nd::Array1::zeros(x.len());
        let res
            = interface_width(&x, &ones, &ones, &zeros, INTERFACE_THRESHOLD);
        assert!(matches!(res, Err(PostError::NoInterface(_))));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let x = nd::array![0.0, 1.0, 2.0];
        let short = nd::array![0.0, 1.0];
        let z = nd::Array1::zeros(3);
        let res = interface_width(&x, &short, &z, &z, 0.1);
        assert!(matches!(res, Err(PostError::Length(_))));
    }
}
