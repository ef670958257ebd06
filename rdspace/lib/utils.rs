//! Miscellaneous tools.

use std::io::{ Read, Seek };
use ndarray::{ self as nd, Ix1, Ix2 };
use ndarray_npy::NpzReader;
use num_complex::Complex64 as C64;
use rustfft as fft;
use crate::error::ArchiveError;

/// Perform the one-dimensional, complex-valued FFT.
pub fn fft<S>(x: &nd::ArrayBase<S, Ix1>) -> nd::Array1<C64>
where S: nd::Data<Elem = C64>
{
    let n: usize = x.len();
    let mut f = x.to_owned();
    let mut plan = fft::FftPlanner::new();
    let fft_plan = plan.plan_fft_forward(n);
    fft_plan.process(f.as_slice_mut().unwrap());
    f
}

/// Perform the one-dimensional, complex-valued FFT in place.
pub fn fft_inplace<S>(f: &mut nd::ArrayBase<S, Ix1>)
where S: nd::DataMut<Elem = C64>
{
    let n: usize = f.len();
    let mut plan = fft::FftPlanner::new();
    let fft_plan = plan.plan_fft_forward(n);
    fft_plan.process(f.as_slice_mut().unwrap());
}

/// Perform the one-dimensional, complex-valued inverse FFT.
pub fn ifft<S>(f: &nd::ArrayBase<S, Ix1>) -> nd::Array1<C64>
where S: nd::Data<Elem = C64>
{
    let n: usize = f.len();
    let mut x = f.to_owned();
    let mut plan = fft::FftPlanner::new();
    let ifft_plan = plan.plan_fft_inverse(n);
    ifft_plan.process(x.as_slice_mut().unwrap());
    let n = n as f64;
    x.map_inplace(|xk| { *xk /= n; });
    x
}

/// Perform the one-dimensional, complex-valued inverse FFT in place.
pub fn ifft_inplace<S>(x: &mut nd::ArrayBase<S, Ix1>)
where S: nd::DataMut<Elem = C64>
{
    let n: usize = x.len();
    let mut plan = fft::FftPlanner::new();
    let ifft_plan = plan.plan_fft_inverse(n);
    ifft_plan.process(x.as_slice_mut().unwrap());
    let n = n as f64;
    x.map_inplace(|xk| { *xk /= n; });
}

// transform the columns of a standard-layout 2D array through a scratch
// buffer; rows are contiguous and are processed directly
fn process_axes<S>(f: &mut nd::ArrayBase<S, Ix2>, forward: bool)
where S: nd::DataMut<Elem = C64>
{
    let (nx, ny) = f.dim();
    let mut plan = fft::FftPlanner::new();
    let row_plan
        = if forward { plan.plan_fft_forward(ny) }
        else { plan.plan_fft_inverse(ny) };
    for mut row in f.rows_mut() {
        row_plan.process(row.as_slice_mut().unwrap());
    }
    let col_plan
        = if forward { plan.plan_fft_forward(nx) }
        else { plan.plan_fft_inverse(nx) };
    let mut buf: Vec<C64> = vec![C64::from(0.0); nx];
    for j in 0..ny {
        for (i, bk) in buf.iter_mut().enumerate() { *bk = f[[i, j]]; }
        col_plan.process(&mut buf);
        for (i, bk) in buf.iter().enumerate() { f[[i, j]] = *bk; }
    }
}

/// Perform the two-dimensional, complex-valued FFT in place.
pub fn fft2_inplace<S>(f: &mut nd::ArrayBase<S, Ix2>)
where S: nd::DataMut<Elem = C64>
{
    process_axes(f, true);
}

/// Perform the two-dimensional, complex-valued inverse FFT in place.
pub fn ifft2_inplace<S>(x: &mut nd::ArrayBase<S, Ix2>)
where S: nd::DataMut<Elem = C64>
{
    process_axes(x, false);
    let norm = (x.len()) as f64;
    x.map_inplace(|xk| { *xk /= norm; });
}

// fetch a named f64 array from an npz archive, tolerating the `.npy` entry
// suffix that numpy's savez applies
pub(crate) fn npz_entry<R, D>(npz: &mut NpzReader<R>, name: &str)
    -> Result<nd::Array<f64, D>, ArchiveError>
where
    R: Read + Seek,
    D: nd::Dimension,
{
    match npz.by_name(name) {
        Ok(arr) => Ok(arr),
        Err(_) => {
            npz.by_name(&format!("{name}.npy"))
                .map_err(|source| {
                    ArchiveError::MissingEntry { name: name.into(), source }
                })
        },
    }
}
