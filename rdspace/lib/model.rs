//! Physical parameters and the nonlinear growth term of the three-field
//! model
//!
//! ```text
//! ∂t rho1  = D0 ∇²rho1 + g1 G(rho1, rho_b) − K rho1 rho2
//! ∂t rho2  = D0 ∇²rho2 + g2 G(rho2, rho_b) − K rho1 rho2
//! ∂t rho12 =                                2K rho1 rho2
//! ```
//!
//! with total density `rho_b = rho1 + rho2 + rho12` and growth term `G`
//! selected by [`Growth`].

use std::fs::File;
use std::path::Path;
use ndarray as nd;
use ndarray_npy::{ NpzReader, NpzWriter };
use crate::{ error::ArchiveError, utils::npz_entry };

/// Densities below this value contribute no growth under
/// [`Growth::Thresholded`]; numerical noise in depleted regions would
/// otherwise seed spurious regrowth.
pub const GROW_THRESHOLD: f64 = 1e-3;

/// Physical constants loaded from a saved parameter archive; immutable for
/// the duration of one run.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Params {
    /// Diffusion coefficient.
    pub diff: f64,
    /// Interaction (merging) rate.
    pub k: f64,
    /// Growth rate.
    pub g: f64,
}

impl Params {
    /// Read parameters from an npz archive holding arrays named `Diff`, `K`,
    /// and `g` (scalars stored as 0-d or length-1 arrays).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        let file = File::open(path)?;
        let mut npz = NpzReader::new(file)?;
        let diff = scalar(&mut npz, "Diff")?;
        let k = scalar(&mut npz, "K")?;
        let g = scalar(&mut npz, "g")?;
        Ok(Self { diff, k, g })
    }

    /// Write parameters to an npz archive readable by [`Self::load`].
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ArchiveError> {
        let mut npz = NpzWriter::new(File::create(path)?);
        npz.add_array("Diff", &nd::arr1(&[self.diff]))?;
        npz.add_array("K", &nd::arr1(&[self.k]))?;
        npz.add_array("g", &nd::arr1(&[self.g]))?;
        npz.finish()?;
        Ok(())
    }
}

fn scalar(npz: &mut NpzReader<File>, name: &str) -> Result<f64, ArchiveError> {
    let arr: nd::ArrayD<f64> = npz_entry(npz, name)?;
    arr.iter().next().copied()
        .ok_or_else(|| ArchiveError::EmptyEntry(name.into()))
}

/// Pointwise growth term: `a * (1 - b)`, clamped to zero wherever `a` falls
/// below [`GROW_THRESHOLD`].
///
/// *Panics if the arrays differ in shape*.
pub fn grow<S, T, D>(a: &nd::ArrayBase<S, D>, b: &nd::ArrayBase<T, D>)
    -> nd::Array<f64, D>
where
    S: nd::Data<Elem = f64>,
    T: nd::Data<Elem = f64>,
    D: nd::Dimension,
{
    nd::Zip::from(a).and(b)
        .map_collect(|&ak, &bk| {
            if ak < GROW_THRESHOLD { 0.0 } else { ak * (1.0 - bk) }
        })
}

/// Selects the form of the growth term `G(a, b)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Growth {
    /// [`grow`]: `a * (1 - b)` with sub-threshold clamping.
    Thresholded,
    /// Plain logistic form `a * (1 - b)`.
    Logistic,
}

impl Growth {
    pub(crate) fn eval<S, T, D>(
        self,
        a: &nd::ArrayBase<S, D>,
        b: &nd::ArrayBase<T, D>,
    ) -> nd::Array<f64, D>
    where
        S: nd::Data<Elem = f64>,
        T: nd::Data<Elem = f64>,
        D: nd::Dimension,
    {
        match self {
            Self::Thresholded => grow(a, b),
            Self::Logistic => {
                nd::Zip::from(a).and(b)
                    .map_collect(|&ak, &bk| ak * (1.0 - bk))
            },
        }
    }
}

/// The full coefficient set of one problem instance.
#[derive(Copy, Clone, Debug)]
pub struct Coefficients {
    /// Diffusion coefficient `D0`.
    pub d0: f64,
    /// Interaction rate `K`.
    pub k: f64,
    /// Growth rate of the first population.
    pub g1: f64,
    /// Growth rate of the second population.
    pub g2: f64,
    /// Growth-term variant.
    pub growth: Growth,
}

impl Coefficients {
    /// Build coefficients from a loaded archive with both growth rates equal
    /// to the archived `g`.
    pub fn symmetric(params: &Params, growth: Growth) -> Self {
        Self {
            d0: params.diff,
            k: params.k,
            g1: params.g,
            g2: params.g,
            growth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grow_clamps_below_threshold() {
        let a = nd::array![0.0, 5e-4, 1e-3, 0.5, 1.0];
        let b = nd::array![0.2, 0.2, 0.2, 0.2, 0.2];
        let f = grow(&a, &b);
        assert_eq!(f.shape(), a.shape());
        assert_eq!(f[0], 0.0);
        assert_eq!(f[1], 0.0);
        assert!((f[2] - 1e-3 * 0.8).abs() < 1e-15);
        assert!((f[3] - 0.4).abs() < 1e-15);
        assert!((f[4] - 0.8).abs() < 1e-15);
    }

    #[test]
    fn grow_bounded_by_first_argument() {
        let a: nd::Array1<f64> = nd::Array1::linspace(0.0, 1.0, 101);
        let b: nd::Array1<f64> = nd::Array1::linspace(0.0, 1.0, 101);
        let f = grow(&a, &b);
        for (fk, ak) in f.iter().zip(&a) {
            assert!(*fk <= *ak);
        }
    }

    #[test]
    fn grow_matches_logistic_above_threshold() {
        let a = nd::array![[0.3, 0.7], [1.0, 0.4]];
        let b = nd::array![[0.1, 0.5], [1.2, 0.0]];
        let thr = Growth::Thresholded.eval(&a, &b);
        let log = Growth::Logistic.eval(&a, &b);
        assert_eq!(thr, log);
    }

    #[test]
    fn params_roundtrip_through_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Parameters.npz");
        let params = Params { diff: 1.5e-3, k: 0.25, g: 0.08 };
        params.save(&path).unwrap();
        let loaded = Params::load(&path).unwrap();
        assert_eq!(params, loaded);
    }

    #[test]
    fn missing_entry_is_reported_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.npz");
        let mut npz
            = NpzWriter::new(std::fs::File::create(&path).unwrap());
        npz.add_array("Diff", &nd::arr1(&[1.0])).unwrap();
        npz.finish().unwrap();
        match Params::load(&path) {
            Err(ArchiveError::MissingEntry { name, .. }) => {
                assert_eq!(name, "K");
            },
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
