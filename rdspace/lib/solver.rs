//! Fixed-step pseudo-spectral integration of the coupled three-field system.
//!
//! Each step is Strang-split: the pointwise reaction terms advance by a half
//! step with a fourth-order Runge-Kutta rule, diffusion is applied exactly in
//! Fourier space over the full step, and the reaction terms advance the
//! remaining half. The merged density `rho12` carries no diffusion term and
//! only participates in the reaction substeps.
//!
//! There is no adaptive stepping and no checkpointing; a numerically
//! diverging run surfaces as [`SolverError::NonFinite`] from [`Solver1::step`]
//! or [`Solver2::step`].

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    error::SolverError,
    grid::{ Domain1, Domain2 },
    model::Coefficients,
    utils::{ fft_inplace, ifft_inplace, fft2_inplace, ifft2_inplace },
};

pub type SolverResult<T> = Result<T, SolverError>;

// evaluate the reaction-only time derivatives of all three fields
fn reaction_rhs<D>(
    c: &Coefficients,
    rho1: &nd::Array<f64, D>,
    rho2: &nd::Array<f64, D>,
    rho12: &nd::Array<f64, D>,
) -> (nd::Array<f64, D>, nd::Array<f64, D>, nd::Array<f64, D>)
where D: nd::Dimension
{
    let rho_b: nd::Array<f64, D>
        = nd::Zip::from(rho1).and(rho2).and(rho12)
        .map_collect(|&a, &b, &m| a + b + m);
    let grow1 = c.growth.eval(rho1, &rho_b);
    let grow2 = c.growth.eval(rho2, &rho_b);
    let react: nd::Array<f64, D>
        = nd::Zip::from(rho1).and(rho2)
        .map_collect(|&a, &b| c.k * a * b);
    let d1 = nd::Zip::from(&grow1).and(&react)
        .map_collect(|&g, &r| c.g1 * g - r);
    let d2 = nd::Zip::from(&grow2).and(&react)
        .map_collect(|&g, &r| c.g2 * g - r);
    let d12 = react.mapv(|r| 2.0 * r);
    (d1, d2, d12)
}

// perform the operation `a + v * b` succinctly
fn array_step<D>(a: &nd::Array<f64, D>, v: f64, b: &nd::Array<f64, D>)
    -> nd::Array<f64, D>
where D: nd::Dimension
{
    nd::Zip::from(a).and(b)
        .map_collect(|&ak, &bk| ak + v * bk)
}

fn accumulate<D>(
    q: &mut nd::Array<f64, D>,
    h: f64,
    k1: &nd::Array<f64, D>,
    k2: &nd::Array<f64, D>,
    k3: &nd::Array<f64, D>,
    k4: &nd::Array<f64, D>,
)
where D: nd::Dimension
{
    nd::Zip::from(q).and(k1).and(k2).and(k3).and(k4)
        .for_each(|qk, &k1k, &k2k, &k3k, &k4k| {
            *qk += h / 6.0 * (k1k + 2.0 * (k2k + k3k) + k4k);
        });
}

// take a single RK4 reaction substep of size `h` *in place*
fn reaction_step<D>(
    c: &Coefficients,
    rho1: &mut nd::Array<f64, D>,
    rho2: &mut nd::Array<f64, D>,
    rho12: &mut nd::Array<f64, D>,
    h: f64,
)
where D: nd::Dimension
{
    let (k1a, k1b, k1c) = reaction_rhs(c, rho1, rho2, rho12);
    let (k2a, k2b, k2c) = reaction_rhs(
        c,
        &array_step(rho1, h / 2.0, &k1a),
        &array_step(rho2, h / 2.0, &k1b),
        &array_step(rho12, h / 2.0, &k1c),
    );
    let (k3a, k3b, k3c) = reaction_rhs(
        c,
        &array_step(rho1, h / 2.0, &k2a),
        &array_step(rho2, h / 2.0, &k2b),
        &array_step(rho12, h / 2.0, &k2c),
    );
    let (k4a, k4b, k4c) = reaction_rhs(
        c,
        &array_step(rho1, h, &k3a),
        &array_step(rho2, h, &k3b),
        &array_step(rho12, h, &k3c),
    );
    accumulate(rho1, h, &k1a, &k2a, &k3a, &k4a);
    accumulate(rho2, h, &k1b, &k2b, &k3b, &k4b);
    accumulate(rho12, h, &k1c, &k2c, &k3c, &k4c);
}

// apply the exact diffusion propagator exp(-D0 k² dt) in Fourier space
fn apply_diffusion1(
    ksq: &nd::Array1<f64>,
    d0: f64,
    dt: f64,
    rho: &mut nd::Array1<f64>,
) {
    let mut buf: nd::Array1<C64> = rho.mapv(C64::from);
    fft_inplace(&mut buf);
    nd::Zip::from(&mut buf).and(ksq)
        .for_each(|qk, &k2| { *qk *= (-d0 * k2 * dt).exp(); });
    ifft_inplace(&mut buf);
    nd::Zip::from(rho).and(&buf)
        .for_each(|rk, &qk| { *rk = qk.re; });
}

fn apply_diffusion2(
    kx_sq: &nd::Array1<f64>,
    ky_sq: &nd::Array1<f64>,
    d0: f64,
    dt: f64,
    rho: &mut nd::Array2<f64>,
) {
    let mut buf: nd::Array2<C64> = rho.mapv(C64::from);
    fft2_inplace(&mut buf);
    nd::Zip::indexed(&mut buf)
        .for_each(|(i, j), qk| {
            *qk *= (-d0 * (kx_sq[i] + ky_sq[j]) * dt).exp();
        });
    ifft2_inplace(&mut buf);
    nd::Zip::from(rho).and(&buf)
        .for_each(|rk, &qk| { *rk = qk.re; });
}

fn check_finite<D>(
    iteration: usize,
    sim_time: f64,
    fields: [&nd::Array<f64, D>; 3],
) -> SolverResult<()>
where D: nd::Dimension
{
    fields.iter()
        .all(|f| f.iter().all(|v| v.is_finite()))
        .then_some(())
        .ok_or(SolverError::NonFinite { iteration, sim_time })
}

/// IVP solver state on a one-dimensional periodic domain.
///
/// Density fields are public and seeded directly before the run loop starts.
#[derive(Clone, Debug)]
pub struct Solver1 {
    coeffs: Coefficients,
    ksq: nd::Array1<f64>,
    /// First population density.
    pub rho1: nd::Array1<f64>,
    /// Second population density.
    pub rho2: nd::Array1<f64>,
    /// Merged population density.
    pub rho12: nd::Array1<f64>,
    /// Current simulation time.
    pub sim_time: f64,
    /// Number of completed steps.
    pub iteration: usize,
    /// Simulation time at which [`Self::ok`] turns false.
    pub stop_sim_time: f64,
}

impl Solver1 {
    /// Construct a solver with all fields zeroed.
    pub fn new(domain: &Domain1, coeffs: Coefficients) -> Self {
        let n = domain.x.n;
        Self {
            coeffs,
            ksq: domain.x.wavenumbers_sq(),
            rho1: nd::Array1::zeros(n),
            rho2: nd::Array1::zeros(n),
            rho12: nd::Array1::zeros(n),
            sim_time: 0.0,
            iteration: 0,
            stop_sim_time: f64::INFINITY,
        }
    }

    /// The run-loop condition: true while the stop time has not been reached.
    pub fn ok(&self) -> bool { self.sim_time < self.stop_sim_time }

    /// Advance the state by one step of size `dt`.
    pub fn step(&mut self, dt: f64) -> SolverResult<()> {
        SolverError::check_dt(dt)?;
        let c = self.coeffs;
        reaction_step(
            &c, &mut self.rho1, &mut self.rho2, &mut self.rho12, dt / 2.0);
        apply_diffusion1(&self.ksq, c.d0, dt, &mut self.rho1);
        apply_diffusion1(&self.ksq, c.d0, dt, &mut self.rho2);
        reaction_step(
            &c, &mut self.rho1, &mut self.rho2, &mut self.rho12, dt / 2.0);
        self.sim_time += dt;
        self.iteration += 1;
        check_finite(
            self.iteration,
            self.sim_time,
            [&self.rho1, &self.rho2, &self.rho12],
        )
    }
}

/// IVP solver state on a two-dimensional rectangular periodic domain.
///
/// Fields are indexed `[i, j]` over the x and y grids.
#[derive(Clone, Debug)]
pub struct Solver2 {
    coeffs: Coefficients,
    kx_sq: nd::Array1<f64>,
    ky_sq: nd::Array1<f64>,
    /// First population density.
    pub rho1: nd::Array2<f64>,
    /// Second population density.
    pub rho2: nd::Array2<f64>,
    /// Merged population density.
    pub rho12: nd::Array2<f64>,
    /// Current simulation time.
    pub sim_time: f64,
    /// Number of completed steps.
    pub iteration: usize,
    /// Simulation time at which [`Self::ok`] turns false.
    pub stop_sim_time: f64,
}

impl Solver2 {
    /// Construct a solver with all fields zeroed.
    pub fn new(domain: &Domain2, coeffs: Coefficients) -> Self {
        let shape = (domain.x.n, domain.y.n);
        Self {
            coeffs,
            kx_sq: domain.x.wavenumbers_sq(),
            ky_sq: domain.y.wavenumbers_sq(),
            rho1: nd::Array2::zeros(shape),
            rho2: nd::Array2::zeros(shape),
            rho12: nd::Array2::zeros(shape),
            sim_time: 0.0,
            iteration: 0,
            stop_sim_time: f64::INFINITY,
        }
    }

    /// The run-loop condition: true while the stop time has not been reached.
    pub fn ok(&self) -> bool { self.sim_time < self.stop_sim_time }

    /// Advance the state by one step of size `dt`.
    pub fn step(&mut self, dt: f64) -> SolverResult<()> {
        SolverError::check_dt(dt)?;
        let c = self.coeffs;
        reaction_step(
            &c, &mut self.rho1, &mut self.rho2, &mut self.rho12, dt / 2.0);
        apply_diffusion2(&self.kx_sq, &self.ky_sq, c.d0, dt, &mut self.rho1);
        apply_diffusion2(&self.kx_sq, &self.ky_sq, c.d0, dt, &mut self.rho2);
        reaction_step(
            &c, &mut self.rho1, &mut self.rho2, &mut self.rho12, dt / 2.0);
        self.sim_time += dt;
        self.iteration += 1;
        check_finite(
            self.iteration,
            self.sim_time,
            [&self.rho1, &self.rho2, &self.rho12],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ grid::Basis, model::{ Growth, Params }, profile::blob };

    fn coeffs(growth: Growth) -> Coefficients {
        let params = Params { diff: 1e-3, k: 0.1, g: 0.5 };
        Coefficients::symmetric(&params, growth)
    }

    #[test]
    fn rejects_non_positive_dt() {
        let domain = Domain1::new(Basis::fourier(16, (0.0, 1.0)));
        let mut solver = Solver1::new(&domain, coeffs(Growth::Logistic));
        assert!(matches!(solver.step(0.0), Err(SolverError::BadDt(_))));
        assert!(matches!(solver.step(-0.1), Err(SolverError::BadDt(_))));
        assert_eq!(solver.iteration, 0);
    }

    #[test]
    fn saturated_uniform_state_is_stationary() {
        let domain = Domain1::new(Basis::fourier(32, (0.0, 4.0)));
        let mut solver = Solver1::new(&domain, coeffs(Growth::Logistic));
        solver.rho1.fill(1.0);
        for _ in 0..10 {
            solver.step(0.01).unwrap();
        }
        for v in solver.rho1.iter() {
            assert!((*v - 1.0).abs() < 1e-9);
        }
        assert_eq!(solver.iteration, 10);
        assert!((solver.sim_time - 0.1).abs() < 1e-12);
    }

    #[test]
    fn seeded_blob_grows() {
        let domain = Domain1::new(Basis::fourier(64, (0.0, 9.0)));
        let mut solver = Solver1::new(&domain, coeffs(Growth::Logistic));
        let x = domain.x.grid();
        solver.rho1.assign(&blob(&x, 4.5, 0.75, 0.15));
        let mass0 = solver.rho1.sum();
        for _ in 0..50 {
            solver.step(0.01).unwrap();
        }
        assert!(solver.rho1.sum() > mass0);
    }

    #[test]
    fn interaction_conserves_total_mass_without_growth() {
        let domain = Domain1::new(Basis::fourier(32, (0.0, 4.0)));
        let params = Params { diff: 1e-3, k: 0.3, g: 0.0 };
        let c = Coefficients::symmetric(&params, Growth::Logistic);
        let mut solver = Solver1::new(&domain, c);
        solver.rho1.fill(0.5);
        solver.rho2.fill(0.5);
        let total0
            = solver.rho1.sum() + solver.rho2.sum() + solver.rho12.sum();
        for _ in 0..20 {
            solver.step(0.05).unwrap();
        }
        let total
            = solver.rho1.sum() + solver.rho2.sum() + solver.rho12.sum();
        assert!((total - total0).abs() < 1e-9);
        assert!(solver.rho12.sum() > 0.0);
        assert!(solver.rho1.sum() < 0.5 * 32.0);
    }

    #[test]
    fn separated_blobs_produce_no_merged_density_at_first() {
        let domain = Domain1::new(Basis::fourier(128, (0.0, 9.0)));
        let mut solver = Solver1::new(&domain, coeffs(Growth::Thresholded));
        let x = domain.x.grid();
        solver.rho1.assign(&blob(&x, 2.0, 0.75, 0.15));
        solver.rho2.assign(&blob(&x, 7.0, 0.75, 0.15));
        solver.step(0.01).unwrap();
        // fronts have not met yet; the product rho1*rho2 is only tail overlap
        assert!(solver.rho12.sum() < 1e-6);
    }

    #[test]
    fn stop_time_gates_the_run_loop() {
        let domain = Domain1::new(Basis::fourier(16, (0.0, 1.0)));
        let mut solver = Solver1::new(&domain, coeffs(Growth::Logistic));
        solver.stop_sim_time = 0.05;
        let mut steps = 0;
        while solver.ok() {
            solver.step(0.02).unwrap();
            steps += 1;
        }
        assert_eq!(steps, 3);
        assert!(solver.sim_time >= solver.stop_sim_time);
    }
}
