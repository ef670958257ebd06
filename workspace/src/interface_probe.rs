use std::fs::File;
use log::info;
use ndarray as nd;
use ndarray_npy::NpzWriter;
use lib::{ LOG_CADENCE, PARAMS_FILE };
use rdspace::{
    grid::{ Basis, Domain1 },
    model::{ Coefficients, Growth, Params },
    post::{ interface_width, rescale, INTERFACE_THRESHOLD },
    profile::blob,
    solver::Solver1,
};

// measure the width of the interface left between two initially separated
// populations after the fronts have collided

const LX: f64 = 9.0; // mm
const NX: usize = 256;

const R0: f64 = 0.75; // mm
const W: f64 = 0.15; // mm

const STOP_SIM_TIME: f64 = 80.0; // minutes
const SCALE: usize = 24; // output-resolution multiplier

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let params = Params::load(PARAMS_FILE)?;
    let (width, x, rho1, rho2, rho12) = probe(&params)?;
    info!("interface width: {width:.6} mm");

    let mut npz = NpzWriter::new(File::create("interface_probe.npz")?);
    npz.add_array("x", &x)?;
    npz.add_array("rho1", &rho1)?;
    npz.add_array("rho2", &rho2)?;
    npz.add_array("rho12", &rho12)?;
    npz.add_array("width", &nd::arr1(&[width]))?;
    npz.finish()?;
    Ok(())
}

type Probe = (f64, nd::Array1<f64>, nd::Array1<f64>, nd::Array1<f64>, nd::Array1<f64>);

fn probe(params: &Params) -> anyhow::Result<Probe> {
    let basis = Basis::fourier(NX, (0.0, LX));
    let domain = Domain1::new(basis);
    let coeffs = Coefficients::symmetric(params, Growth::Logistic);
    let mut solver = Solver1::new(&domain, coeffs);
    solver.stop_sim_time = STOP_SIM_TIME;

    let x = basis.grid();
    // 2 blobs, 5 mm apart
    solver.rho1.assign(&blob(&x, 2.0, R0, W));
    solver.rho2.assign(&blob(&x, 7.0, R0, W));

    let dt = 0.4 * LX / NX as f64;
    info!("Starting loop");
    while solver.ok() {
        solver.step(dt)?;
        if solver.iteration % LOG_CADENCE == 0 {
            info!(
                "Iteration: {}, Time: {:e}, dt: {:e}",
                solver.iteration, solver.sim_time, dt,
            );
        }
    }

    let x_fine = Basis::fourier(NX * SCALE, (0.0, LX)).grid();
    let rho1 = rescale(&solver.rho1, SCALE);
    let rho2 = rescale(&solver.rho2, SCALE);
    let rho12 = rescale(&solver.rho12, SCALE);
    let width = interface_width(
        &x_fine, &rho1, &rho2, &rho12, INTERFACE_THRESHOLD)?;
    Ok((width, x_fine, rho1, rho2, rho12))
}
