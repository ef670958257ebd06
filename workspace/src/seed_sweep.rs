use std::{ env, fs };
use log::info;
use ndarray as nd;
use lib::{ render_density, LOG_CADENCE, PARAMS_FILE };
use rdspace::{
    grid::{ Basis, Domain2 },
    model::{ Coefficients, Growth, Params },
    output::{ merge_shards, FileHandler, RunOutput },
    profile::blob2,
    solver::Solver2,
};

// run simulations over a range of seeding ratios and save an image of the
// final time point of each run

const LX: f64 = 35.0;
const LY: f64 = 25.0;
const NX: usize = 400;
const NY: usize = 400;

const R0: f64 = 0.75; // core radius
const W: f64 = 0.22; // transition width

const STOP_SIM_TIME: f64 = 500.0;
const SNAPSHOT_DT: f64 = 1.0;
const MAX_WRITES: usize = 500;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let params = Params::load(PARAMS_FILE)?;
    let kvals: nd::Array1<f64> = nd::Array1::linspace(0.0, 5.0, 15);
    for &k in kvals.iter() {
        run_one(k, &params)?;
    }
    Ok(())
}

fn run_one(k: f64, params: &Params) -> anyhow::Result<()> {
    let name = format!("diff_seed_{:.0}_r", 100.0 * k);
    info!("{name}");

    let domain = Domain2::new(
        Basis::fourier(NX, (0.0, LX)),
        Basis::fourier(NY, (0.0, LY)),
    );
    let coeffs = Coefficients::symmetric(params, Growth::Thresholded);
    let mut solver = Solver2::new(&domain, coeffs);
    solver.stop_sim_time = STOP_SIM_TIME;

    let (x, y) = domain.grids();
    solver.rho1.assign(
        &blob2(&x, &y, (LX * 0.5 - 4.5, LY * 0.5), k * 1.25 + R0, W));
    solver.rho2.assign(
        &blob2(&x, &y, (LX * 0.5 + 4.5, LY * 0.5), R0, W));

    let dt = 0.4 * LX / NX as f64;
    let folder = env::current_dir()?.join(&name);
    fs::create_dir(&folder)?;
    let mut handler = FileHandler::new(
        &folder, &name, x, y, SNAPSHOT_DT, MAX_WRITES);
    handler.process(&solver)?;

    info!("Starting loop");
    while solver.ok() {
        solver.step(dt)?;
        handler.process(&solver)?;
        if solver.iteration % LOG_CADENCE == 0 {
            info!(
                "Iteration: {}, Time: {:e}, dt: {:e}",
                solver.iteration, solver.sim_time, dt,
            );
        }
    }
    handler.close()?;

    let merged = merge_shards(&folder, &name)?;
    let out = RunOutput::load(&merged)?;
    let rho_t = out.total_density();
    let last = rho_t.index_axis(nd::Axis(0), out.writes() - 1);
    render_density(format!("{name}.png"), &last, 0.6, 1.08)?;
    Ok(())
}
