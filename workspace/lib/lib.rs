//! Helpers shared by the sweep and measurement binaries.

use std::path::Path;
use ndarray as nd;
use plotters::prelude::*;
use rdspace::Arr2;

/// Log an iteration line at this cadence inside run loops.
pub const LOG_CADENCE: usize = 50;

/// File name of the parameter archive expected in the working directory.
pub const PARAMS_FILE: &str = "Parameters.npz";

/// Render a pseudocolor image of a 2D field, one pixel per grid point.
///
/// Values are normalized to `[vmin, vmax]` (clamped) and mapped onto a
/// grayscale ramp, dark to light. The field is indexed `[i, j]` over x and
/// y; the image puts x along the horizontal axis with y increasing upward.
pub fn render_density<S, P>(
    path: P,
    field: &Arr2<S>,
    vmin: f64,
    vmax: f64,
) -> anyhow::Result<()>
where
    S: nd::Data<Elem = f64>,
    P: AsRef<Path>,
{
    let (nx, ny) = field.dim();
    let root
        = BitMapBackend::new(path.as_ref(), (nx as u32, ny as u32))
        .into_drawing_area();
    let span = vmax - vmin;
    for ((i, j), &v) in field.indexed_iter() {
        let t = ((v - vmin) / span).clamp(0.0, 1.0);
        let c = (t * 255.0).round() as u8;
        root.draw_pixel(
            (i as i32, (ny - 1 - j) as i32),
            &RGBColor(c, c, c),
        )?;
    }
    root.present()?;
    Ok(())
}
