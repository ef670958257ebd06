//! Periodic snapshot capture, shard merging, and reload of merged runs.
//!
//! A [`FileHandler`] records the three density fields at a fixed cadence of
//! simulation time, buffering up to `max_writes` snapshots before flushing a
//! shard file `<name>_p<i>.npz` into the run directory. After the run,
//! [`merge_shards`] combines all shards into a single `<name>_s1.npz` file
//! (time as the leading axis) and removes them; [`RunOutput`] loads a merged
//! file back for post-processing.

use std::fs::File;
use std::path::{ Path, PathBuf };
use log::debug;
use ndarray as nd;
use ndarray_npy::{ NpzReader, NpzWriter };
use crate::{
    error::{ ArchiveError, OutputError },
    solver::Solver2,
    utils::npz_entry,
};

pub type OutputResult<T> = Result<T, OutputError>;

/// Records snapshots of a [`Solver2`] run every `sim_dt` of simulation time.
#[derive(Debug)]
pub struct FileHandler {
    dir: PathBuf,
    name: String,
    x: nd::Array1<f64>,
    y: nd::Array1<f64>,
    sim_dt: f64,
    max_writes: usize,
    next_time: f64,
    shard: usize,
    times: Vec<f64>,
    rho1: Vec<nd::Array2<f64>>,
    rho2: Vec<nd::Array2<f64>>,
    rho12: Vec<nd::Array2<f64>>,
}

impl FileHandler {
    /// Create a handler writing shards into the existing directory `dir`.
    ///
    /// The first snapshot is taken at simulation time zero, then every
    /// `sim_dt` afterwards; at most `max_writes` snapshots are buffered per
    /// shard file.
    ///
    /// *Panics if `sim_dt` is non-positive or `max_writes` is zero*.
    pub fn new<P: Into<PathBuf>, N: Into<String>>(
        dir: P,
        name: N,
        x: nd::Array1<f64>,
        y: nd::Array1<f64>,
        sim_dt: f64,
        max_writes: usize,
    ) -> Self {
        assert!(sim_dt > 0.0, "snapshot cadence must be positive");
        assert!(max_writes > 0, "shards must hold at least one snapshot");
        Self {
            dir: dir.into(),
            name: name.into(),
            x,
            y,
            sim_dt,
            max_writes,
            next_time: 0.0,
            shard: 0,
            times: Vec::new(),
            rho1: Vec::new(),
            rho2: Vec::new(),
            rho12: Vec::new(),
        }
    }

    /// Record a snapshot if the solver has crossed the next scheduled write
    /// time, flushing a shard file when the buffer fills.
    pub fn process(&mut self, solver: &Solver2) -> OutputResult<()> {
        if solver.sim_time < self.next_time {
            return Ok(());
        }
        self.times.push(solver.sim_time);
        self.rho1.push(solver.rho1.clone());
        self.rho2.push(solver.rho2.clone());
        self.rho12.push(solver.rho12.clone());
        self.next_time += self.sim_dt;
        if self.times.len() >= self.max_writes {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        if self.times.is_empty() {
            return Ok(());
        }
        self.shard += 1;
        let path
            = self.dir.join(format!("{}_p{}.npz", self.name, self.shard));
        debug!(
            "writing shard {} ({} snapshots)",
            path.display(),
            self.times.len(),
        );
        let file = File::create(&path).map_err(ArchiveError::Io)?;
        let mut npz = NpzWriter::new(file);
        write_err(npz.add_array("x", &self.x))?;
        write_err(npz.add_array("y", &self.y))?;
        let times = nd::Array1::from_vec(std::mem::take(&mut self.times));
        write_err(npz.add_array("sim_time", &times))?;
        write_err(npz.add_array("rho1", &stacked(&mut self.rho1)?))?;
        write_err(npz.add_array("rho2", &stacked(&mut self.rho2)?))?;
        write_err(npz.add_array("rho12", &stacked(&mut self.rho12)?))?;
        write_err(npz.finish().map(|_| ()))?;
        Ok(())
    }

    /// Flush any buffered snapshots and consume the handler.
    pub fn close(mut self) -> OutputResult<()> { self.flush() }
}

fn write_err<T>(res: Result<T, ndarray_npy::WriteNpzError>)
    -> OutputResult<T>
{
    res.map_err(|e| OutputError::Archive(ArchiveError::Write(e)))
}

// drain a snapshot buffer into a single array with time as the leading axis
fn stacked(frames: &mut Vec<nd::Array2<f64>>)
    -> OutputResult<nd::Array3<f64>>
{
    let views: Vec<_> = frames.iter().map(|f| f.view()).collect();
    let out = nd::stack(nd::Axis(0), &views)?;
    frames.clear();
    Ok(out)
}

/// Merge all shard files of a run into one consolidated `<name>_s1.npz`,
/// deleting the shards afterwards. Returns the path of the merged file.
pub fn merge_shards(dir: &Path, name: &str) -> OutputResult<PathBuf> {
    let prefix = format!("{name}_p");
    let mut shards: Vec<(usize, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let stem = match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem,
            None => continue,
        };
        let is_npz
            = path.extension().and_then(|e| e.to_str()) == Some("npz");
        if let Some(index) = stem.strip_prefix(&prefix) {
            if let (true, Ok(index)) = (is_npz, index.parse::<usize>()) {
                shards.push((index, path));
            }
        }
    }
    if shards.is_empty() {
        return Err(OutputError::NoShards {
            dir: dir.to_path_buf(),
            name: name.to_string(),
        });
    }
    shards.sort_by_key(|(index, _)| *index);

    let mut x: Option<nd::Array1<f64>> = None;
    let mut y: Option<nd::Array1<f64>> = None;
    let mut times: Vec<nd::Array1<f64>> = Vec::new();
    let mut rho1: Vec<nd::Array3<f64>> = Vec::new();
    let mut rho2: Vec<nd::Array3<f64>> = Vec::new();
    let mut rho12: Vec<nd::Array3<f64>> = Vec::new();
    for (_, path) in shards.iter() {
        let file = File::open(path).map_err(ArchiveError::Io)?;
        let mut npz = NpzReader::new(file).map_err(ArchiveError::Read)?;
        if x.is_none() {
            x = Some(npz_entry(&mut npz, "x")?);
            y = Some(npz_entry(&mut npz, "y")?);
        }
        times.push(npz_entry(&mut npz, "sim_time")?);
        rho1.push(npz_entry(&mut npz, "rho1")?);
        rho2.push(npz_entry(&mut npz, "rho2")?);
        rho12.push(npz_entry(&mut npz, "rho12")?);
    }
    let merged = dir.join(format!("{name}_s1.npz"));
    debug!(
        "merging {} shards into {}",
        shards.len(),
        merged.display(),
    );
    let file = File::create(&merged).map_err(ArchiveError::Io)?;
    let mut npz = NpzWriter::new(file);
    write_err(npz.add_array("x", &x.unwrap()))?;
    write_err(npz.add_array("y", &y.unwrap()))?;
    write_err(npz.add_array("sim_time", &concat1(&times)?))?;
    write_err(npz.add_array("rho1", &concat3(&rho1)?))?;
    write_err(npz.add_array("rho2", &concat3(&rho2)?))?;
    write_err(npz.add_array("rho12", &concat3(&rho12)?))?;
    write_err(npz.finish().map(|_| ()))?;
    for (_, path) in shards.iter() {
        std::fs::remove_file(path)?;
    }
    Ok(merged)
}

fn concat1(parts: &[nd::Array1<f64>]) -> OutputResult<nd::Array1<f64>> {
    let views: Vec<_> = parts.iter().map(|p| p.view()).collect();
    Ok(nd::concatenate(nd::Axis(0), &views)?)
}

fn concat3(parts: &[nd::Array3<f64>]) -> OutputResult<nd::Array3<f64>> {
    let views: Vec<_> = parts.iter().map(|p| p.view()).collect();
    Ok(nd::concatenate(nd::Axis(0), &views)?)
}

/// The merged time series of one run, loaded for post-processing.
#[derive(Clone, Debug)]
pub struct RunOutput {
    /// x-axis coordinates.
    pub x: nd::Array1<f64>,
    /// y-axis coordinates.
    pub y: nd::Array1<f64>,
    /// Snapshot times.
    pub sim_time: nd::Array1<f64>,
    /// First population density, indexed `[t, i, j]`.
    pub rho1: nd::Array3<f64>,
    /// Second population density, indexed `[t, i, j]`.
    pub rho2: nd::Array3<f64>,
    /// Merged population density, indexed `[t, i, j]`.
    pub rho12: nd::Array3<f64>,
}

impl RunOutput {
    /// Load a merged run file written by [`merge_shards`].
    pub fn load<P: AsRef<Path>>(path: P) -> OutputResult<Self> {
        let file = File::open(path).map_err(ArchiveError::Io)?;
        let mut npz = NpzReader::new(file).map_err(ArchiveError::Read)?;
        Ok(Self {
            x: npz_entry(&mut npz, "x")?,
            y: npz_entry(&mut npz, "y")?,
            sim_time: npz_entry(&mut npz, "sim_time")?,
            rho1: npz_entry(&mut npz, "rho1")?,
            rho2: npz_entry(&mut npz, "rho2")?,
            rho12: npz_entry(&mut npz, "rho12")?,
        })
    }

    /// Number of recorded snapshots.
    pub fn writes(&self) -> usize { self.sim_time.len() }

    /// Total density `rho1 + rho2 + rho12` over the whole time series.
    pub fn total_density(&self) -> nd::Array3<f64> {
        &self.rho1 + &self.rho2 + &self.rho12
    }
}
