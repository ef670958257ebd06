//! Support library for parameter sweeps of a three-field reaction-diffusion
//! model (two competing population densities plus a merged density) on
//! periodic rectangular domains.
//!
//! The pieces assemble in the order a driver uses them:
//! - [`grid`]: Fourier bases and 1-/2-dimensional domains
//! - [`profile`]: smoothed circular "blob" profiles for seeding fields
//! - [`model`]: physical parameters and the nonlinear growth term
//! - [`solver`]: fixed-step pseudo-spectral integration of the coupled
//!   system (exact spectral diffusion, pointwise Runge-Kutta reaction)
//! - [`output`]: periodic snapshot shards, shard merging, and reload of
//!   merged time series
//! - [`post`]: spectral rescaling and the interface-width diagnostic

pub mod error;
pub mod grid;
pub mod model;
pub mod output;
pub mod post;
pub mod profile;
pub mod solver;
pub mod utils;

pub type Arr1<S> = ndarray::ArrayBase<S, ndarray::Ix1>;
pub type Arr2<S> = ndarray::ArrayBase<S, ndarray::Ix2>;
