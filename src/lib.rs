#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Escape-time fractal renderer
//!
//! An escape-time fractal assigns every point on the complex plane a
//! number: how many times a function can be applied to it before the
//! result runs off towards infinity.  Points that never run off, as
//! far as a fixed iteration budget can tell, belong to the set and are
//! left black; the rest are coloured by how quickly they escaped.
//!
//! A render samples one point per pixel.  The `planes` module maps
//! pixels to points, the `escape` module holds one iteration rule per
//! fractal family, and the `engine` module runs a whole grid of pixels
//! through a rule on a pool of worker threads, delivering results to a
//! single sink that owns the image.

extern crate crossbeam;
#[macro_use]
extern crate failure;
extern crate image;
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;
extern crate serde;
extern crate serde_json;
#[cfg(test)]
extern crate tempfile;

pub mod colour;
pub mod config;
pub mod engine;
pub mod error;
pub mod escape;
pub mod fractal;
pub mod gradient;
pub mod planes;
pub mod render;

pub use colour::{ColourMapper, ColourMode};
pub use config::RenderConfig;
pub use engine::{PlotSink, PointEngine, DEFAULT_WORKERS};
pub use error::FractalError;
pub use escape::{Escape, EscapeFunction, EscapeResult};
pub use fractal::Fractal;
pub use gradient::{Colour, Gradient, DEFAULT_GRADIENT};
pub use planes::{Pixel, Plane, PlaneMapper, PlanePoint};
pub use render::{render, Canvas};
