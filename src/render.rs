//! The full pipeline: validate, map, iterate, colour, and finally
//! encode.

use colour::ColourMapper;
use config::RenderConfig;
use engine::{PlotSink, PointEngine};
use error::FractalError;
use escape::EscapeResult;
use fractal::Fractal;
use gradient::{Colour, Gradient};
use image::jpeg::JPEGEncoder;
use image::ColorType;
use planes::Pixel;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

/// JPEG quality used when writing images.
pub const JPEG_QUALITY: u8 = 75;

/// The largest side a JPEG can record.
pub const JPEG_MAX_DIMENSION: usize = 65_535;

/// An RGB image that colours escape results as they arrive.  Pixels
/// that never escape are left black.
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
    colours: ColourMapper,
}

impl Canvas {
    /// A black canvas.
    pub fn new(width: usize, height: usize, colours: ColourMapper) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![0 as u8; width * height * 3],
            colours,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The colour at a pixel.
    pub fn pixel(&self, pixel: Pixel) -> Colour {
        let offset = self.offset(pixel);
        [
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
        ]
    }

    /// The raw RGB bytes, row by row.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    fn offset(&self, pixel: Pixel) -> usize {
        (pixel.1 * self.width + pixel.0) * 3
    }

    /// Encodes the canvas as a JPEG at `path`.
    pub fn write_jpeg<P: AsRef<Path>>(&self, path: P) -> Result<(), FractalError> {
        if self.width > JPEG_MAX_DIMENSION || self.height > JPEG_MAX_DIMENSION {
            return Err(FractalError::InvalidConfig(format!(
                "a {}x{} image is too large for a JPEG; neither side may exceed {}",
                self.width, self.height, JPEG_MAX_DIMENSION
            )));
        }
        let mut output = BufWriter::new(File::create(path)?);
        let mut encoder = JPEGEncoder::new_with_quality(&mut output, JPEG_QUALITY);
        encoder.encode(
            &self.pixels,
            self.width as u32,
            self.height as u32,
            ColorType::RGB(8),
        )?;
        output.flush()?;
        Ok(())
    }
}

impl PlotSink for Canvas {
    fn plot(&mut self, result: &EscapeResult) {
        if !result.escaped {
            return;
        }
        let colour = self.colours.colour(result);
        let offset = self.offset(result.pixel);
        self.pixels[offset..offset + 3].copy_from_slice(&colour);
    }
}

/// Renders `fractal` under `config` with `workers` threads.  Every
/// parameter, the gradient included, is checked before any thread
/// starts.
pub fn render(fractal: Fractal, config: &RenderConfig, workers: usize) -> Result<Canvas, FractalError> {
    config.validate()?;
    let gradient = Gradient::from_spec(&config.gradient)?;
    let mapper = fractal.mapper(config)?;
    let engine = PointEngine::new(mapper, workers)?;

    let colours = ColourMapper::new(gradient, config.colour_mode, config.max_iterations);
    let mut canvas = Canvas::new(config.width, config.height, colours);

    let started = Instant::now();
    let plotted = fractal.plot(&engine, config, &mut canvas)?;
    info!(
        "rendered {} {} points with {} workers in {:?}",
        plotted,
        fractal,
        workers,
        started.elapsed()
    );
    Ok(canvas)
}
