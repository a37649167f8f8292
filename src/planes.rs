//! Contains the Plane struct, which describes the rectangle of the
//! complex plane a fractal family is conventionally viewed within, and
//! the PlaneMapper struct, which relates a rectangle of pixels with an
//! origin at the top-left to a region of that plane.
use config::RenderConfig;
use error::FractalError;
use itertools::iproduct;
use num::Complex;

/// Describes the x, y of a pixel in the output image, where 0, 0 is
/// the top-left corner.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pixel(pub usize, pub usize);

/// The real and imaginary bounds of a fractal family.  Immutable once
/// built.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Plane {
    r_min: f64,
    r_max: f64,
    i_min: f64,
    i_max: f64,
}

/// The isotropic scale of a render: one pixel spans `pixel_scale` on
/// both axes, and `offset` is the pixel at the render centre.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Scale {
    /// The distance on the complex plane between adjacent pixels.
    pub pixel_scale: f64,
    /// The pixel x-coordinate of the centre, usually fractional.
    pub offset_x: f64,
    /// The pixel y-coordinate of the centre, usually fractional.
    pub offset_y: f64,
}

impl Plane {
    /// Constructor.  The minimum of each axis must lie strictly below
    /// its maximum.
    pub fn new(r_min: f64, r_max: f64, i_min: f64, i_max: f64) -> Result<Plane, FractalError> {
        if !(r_min < r_max) {
            return Err(FractalError::InvalidPlane(format!(
                "real axis {} .. {} is empty or inverted",
                r_min, r_max
            )));
        }
        if !(i_min < i_max) {
            return Err(FractalError::InvalidPlane(format!(
                "imaginary axis {} .. {} is empty or inverted",
                i_min, i_max
            )));
        }
        Ok(Plane::from_bounds(r_min, r_max, i_min, i_max))
    }

    /// Unchecked constructor for the family constants.
    pub(crate) const fn from_bounds(r_min: f64, r_max: f64, i_min: f64, i_max: f64) -> Plane {
        Plane {
            r_min,
            r_max,
            i_min,
            i_max,
        }
    }

    /// The smallest real value.
    pub fn r_min(&self) -> f64 {
        self.r_min
    }

    /// The largest real value.
    pub fn r_max(&self) -> f64 {
        self.r_max
    }

    /// The smallest imaginary value.
    pub fn i_min(&self) -> f64 {
        self.i_min
    }

    /// The largest imaginary value.
    pub fn i_max(&self) -> f64 {
        self.i_max
    }

    /// The middle of the plane, which is where a render is centred
    /// unless told otherwise.
    pub fn centre(&self) -> Complex<f64> {
        Complex::new(
            (self.r_max + self.r_min) / 2.0,
            (self.i_max + self.i_min) / 2.0,
        )
    }

    /// Works out how far apart adjacent pixels are.  The axis with the
    /// finer resolution governs both, so a non-square image shows more
    /// of the plane rather than stretching it.
    pub fn scale(&self, zoom: f64, width: usize, height: usize) -> Result<Scale, FractalError> {
        if width < 2 || height < 2 {
            return Err(FractalError::InvalidConfig(format!(
                "cannot scale a {}x{} image; both sides need at least 2 pixels",
                width, height
            )));
        }
        if !(zoom > 0.0) || !zoom.is_finite() {
            return Err(FractalError::InvalidConfig(format!(
                "zoom {} is not a positive number",
                zoom
            )));
        }

        let columns = (width - 1) as f64;
        let rows = (height - 1) as f64;
        let real_scale = (self.r_max - self.r_min) / columns / zoom;
        let imag_scale = (self.i_max - self.i_min) / rows / zoom;

        Ok(Scale {
            pixel_scale: real_scale.min(imag_scale),
            offset_x: columns / 2.0,
            offset_y: rows / 2.0,
        })
    }
}

/// One sample: a pixel and the point on the complex plane it stands
/// for.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlanePoint {
    /// Where the result lands in the image.
    pub pixel: Pixel,
    /// The point handed to the escape function.
    pub point: Complex<f64>,
}

/// Maps pixels of a `width` x `height` image onto the complex plane
/// for one render.  Both the full render and the single-pixel
/// coordinate query go through `pixel_to_point`, so they can never
/// disagree.
#[derive(Copy, Clone, Debug)]
pub struct PlaneMapper {
    width: usize,
    height: usize,
    centre: Complex<f64>,
    scale: Scale,
}

impl PlaneMapper {
    /// Derives the mapping for `config` over `plane`.  Fails on a grid
    /// too small to scale.
    pub fn new(plane: &Plane, config: &RenderConfig) -> Result<PlaneMapper, FractalError> {
        let scale = plane.scale(config.zoom, config.width, config.height)?;
        Ok(PlaneMapper {
            width: config.width,
            height: config.height,
            centre: config.midpoint(plane),
            scale,
        })
    }

    /// Width of the pixel grid.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the pixel grid.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The scale in use.
    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// The total number of pixels in the grid.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// True if the pixel grid has no pixels in it.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Given a pixel, find the point on the complex plane it samples.
    /// Pixel rows count downwards while the imaginary axis counts
    /// upwards, hence the flip.
    pub fn pixel_to_point(&self, pixel: Pixel) -> Complex<f64> {
        let Scale {
            pixel_scale,
            offset_x,
            offset_y,
        } = self.scale;
        Complex::new(
            self.centre.re + (pixel.0 as f64 - offset_x) * pixel_scale,
            self.centre.im + pixel_scale * (offset_y - pixel.1 as f64),
        )
    }

    /// Given a point on the complex plane, find the nearest pixel, or
    /// None if it falls outside the image.
    pub fn point_to_pixel(&self, point: &Complex<f64>) -> Option<Pixel> {
        let Scale {
            pixel_scale,
            offset_x,
            offset_y,
        } = self.scale;
        let left = ((point.re - self.centre.re) / pixel_scale + offset_x).round();
        let top = (offset_y - (point.im - self.centre.im) / pixel_scale).round();
        if left < 0.0
            || top < 0.0
            || left > (self.width - 1) as f64
            || top > (self.height - 1) as f64
        {
            return None;
        }
        Some(Pixel(left as usize, top as usize))
    }

    /// Pairs a pixel with its point.
    pub fn point_at(&self, pixel: Pixel) -> PlanePoint {
        PlanePoint {
            pixel,
            point: self.pixel_to_point(pixel),
        }
    }

    /// Every pixel of the grid, in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> {
        iproduct!(0..self.height, 0..self.width).map(|(y, x)| Pixel(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(width: usize, height: usize) -> RenderConfig {
        RenderConfig {
            width,
            height,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn plane_fails_on_bad_shape() {
        assert!(Plane::new(1.0, -1.0, -1.0, 1.0).is_err());
        assert!(Plane::new(-1.0, 1.0, 1.0, -1.0).is_err());
        assert!(Plane::new(-1.0, -1.0, -1.0, 1.0).is_err());
    }

    #[test]
    fn plane_passes_on_good_shape() {
        let plane = Plane::new(-2.0, 2.0, -1.0, 1.0).unwrap();
        assert_eq!(plane.centre(), Complex::new(0.0, 0.0));
    }

    #[test]
    fn scale_refuses_single_pixel_axes() {
        let plane = Plane::new(-2.0, 2.0, -2.0, 2.0).unwrap();
        assert!(plane.scale(1.0, 1, 100).is_err());
        assert!(plane.scale(1.0, 100, 1).is_err());
        assert!(plane.scale(0.0, 100, 100).is_err());
    }

    #[test]
    fn scale_uses_the_finer_axis() {
        let plane = Plane::new(-2.25, 0.75, -1.5, 1.5).unwrap();
        let wide = plane.scale(1.0, 301, 201).unwrap();
        assert_eq!(wide.pixel_scale, 3.0 / 300.0);
        assert_eq!(wide.offset_x, 150.0);
        assert_eq!(wide.offset_y, 100.0);

        let tall = plane.scale(2.0, 201, 301).unwrap();
        assert_eq!(tall.pixel_scale, 3.0 / 300.0 / 2.0);
    }

    #[test]
    fn corners_map_to_plane_bounds() {
        let plane = Plane::new(-2.0, 2.0, -2.0, 2.0).unwrap();
        let mapper = PlaneMapper::new(&plane, &config(5, 5)).unwrap();
        assert_eq!(mapper.pixel_to_point(Pixel(0, 0)), Complex::new(-2.0, 2.0));
        assert_eq!(mapper.pixel_to_point(Pixel(2, 2)), Complex::new(0.0, 0.0));
        assert_eq!(mapper.pixel_to_point(Pixel(4, 4)), Complex::new(2.0, -2.0));
        assert_eq!(mapper.pixel_to_point(Pixel(4, 0)), Complex::new(2.0, 2.0));
    }

    #[test]
    fn centre_and_zoom_move_the_window() {
        let plane = Plane::new(-2.0, 2.0, -2.0, 2.0).unwrap();
        let config = RenderConfig {
            width: 5,
            height: 5,
            zoom: 2.0,
            centre: Some(Complex::new(1.0, 1.0)),
            ..RenderConfig::default()
        };
        let mapper = PlaneMapper::new(&plane, &config).unwrap();
        assert_eq!(mapper.pixel_to_point(Pixel(2, 2)), Complex::new(1.0, 1.0));
        assert_eq!(mapper.pixel_to_point(Pixel(0, 0)), Complex::new(0.0, 2.0));
    }

    #[test]
    fn point_to_pixel_inverts_pixel_to_point() {
        let plane = Plane::new(-2.25, 0.75, -1.5, 1.5).unwrap();
        let mapper = PlaneMapper::new(&plane, &config(64, 48)).unwrap();
        for pixel in mapper.pixels() {
            let point = mapper.pixel_to_point(pixel);
            assert_eq!(mapper.point_to_pixel(&point), Some(pixel));
        }
        assert_eq!(mapper.point_to_pixel(&Complex::new(10.0, 0.0)), None);
    }

    #[test]
    fn pixels_are_row_major_and_complete() {
        let plane = Plane::new(-1.0, 1.0, -1.0, 1.0).unwrap();
        let mapper = PlaneMapper::new(&plane, &config(3, 2)).unwrap();
        let pixels: Vec<Pixel> = mapper.pixels().collect();
        assert_eq!(
            pixels,
            vec![
                Pixel(0, 0),
                Pixel(1, 0),
                Pixel(2, 0),
                Pixel(0, 1),
                Pixel(1, 1),
                Pixel(2, 1)
            ]
        );
        assert_eq!(mapper.len(), 6);
        assert!(!mapper.is_empty());
    }
}
