//! Contains RenderConfig, the read-only bundle of parameters shared by
//! every worker for the duration of a render.

use colour::ColourMode;
use error::FractalError;
use gradient::DEFAULT_GRADIENT;
use num::Complex;
use planes::Plane;

/// Everything a render needs to know besides the fractal family.
/// Once validated, this is never mutated; workers receive it by
/// reference and may share it freely.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// The number of iterations after which a point is assumed to be
    /// inside the set.
    pub max_iterations: usize,
    /// The escape threshold.  Families interpret it slightly
    /// differently: the classic family compares against its square,
    /// the burning ship against the value itself, and the Julia family
    /// ignores it in favour of one derived from its constant.
    pub bailout: f64,
    /// Width of the output image, in pixels.
    pub width: usize,
    /// Height of the output image, in pixels.
    pub height: usize,
    /// The point on the complex plane at the middle of the image.
    /// When unset, the middle of the family's plane is used.
    pub centre: Option<Complex<f64>>,
    /// Magnification relative to the family's plane.
    pub zoom: f64,
    /// How escaped pixels are coloured.
    pub colour_mode: ColourMode,
    /// The gradient specification, as JSON text.
    pub gradient: String,
    /// The fixed constant of the Julia family.
    pub constant: Complex<f64>,
}

impl Default for RenderConfig {
    fn default() -> RenderConfig {
        RenderConfig {
            max_iterations: 2000,
            bailout: 4.0,
            width: 1600,
            height: 1600,
            centre: None,
            zoom: 1.0,
            colour_mode: ColourMode::None,
            gradient: DEFAULT_GRADIENT.to_string(),
            constant: Complex::new(0.0, 0.0),
        }
    }
}

impl RenderConfig {
    /// Rejects any configuration that would produce a partial, empty
    /// or NaN-scaled image.  The gradient is checked separately, when
    /// it is parsed.
    pub fn validate(&self) -> Result<(), FractalError> {
        if self.max_iterations == 0 {
            return Err(invalid("maximum iterations must be positive"));
        }
        if !(self.bailout > 0.0) || !self.bailout.is_finite() {
            return Err(invalid("bailout must be a positive number"));
        }
        if self.width < 2 || self.height < 2 {
            return Err(invalid(&format!(
                "image must be at least 2x2 pixels, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.zoom > 0.0) || !self.zoom.is_finite() {
            return Err(invalid("zoom must be a positive number"));
        }
        if let Some(centre) = self.centre {
            if !centre.re.is_finite() || !centre.im.is_finite() {
                return Err(invalid("centre must be a finite point"));
            }
        }
        if !self.constant.re.is_finite() || !self.constant.im.is_finite() {
            return Err(invalid("constant must be a finite point"));
        }
        Ok(())
    }

    /// The render centre, falling back to the centre of the plane.
    pub fn midpoint(&self, plane: &Plane) -> Complex<f64> {
        self.centre.unwrap_or_else(|| plane.centre())
    }
}

fn invalid(reason: &str) -> FractalError {
    FractalError::InvalidConfig(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(RenderConfig::default().validate().is_ok());
    }

    #[test]
    fn degenerate_dimensions_are_rejected() {
        for &(width, height) in &[(1, 100), (100, 1), (0, 0)] {
            let config = RenderConfig {
                width,
                height,
                ..RenderConfig::default()
            };
            match config.validate() {
                Err(FractalError::InvalidConfig(_)) => {}
                other => panic!("expected InvalidConfig for {}x{}, got {:?}", width, height, other),
            }
        }
    }

    #[test]
    fn non_positive_parameters_are_rejected() {
        let zero_iterations = RenderConfig {
            max_iterations: 0,
            ..RenderConfig::default()
        };
        assert!(zero_iterations.validate().is_err());

        let negative_bailout = RenderConfig {
            bailout: -4.0,
            ..RenderConfig::default()
        };
        assert!(negative_bailout.validate().is_err());

        let nan_zoom = RenderConfig {
            zoom: ::std::f64::NAN,
            ..RenderConfig::default()
        };
        assert!(nan_zoom.validate().is_err());
    }

    #[test]
    fn midpoint_defaults_to_plane_centre() {
        let plane = Plane::new(-2.25, 0.75, -1.5, 1.5).unwrap();
        let config = RenderConfig::default();
        assert_eq!(config.midpoint(&plane), Complex::new(-0.75, 0.0));

        let config = RenderConfig {
            centre: Some(Complex::new(0.25, 0.5)),
            ..RenderConfig::default()
        };
        assert_eq!(config.midpoint(&plane), Complex::new(0.25, 0.5));
    }
}
