//! Declarative per-body transform chains and the composition that turns them
//! into model matrices.
//!
//! A chain is applied left to right against the identity, each step
//! post-multiplied, so the last step listed acts first on mesh vertices:
//!
//! ```text
//! model = I · inclination · Rz(orbit.rate·a) · T(0, orbit.radius, 0)
//!           · axial_tilt · Rz(satellite.rate·a) · T(0, satellite.radius, 0)
//!           · Rz(spin_rate·a) · S(scale)
//! ```
//!
//! Absent steps are skipped. Matrix products do not commute, so this order is
//! what places each body on its trajectory.

use glam::{Mat4, Vec3};

use crate::body::Body;

/// A fixed rotation by `degrees` about `axis`. The axis need not be unit length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tilt {
    pub degrees: f32,
    pub axis: Vec3,
}

impl Tilt {
    pub const fn new(degrees: f32, axis: Vec3) -> Self {
        Self { degrees, axis }
    }

    fn matrix(&self) -> Mat4 {
        Mat4::from_axis_angle(self.axis.normalize(), self.degrees.to_radians())
    }
}

/// A circular orbit in the local XY plane: rotate about +Z by `rate` times the
/// animation angle, then step out `radius` along +Y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orbit {
    pub rate: f32,
    pub radius: f32,
}

impl Orbit {
    pub const fn new(rate: f32, radius: f32) -> Self {
        Self { rate, radius }
    }
}

/// Transform configuration for one body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyConfig {
    /// Fixed tilt of the whole orbital plane, applied first.
    pub inclination: Option<Tilt>,
    /// Orbit around the scene origin.
    pub orbit: Option<Orbit>,
    /// Fixed tilt applied at the orbit position.
    pub axial_tilt: Option<Tilt>,
    /// Second-order orbit around the point reached by `orbit`.
    pub satellite_orbit: Option<Orbit>,
    /// Rotation about the body's own Z axis, as a multiple of the angle.
    pub spin_rate: f32,
    /// Uniform scale applied to the unit sphere.
    pub scale: f32,
}

impl BodyConfig {
    pub const SUN: BodyConfig = BodyConfig {
        inclination: None,
        orbit: None,
        axial_tilt: None,
        satellite_orbit: None,
        spin_rate: 1.0,
        scale: 1.0,
    };

    pub const EARTH: BodyConfig = BodyConfig {
        inclination: None,
        orbit: Some(Orbit::new(2.0, 4.0)),
        axial_tilt: Some(Tilt::new(30.0, Vec3::new(0.1, 0.9, 0.0))),
        satellite_orbit: None,
        spin_rate: 1.0,
        scale: 0.5,
    };

    pub const MOON: BodyConfig = BodyConfig {
        inclination: None,
        orbit: Some(Orbit::new(2.0, 4.0)),
        axial_tilt: Some(Tilt::new(30.0, Vec3::new(-0.9, 0.1, 0.0))),
        satellite_orbit: Some(Orbit::new(2.0, 1.0)),
        spin_rate: 1.0,
        scale: 0.25,
    };

    pub const JUPITER: BodyConfig = BodyConfig {
        inclination: Some(Tilt::new(5.0, Vec3::new(0.1, 0.9, 0.0))),
        orbit: Some(Orbit::new(1.0, 6.5)),
        axial_tilt: None,
        satellite_orbit: None,
        spin_rate: 1.0,
        scale: 0.75,
    };

    /// The transform chain for `body`.
    pub fn for_body(body: Body) -> &'static BodyConfig {
        match body {
            Body::Sun => &Self::SUN,
            Body::Earth => &Self::EARTH,
            Body::Moon => &Self::MOON,
            Body::Jupiter => &Self::JUPITER,
        }
    }
}

/// Rotation about +Z by `degrees`.
fn rotate_z(degrees: f32) -> Mat4 {
    Mat4::from_axis_angle(Vec3::Z, degrees.to_radians())
}

fn orbit_steps(model: &mut Mat4, orbit: &Orbit, angle: f32) {
    *model *= rotate_z(orbit.rate * angle);
    *model *= Mat4::from_translation(Vec3::new(0.0, orbit.radius, 0.0));
}

/// Compose the model matrix for `config` at animation angle `angle` (degrees).
///
/// Pure: the same inputs always produce bit-identical output.
pub fn model_matrix(config: &BodyConfig, angle: f32) -> Mat4 {
    let mut model = Mat4::IDENTITY;

    if let Some(tilt) = &config.inclination {
        model *= tilt.matrix();
    }
    if let Some(orbit) = &config.orbit {
        orbit_steps(&mut model, orbit, angle);
    }
    if let Some(tilt) = &config.axial_tilt {
        model *= tilt.matrix();
    }
    if let Some(orbit) = &config.satellite_orbit {
        orbit_steps(&mut model, orbit, angle);
    }
    model *= rotate_z(config.spin_rate * angle);
    if config.scale != 1.0 {
        model *= Mat4::from_scale(Vec3::splat(config.scale));
    }

    model
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center(model: Mat4) -> Vec3 {
        model.transform_point3(Vec3::ZERO)
    }

    #[test]
    fn test_sun_at_zero_angle_is_identity() {
        assert_eq!(model_matrix(&BodyConfig::SUN, 0.0), Mat4::IDENTITY);
    }

    #[test]
    fn test_composition_is_deterministic() {
        for body in Body::ALL {
            let config = BodyConfig::for_body(body);
            let a = model_matrix(config, 137.25);
            let b = model_matrix(config, 137.25);
            assert_eq!(a.to_cols_array(), b.to_cols_array(), "{body} diverged");
        }
    }

    #[test]
    fn test_earth_chain_order_at_one_degree() {
        let expected = Mat4::IDENTITY
            * Mat4::from_axis_angle(Vec3::Z, 2.0_f32.to_radians())
            * Mat4::from_translation(Vec3::new(0.0, 4.0, 0.0))
            * Mat4::from_axis_angle(Vec3::new(0.1, 0.9, 0.0).normalize(), 30.0_f32.to_radians())
            * Mat4::from_axis_angle(Vec3::Z, 1.0_f32.to_radians())
            * Mat4::from_scale(Vec3::splat(0.5));
        assert_eq!(model_matrix(&BodyConfig::EARTH, 1.0), expected);
    }

    #[test]
    fn test_jupiter_chain_order() {
        let angle = 42.0_f32;
        let expected = Mat4::IDENTITY
            * Mat4::from_axis_angle(Vec3::new(0.1, 0.9, 0.0).normalize(), 5.0_f32.to_radians())
            * Mat4::from_axis_angle(Vec3::Z, angle.to_radians())
            * Mat4::from_translation(Vec3::new(0.0, 6.5, 0.0))
            * Mat4::from_axis_angle(Vec3::Z, angle.to_radians())
            * Mat4::from_scale(Vec3::splat(0.75));
        assert_eq!(model_matrix(&BodyConfig::JUPITER, angle), expected);
    }

    #[test]
    fn test_reordered_chain_differs() {
        let angle: f32 = 30.0;
        let swapped = Mat4::IDENTITY
            * Mat4::from_translation(Vec3::new(0.0, 4.0, 0.0))
            * Mat4::from_axis_angle(Vec3::Z, (2.0 * angle).to_radians())
            * Mat4::from_axis_angle(Vec3::new(0.1, 0.9, 0.0).normalize(), 30.0_f32.to_radians())
            * Mat4::from_axis_angle(Vec3::Z, angle.to_radians())
            * Mat4::from_scale(Vec3::splat(0.5));
        let model = model_matrix(&BodyConfig::EARTH, angle);
        assert!(!model.abs_diff_eq(swapped, 1e-3));
    }

    #[test]
    fn test_orbit_radii() {
        for angle in [0.0, 45.0, 190.0, 359.0] {
            let earth = center(model_matrix(&BodyConfig::EARTH, angle));
            let jupiter = center(model_matrix(&BodyConfig::JUPITER, angle));
            assert!((earth.length() - 4.0).abs() < 1e-4);
            assert!((jupiter.length() - 6.5).abs() < 1e-4);
            assert!(center(model_matrix(&BodyConfig::SUN, angle)).length() < 1e-6);
        }
    }

    #[test]
    fn test_moon_orbits_earth_orbit_point() {
        for angle in [0.0, 12.5, 90.0, 271.0] {
            let earth = center(model_matrix(&BodyConfig::EARTH, angle));
            let moon = center(model_matrix(&BodyConfig::MOON, angle));
            assert!(((moon - earth).length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_earth_completes_orbit_in_half_turn() {
        let start = center(model_matrix(&BodyConfig::EARTH, 0.0));
        let end = center(model_matrix(&BodyConfig::EARTH, 180.0));
        assert!(start.abs_diff_eq(Vec3::new(0.0, 4.0, 0.0), 1e-5));
        assert!(end.abs_diff_eq(start, 1e-4));
    }

    #[test]
    fn test_scale_factors() {
        let earth = model_matrix(&BodyConfig::EARTH, 0.0);
        let moon = model_matrix(&BodyConfig::MOON, 0.0);
        let jupiter = model_matrix(&BodyConfig::JUPITER, 0.0);
        assert!((earth.x_axis.truncate().length() - 0.5).abs() < 1e-6);
        assert!((moon.x_axis.truncate().length() - 0.25).abs() < 1e-6);
        assert!((jupiter.x_axis.truncate().length() - 0.75).abs() < 1e-6);
    }
}
