//! Latitude/longitude sphere tessellation emitted in triangle-strip order.
//!
//! For every latitude band `i` in `[1, P)` and longitude step `j` in `[0, M)`
//! two vertices are emitted, one on the band's upper ring (`theta0`) and one
//! on its lower ring (`theta1`). Consecutive pairs form the strip's edges.
//!
//! The azimuth of step `j` is taken at `j - 1` while its texture column is
//! `j`, so positions lead texture columns by one step. This offset is part of
//! the mesh's observable output and is kept as is.

use std::f64::consts::PI;

use crate::vertex::SphereVertex;

/// Default number of latitude bands (`P`).
pub const DEFAULT_LATITUDE_BANDS: u32 = 200;

/// Default number of longitude divisions (`M`).
pub const DEFAULT_LONGITUDE_SEGMENTS: u32 = 200;

/// Parameters for [`generate_sphere_with`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereParams {
    /// Sphere radius. Non-positive values are accepted and yield a
    /// degenerate or inverted mesh.
    pub radius: f32,
    /// Number of latitude bands `P`. Values below 2 produce no vertices.
    pub latitude_bands: u32,
    /// Number of longitude divisions `M`.
    pub longitude_segments: u32,
}

impl Default for SphereParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            latitude_bands: DEFAULT_LATITUDE_BANDS,
            longitude_segments: DEFAULT_LONGITUDE_SEGMENTS,
        }
    }
}

/// Number of vertices [`generate_sphere_with`] emits: `2 * (P - 1) * M`.
pub fn vertex_count(params: &SphereParams) -> usize {
    let bands = params.latitude_bands.saturating_sub(1) as usize;
    2 * bands * params.longitude_segments as usize
}

/// Generate a sphere of the given radius at the default 200×200 resolution.
pub fn generate_sphere(radius: f32) -> Vec<SphereVertex> {
    generate_sphere_with(&SphereParams {
        radius,
        ..SphereParams::default()
    })
}

/// Generate a sphere with explicit resolution.
pub fn generate_sphere_with(params: &SphereParams) -> Vec<SphereVertex> {
    let bands = params.latitude_bands as f64;
    let segments = params.longitude_segments as f64;
    let radius = params.radius as f64;

    let mut vertices = Vec::with_capacity(vertex_count(params));

    for i in 1..params.latitude_bands {
        let upper = (i - 1) as f64 / bands;
        let lower = i as f64 / bands;
        let theta0 = PI * upper;
        let theta1 = PI * lower;

        for j in 0..params.longitude_segments {
            let phi = 2.0 * PI * (j as f64 - 1.0) / segments;
            let column = j as f64 / segments;

            vertices.push(spherical_vertex(radius, theta0, phi, [upper, column]));
            vertices.push(spherical_vertex(radius, theta1, phi, [lower, column]));
        }
    }

    vertices
}

/// Spherical to Cartesian: `x = R cos(phi) sin(theta)`, `y = R sin(phi) sin(theta)`,
/// `z = R cos(theta)`.
fn spherical_vertex(radius: f64, theta: f64, phi: f64, uv: [f64; 2]) -> SphereVertex {
    SphereVertex {
        position: [
            (radius * phi.cos() * theta.sin()) as f32,
            (radius * phi.sin() * theta.sin()) as f32,
            (radius * theta.cos()) as f32,
        ],
        uv: [uv[0] as f32, uv[1] as f32],
    }
}
