//! Procedural UV-sphere geometry shared by every celestial body.
//!
//! The mesh is a flat, non-indexed vertex sequence meant to be drawn as a
//! triangle strip. It is generated once at startup and never mutated.

pub mod sphere;
pub mod vertex;

pub use sphere::{
    DEFAULT_LATITUDE_BANDS, DEFAULT_LONGITUDE_SEGMENTS, SphereParams, generate_sphere,
    generate_sphere_with, vertex_count,
};
pub use vertex::{
    FLOATS_PER_VERTEX, SPHERE_VERTEX_LAYOUT, SphereVertex, as_floats, vertex_count_of_floats,
};
