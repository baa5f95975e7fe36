//! The fixed set of bodies drawn each frame.

use std::fmt;

/// A celestial body in the scene. Each one is drawn with the shared sphere
/// mesh and its own texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Body {
    Sun,
    Earth,
    Moon,
    Jupiter,
}

impl Body {
    /// All bodies in draw order.
    pub const ALL: [Body; 4] = [Body::Sun, Body::Earth, Body::Moon, Body::Jupiter];

    /// Number of bodies.
    pub const COUNT: usize = Self::ALL.len();

    /// Stable index in `[0, COUNT)`, matching the position in [`Body::ALL`].
    pub fn index(self) -> usize {
        match self {
            Body::Sun => 0,
            Body::Earth => 1,
            Body::Moon => 2,
            Body::Jupiter => 3,
        }
    }

    /// Lowercase name, used for labels and log output.
    pub fn name(self) -> &'static str {
        match self {
            Body::Sun => "sun",
            Body::Earth => "earth",
            Body::Moon => "moon",
            Body::Jupiter => "jupiter",
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
