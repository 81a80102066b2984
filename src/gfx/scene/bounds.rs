use cgmath::{Vector3, Zero};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new(Vector3::zero(), Vector3::zero())
    }
}

impl BoundingBox {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every position, or a zero box at the origin
    /// when there are none.
    pub fn from_positions<'a>(positions: impl IntoIterator<Item = &'a [f32; 3]>) -> Self {
        let mut positions = positions.into_iter().map(|p| Vector3::from(*p));
        let Some(first) = positions.next() else {
            return Self::default();
        };

        let (min, max) = positions.fold((first, first), |(min, max), v| {
            (
                Vector3::new(min.x.min(v.x), min.y.min(v.y), min.z.min(v.z)),
                Vector3::new(max.x.max(v.x), max.y.max(v.y), max.z.max(v.z)),
            )
        });
        Self::new(min, max)
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }
}
