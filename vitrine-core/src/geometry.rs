/// Geometry primitives for the displayed model
use nalgebra::{Point2, Point3, Vector3};

/// A mesh vertex with position, normal and texture coordinate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub uv: Point2<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>, uv: Point2<f32>) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Face normal from the winding order; zero for degenerate faces
    pub fn calculate_normal(&self) -> Vector3<f32> {
        face_normal(
            &self.vertices[0].position,
            &self.vertices[1].position,
            &self.vertices[2].position,
        )
    }
}

pub(crate) fn face_normal(a: &Point3<f32>, b: &Point3<f32>, c: &Point3<f32>) -> Vector3<f32> {
    let cross = (b - a).cross(&(c - a));
    cross.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros)
}

/// Geometry of one drawable surface of the model
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            triangles: Vec::new(),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = &Point3<f32>> {
        self.triangles
            .iter()
            .flat_map(|t| t.vertices.iter().map(|v| &v.position))
    }

    /// Axis-aligned cube centred on the origin, used as a test fixture
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let mut mesh = Self::new("cube");
        let faces: [(Vector3<f32>, Vector3<f32>, Vector3<f32>); 6] = [
            (Vector3::z(), Vector3::x(), Vector3::y()),
            (-Vector3::z(), -Vector3::x(), Vector3::y()),
            (Vector3::y(), Vector3::x(), -Vector3::z()),
            (-Vector3::y(), Vector3::x(), Vector3::z()),
            (Vector3::x(), -Vector3::z(), Vector3::y()),
            (-Vector3::x(), Vector3::z(), Vector3::y()),
        ];

        for (normal, right, up) in faces {
            let corner = |s: f32, t: f32| {
                let p = normal * half + right * (s * half) + up * (t * half);
                Vertex::new(
                    Point3::from(p),
                    normal,
                    Point2::new((s + 1.0) / 2.0, (t + 1.0) / 2.0),
                )
            };
            let (a, b, c, d) = (
                corner(-1.0, -1.0),
                corner(1.0, -1.0),
                corner(1.0, 1.0),
                corner(-1.0, 1.0),
            );
            mesh.add_triangle(Triangle::new(a, b, c));
            mesh.add_triangle(Triangle::new(a, c, d));
        }

        mesh
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    pub fn from_point(point: Point3<f32>) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    pub fn include(&mut self, point: &Point3<f32>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn max_dimension(&self) -> f32 {
        self.size().max()
    }
}

/// Bounds of every vertex across a set of surfaces
pub fn bounds_of<'a>(meshes: impl IntoIterator<Item = &'a Mesh>) -> Option<Aabb> {
    let mut points = meshes.into_iter().flat_map(Mesh::positions);
    let mut bounds = Aabb::from_point(*points.next()?);
    for point in points {
        bounds.include(point);
    }
    Some(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_faces_point_outward() {
        let cube = Mesh::cube(2.0);
        assert_eq!(cube.triangles.len(), 12);
        for triangle in &cube.triangles {
            let computed = triangle.calculate_normal();
            let declared = triangle.vertices[0].normal;
            assert!((computed - declared).norm() < 1e-5, "{computed:?} vs {declared:?}");
        }
    }

    #[test]
    fn test_bounds_of_cube() {
        let bounds = bounds_of(&[Mesh::cube(2.0)]).unwrap();
        assert!((bounds.min - Point3::new(-1.0, -1.0, -1.0)).norm() < 1e-6);
        assert!((bounds.max - Point3::new(1.0, 1.0, 1.0)).norm() < 1e-6);
        assert!((bounds.max_dimension() - 2.0).abs() < 1e-6);
        assert!(bounds.center().coords.norm() < 1e-6);
    }

    #[test]
    fn test_bounds_of_nothing() {
        assert!(bounds_of(std::iter::empty()).is_none());
        assert!(bounds_of(&[Mesh::new("empty")]).is_none());
    }

    #[test]
    fn test_degenerate_normal_is_zero() {
        let v = Vertex::new(Point3::origin(), Vector3::zeros(), Point2::origin());
        let triangle = Triangle::new(v, v, v);
        assert_eq!(triangle.calculate_normal(), Vector3::zeros());
    }
}
