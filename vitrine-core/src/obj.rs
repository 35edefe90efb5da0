/// Wavefront OBJ decoder
///
/// Reads positions, texture coordinates, normals and faces. `o` and `g`
/// statements split the model into separately materialised surfaces;
/// material libraries and smoothing groups are ignored.
use nalgebra::{Point2, Point3, Vector3};
use nom::{
    character::complete::{char, i64 as integer, space0, space1},
    combinator::{all_consuming, opt},
    multi::{many0, separated_list1},
    number::complete::float,
    sequence::{pair, preceded, terminated},
    IResult,
};

use crate::error::{Result, ViewerError};
use crate::geometry::{face_normal, Mesh, Triangle, Vertex};

/// One `v/vt/vn` reference inside a face statement, still OBJ-indexed
#[derive(Debug, Clone, Copy, PartialEq)]
struct FaceVertex {
    position: i64,
    uv: Option<i64>,
    normal: Option<i64>,
}

#[derive(Default)]
struct ObjBuilder {
    positions: Vec<Point3<f32>>,
    uvs: Vec<Point2<f32>>,
    normals: Vec<Vector3<f32>>,
    meshes: Vec<Mesh>,
    current: Option<Mesh>,
}

impl ObjBuilder {
    fn start_surface(&mut self, name: &str) {
        self.finish_surface();
        let name = if name.is_empty() { "default" } else { name };
        self.current = Some(Mesh::new(name));
    }

    fn finish_surface(&mut self) {
        if let Some(mesh) = self.current.take() {
            if !mesh.is_empty() {
                self.meshes.push(mesh);
            }
        }
    }

    fn add_face(&mut self, refs: &[FaceVertex], line: usize) -> Result<()> {
        if refs.len() < 3 {
            return Err(parse_error(line, "face needs at least three vertices"));
        }

        let mut corners = Vec::with_capacity(refs.len());
        for face_vertex in refs {
            let position = self.positions[resolve(face_vertex.position, self.positions.len(), line)?];
            let uv = match face_vertex.uv {
                Some(index) => self.uvs[resolve(index, self.uvs.len(), line)?],
                None => Point2::origin(),
            };
            let normal = match face_vertex.normal {
                Some(index) => Some(self.normals[resolve(index, self.normals.len(), line)?]),
                None => None,
            };
            corners.push((position, uv, normal));
        }

        let mesh = self.current.get_or_insert_with(|| Mesh::new("default"));
        for i in 1..corners.len() - 1 {
            let fan = [corners[0], corners[i], corners[i + 1]];
            let flat = face_normal(&fan[0].0, &fan[1].0, &fan[2].0);
            let vertex = |(position, uv, normal): (Point3<f32>, Point2<f32>, Option<Vector3<f32>>)| {
                Vertex::new(position, normal.unwrap_or(flat), uv)
            };
            mesh.add_triangle(Triangle::new(vertex(fan[0]), vertex(fan[1]), vertex(fan[2])));
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<Mesh>> {
        self.finish_surface();
        if self.meshes.is_empty() {
            return Err(ViewerError::EmptyMesh);
        }
        Ok(self.meshes)
    }
}

/// Parse an OBJ document into one mesh per named surface
pub fn parse_obj(input: &str) -> Result<Vec<Mesh>> {
    let mut builder = ObjBuilder::default();

    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        let content = raw.split('#').next().unwrap_or("").trim();
        let (keyword, rest) = match content.split_once(|c: char| c.is_whitespace()) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (content, ""),
        };

        match keyword {
            "v" => {
                let (x, y, z) = run(position, rest, line)?;
                builder.positions.push(Point3::new(x, y, z));
            }
            "vt" => {
                let (u, v) = run(tex_coord, rest, line)?;
                builder.uvs.push(Point2::new(u, v));
            }
            "vn" => {
                let (x, y, z) = run(vector3, rest, line)?;
                builder.normals.push(Vector3::new(x, y, z));
            }
            "f" => {
                let refs = run(face, rest, line)?;
                builder.add_face(&refs, line)?;
            }
            "o" | "g" => builder.start_surface(rest),
            _ => {}
        }
    }

    builder.finish()
}

fn run<'a, T>(
    parser: impl FnMut(&'a str) -> IResult<&'a str, T>,
    input: &'a str,
    line: usize,
) -> Result<T> {
    all_consuming(terminated(parser, space0))(input)
        .map(|(_, value)| value)
        .map_err(|e| parse_error(line, format!("malformed statement: {e:?}")))
}

fn parse_error(line: usize, reason: impl Into<String>) -> ViewerError {
    ViewerError::MeshParse {
        line,
        reason: reason.into(),
    }
}

/// Turn a 1-based (or negative, end-relative) OBJ index into a slice index
fn resolve(index: i64, len: usize, line: usize) -> Result<usize> {
    let resolved = match index {
        i if i > 0 => i - 1,
        i if i < 0 => len as i64 + i,
        _ => return Err(parse_error(line, "index 0 is not valid")),
    };
    if resolved < 0 || resolved >= len as i64 {
        return Err(parse_error(line, format!("index {index} out of range ({len} defined)")));
    }
    Ok(resolved as usize)
}

/// `x y z`, ignoring an optional trailing weight
fn vector3(input: &str) -> IResult<&str, (f32, f32, f32)> {
    let (input, x) = float(input)?;
    let (input, y) = preceded(space1, float)(input)?;
    let (input, z) = preceded(space1, float)(input)?;
    let (input, _) = opt(preceded(space1, float))(input)?;
    Ok((input, (x, y, z)))
}

/// `x y z` followed by an optional weight or an `r g b` vertex colour,
/// both discarded
fn position(input: &str) -> IResult<&str, (f32, f32, f32)> {
    let (input, xyz) = vector3(input)?;
    let (input, _) = many0(preceded(space1, float))(input)?;
    Ok((input, xyz))
}

/// `u [v [w]]`
fn tex_coord(input: &str) -> IResult<&str, (f32, f32)> {
    let (input, u) = float(input)?;
    let (input, v) = opt(preceded(space1, float))(input)?;
    let (input, _) = opt(preceded(space1, float))(input)?;
    Ok((input, (u, v.unwrap_or(0.0))))
}

/// `v`, `v/vt`, `v//vn` or `v/vt/vn`
fn face_vertex(input: &str) -> IResult<&str, FaceVertex> {
    let (input, position) = integer(input)?;
    let (input, tail) = opt(preceded(
        char('/'),
        pair(opt(integer), opt(preceded(char('/'), integer))),
    ))(input)?;
    let (uv, normal) = tail.unwrap_or((None, None));
    Ok((
        input,
        FaceVertex {
            position,
            uv,
            normal,
        },
    ))
}

fn face(input: &str) -> IResult<&str, Vec<FaceVertex>> {
    separated_list1(space1, face_vertex)(input)
}
