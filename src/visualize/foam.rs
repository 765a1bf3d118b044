//! Reader for ASCII OpenFOAM mesh and field files.
//!
//! Handles the subset needed for plotting: `points`, `faces`, `owner`,
//! `neighbour` and the `internalField` of a scalar volume field. Binary and
//! compressed files are reported as malformed.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use super::error::VisualizeError;

//─────────────────────────────────────────────────────────────────────────────

pub type Point = [f64; 3];

/// Upper bound on the length of a `N{value}` uniform list.
pub const MAX_UNIFORM_LIST: usize = 100_000_000;

/// Cell values of a scalar field.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarField {
    Uniform(f64),
    Values(Vec<f64>),
}

impl ScalarField {
    /// Value of `cell`, or `None` if a per-cell list is too short.
    pub fn value(&self, cell: usize) -> Option<f64> {
        match self {
            ScalarField::Uniform(v) => Some(*v),
            ScalarField::Values(values) => values.get(cell).copied(),
        }
    }
}

/// Face-based mesh connectivity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellTopology {
    pub faces: Vec<Vec<usize>>,
    pub owner: Vec<usize>,
    pub neighbour: Vec<usize>,
}

impl CellTopology {
    /// Reads `faces`, `owner` and `neighbour` from a `polyMesh` directory.
    pub fn read(mesh_dir: &Path) -> Result<Self, VisualizeError> {
        Ok(Self {
            faces: read_faces(&mesh_dir.join("faces"))?,
            owner: read_labels(&mesh_dir.join("owner"))?,
            neighbour: read_labels(&mesh_dir.join("neighbour"))?,
        })
    }

    pub fn cell_count(&self) -> usize {
        self.owner
            .iter()
            .chain(&self.neighbour)
            .max()
            .map_or(0, |max| max + 1)
    }

    /// Approximate cell centres: the mean of the centres of each cell's faces.
    pub fn cell_centres(&self, points: &[Point]) -> Result<Vec<Point>, VisualizeError> {
        let cells = self.cell_count();
        let mut sums = vec![[0.0; 3]; cells];
        let mut counts = vec![0usize; cells];

        for (index, face) in self.faces.iter().enumerate() {
            let Some(centre) = face_centre(face, points) else {
                return Err(VisualizeError::Parse {
                    path: "polyMesh/faces".to_string(),
                    message: format!("face {index} references a missing point"),
                });
            };
            let adjacent = [self.owner.get(index), self.neighbour.get(index)];
            for &cell in adjacent.into_iter().flatten() {
                for axis in 0..3 {
                    sums[cell][axis] += centre[axis];
                }
                counts[cell] += 1;
            }
        }

        Ok(sums
            .into_iter()
            .zip(counts)
            .map(|(sum, n)| {
                let n = n.max(1) as f64;
                [sum[0] / n, sum[1] / n, sum[2] / n]
            })
            .collect())
    }
}

fn face_centre(face: &[usize], points: &[Point]) -> Option<Point> {
    if face.is_empty() {
        return None;
    }
    let mut centre = [0.0; 3];
    for &p in face {
        let point = points.get(p)?;
        for axis in 0..3 {
            centre[axis] += point[axis];
        }
    }
    let n = face.len() as f64;
    Some([centre[0] / n, centre[1] / n, centre[2] / n])
}

pub fn read_points(path: &Path) -> Result<Vec<Point>, VisualizeError> {
    let text = read_stripped(path)?;
    parse_points(&text, path)
}

pub fn read_faces(path: &Path) -> Result<Vec<Vec<usize>>, VisualizeError> {
    let text = read_stripped(path)?;
    let mut cursor = Cursor::new(&text, path);
    cursor.skip_header()?;
    cursor.list(|c| c.list(Cursor::number::<usize>))
}

pub fn read_labels(path: &Path) -> Result<Vec<usize>, VisualizeError> {
    let text = read_stripped(path)?;
    let mut cursor = Cursor::new(&text, path);
    cursor.skip_header()?;
    cursor.list(Cursor::number::<usize>)
}

/// Reads the `internalField` entry of a scalar field file.
pub fn read_internal_field(path: &Path) -> Result<ScalarField, VisualizeError> {
    let text = read_stripped(path)?;
    parse_internal_field(&text, path)
}

fn parse_points(text: &str, path: &Path) -> Result<Vec<Point>, VisualizeError> {
    let mut cursor = Cursor::new(text, path);
    cursor.skip_header()?;
    cursor.list(|c| {
        c.expect("(")?;
        let point: Point = [c.number()?, c.number()?, c.number()?];
        c.expect(")")?;
        Ok(point)
    })
}

fn parse_internal_field(text: &str, path: &Path) -> Result<ScalarField, VisualizeError> {
    let mut cursor = Cursor::new(text, path);
    cursor.skip_header()?;
    if !cursor.seek("internalField") {
        return Err(VisualizeError::parse(path, "no internalField entry"));
    }
    match cursor.next()? {
        "uniform" => Ok(ScalarField::Uniform(cursor.number()?)),
        "nonuniform" => {
            let kind = cursor.next()?;
            if kind != "List<scalar>" {
                return Err(VisualizeError::parse(
                    path,
                    format!("expected List<scalar>, found {kind}"),
                ));
            }
            Ok(ScalarField::Values(cursor.list(Cursor::number::<f64>)?))
        }
        other => Err(VisualizeError::parse(
            path,
            format!("unsupported internalField kind '{other}'"),
        )),
    }
}

fn read_stripped(path: &Path) -> Result<String, VisualizeError> {
    let content = fs::read_to_string(path).map_err(|e| VisualizeError::io(path, e))?;
    Ok(strip_comments(&content))
}

/// Replaces `//` and `/* */` comments with whitespace.
fn strip_comments(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '/' {
            match chars.peek() {
                Some('/') => {
                    for skipped in chars.by_ref() {
                        if skipped == '\n' {
                            break;
                        }
                    }
                    out.push('\n');
                    continue;
                }
                Some('*') => {
                    chars.next();
                    let mut prev = '\0';
                    for skipped in chars.by_ref() {
                        if prev == '*' && skipped == '/' {
                            break;
                        }
                        prev = skipped;
                    }
                    out.push(' ');
                    continue;
                }
                _ => {}
            }
        }
        out.push(c);
    }
    out
}

/// Splits on whitespace; brackets and `;` are tokens of their own.
fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        let delimiter = matches!(c, '(' | ')' | '{' | '}' | ';');
        if c.is_whitespace() || delimiter {
            if let Some(s) = start.take() {
                tokens.push(&text[s..i]);
            }
            if delimiter {
                tokens.push(&text[i..i + 1]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push(&text[s..]);
    }
    tokens
}

struct Cursor<'a> {
    tokens: Vec<&'a str>,
    pos: usize,
    path: &'a Path,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str, path: &'a Path) -> Self {
        Self {
            tokens: tokenize(text),
            pos: 0,
            path,
        }
    }

    fn error(&self, message: impl Into<String>) -> VisualizeError {
        VisualizeError::parse(self.path, message)
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Result<&'a str, VisualizeError> {
        let token = self
            .peek()
            .ok_or_else(|| self.error("unexpected end of file"))?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, expected: &str) -> Result<(), VisualizeError> {
        let token = self.next()?;
        if token == expected {
            Ok(())
        } else {
            Err(self.error(format!("expected '{expected}', found '{token}'")))
        }
    }

    fn number<T: FromStr>(&mut self) -> Result<T, VisualizeError> {
        let token = self.next()?;
        token
            .parse()
            .map_err(|_| self.error(format!("expected a number, found '{token}'")))
    }

    /// Skips the `FoamFile { ... }` header when present.
    fn skip_header(&mut self) -> Result<(), VisualizeError> {
        if self.peek() != Some("FoamFile") {
            return Ok(());
        }
        self.pos += 1;
        self.expect("{")?;
        let mut depth = 1;
        while depth > 0 {
            match self.next()? {
                "{" => depth += 1,
                "}" => depth -= 1,
                _ => {}
            }
        }
        Ok(())
    }

    /// Advances past `keyword`. Returns false if it never occurs.
    fn seek(&mut self, keyword: &str) -> bool {
        while let Some(token) = self.peek() {
            self.pos += 1;
            if token == keyword {
                return true;
            }
        }
        false
    }

    /// Reads `N ( item item ... )` or the uniform shorthand `N { item }`.
    fn list<T: Clone>(
        &mut self,
        mut item: impl FnMut(&mut Self) -> Result<T, VisualizeError>,
    ) -> Result<Vec<T>, VisualizeError> {
        let count: usize = self.number()?;
        match self.next()? {
            "(" => {
                // A list cannot hold more items than tokens remain.
                let mut items = Vec::with_capacity(count.min(self.tokens.len() - self.pos));
                for _ in 0..count {
                    items.push(item(self)?);
                }
                self.expect(")")?;
                Ok(items)
            }
            "{" => {
                if count > MAX_UNIFORM_LIST {
                    return Err(self.error(format!(
                        "uniform list of {count} entries exceeds {MAX_UNIFORM_LIST}"
                    )));
                }
                let value = item(self)?;
                self.expect("}")?;
                Ok(vec![value; count])
            }
            other => Err(self.error(format!("expected list start, found '{other}'"))),
        }
    }
}
