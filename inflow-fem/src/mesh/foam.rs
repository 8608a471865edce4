//! Reader for OpenFOAM `constant/polyMesh` ASCII tables
//!
//! Only the three tables needed to locate a boundary patch are read:
//! `points`, `faces` and `boundary`. FoamFile headers and C/C++ comments
//! are skipped.

use crate::error::{MeshError, Result};
use std::path::Path;

/// A named boundary patch as listed in the `boundary` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryPatch {
    /// Patch name
    pub name: String,
    /// Index of the first face of the patch
    pub start_face: usize,
    /// Number of faces
    pub n_faces: usize,
}

/// Points, faces and boundary patches of a polyhedral mesh
#[derive(Debug, Clone, Default)]
pub struct FoamMesh {
    /// Point coordinates
    pub points: Vec<[f64; 3]>,
    /// Face connectivity (point indices)
    pub faces: Vec<Vec<usize>>,
    /// Boundary patches
    pub patches: Vec<BoundaryPatch>,
}

impl FoamMesh {
    /// Read `points`, `faces` and `boundary` from a `polyMesh` directory
    pub fn read(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let load = |name: &str| {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|source| MeshError::Io { path, source })
        };
        let mesh = Self::parse(&load("points")?, &load("faces")?, &load("boundary")?)?;
        log::info!(
            "Read mesh from {}: {} points, {} faces, {} patches",
            dir.display(),
            mesh.points.len(),
            mesh.faces.len(),
            mesh.patches.len()
        );
        Ok(mesh)
    }

    /// Parse the three tables from their text content
    pub fn parse(points: &str, faces: &str, boundary: &str) -> Result<Self> {
        Ok(Self {
            points: parse_points(points)?,
            faces: parse_faces(faces)?,
            patches: parse_boundary(boundary)?,
        })
    }

    /// Look up a patch by name
    pub fn patch(&self, name: &str) -> Result<&BoundaryPatch> {
        self.patches
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| MeshError::PatchNotFound(name.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'a> {
    Open,
    Close,
    OpenBrace,
    CloseBrace,
    Semicolon,
    Word(&'a str),
}

impl Token<'_> {
    fn describe(&self) -> String {
        match self {
            Token::Open => "'('".into(),
            Token::Close => "')'".into(),
            Token::OpenBrace => "'{'".into(),
            Token::CloseBrace => "'}'".into(),
            Token::Semicolon => "';'".into(),
            Token::Word(w) => format!("'{w}'"),
        }
    }
}

fn tokenize(text: &str) -> Vec<(Token<'_>, usize)> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'\n' => {
                line += 1;
                i += 1;
            }
            _ if b.is_ascii_whitespace() => i += 1,
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                    if bytes[i] == b'\n' {
                        line += 1;
                    }
                    i += 1;
                }
                i += 2;
            }
            b'(' | b')' | b'{' | b'}' | b';' => {
                let token = match b {
                    b'(' => Token::Open,
                    b')' => Token::Close,
                    b'{' => Token::OpenBrace,
                    b'}' => Token::CloseBrace,
                    _ => Token::Semicolon,
                };
                tokens.push((token, line));
                i += 1;
            }
            _ => {
                let start = i;
                while i < bytes.len()
                    && !bytes[i].is_ascii_whitespace()
                    && !matches!(bytes[i], b'(' | b')' | b'{' | b'}' | b';')
                    && !(bytes[i] == b'/' && matches!(bytes.get(i + 1), Some(b'/' | b'*')))
                {
                    i += 1;
                }
                tokens.push((Token::Word(&text[start..i]), line));
            }
        }
    }
    tokens
}

/// Cursor over the tokens of one table
struct Parser<'a> {
    file: &'static str,
    tokens: Vec<(Token<'a>, usize)>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(file: &'static str, text: &'a str) -> Self {
        let mut parser = Self {
            file,
            tokens: tokenize(text),
            pos: 0,
        };
        parser.skip_header();
        parser
    }

    fn error(&self, message: impl Into<String>) -> MeshError {
        let line = self
            .tokens
            .get(self.pos)
            .or(self.tokens.last())
            .map_or(1, |(_, l)| *l);
        MeshError::Parse {
            file: self.file.to_string(),
            line,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).map(|(t, _)| *t)
    }

    fn next(&mut self) -> Result<Token<'a>> {
        let token = self
            .peek()
            .ok_or_else(|| self.error("unexpected end of file"))?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, expected: Token<'static>) -> Result<()> {
        let token = self.next()?;
        if token == expected {
            Ok(())
        } else {
            self.pos -= 1;
            Err(self.error(format!(
                "expected {}, found {}",
                expected.describe(),
                token.describe()
            )))
        }
    }

    fn word(&mut self) -> Result<&'a str> {
        match self.next()? {
            Token::Word(w) => Ok(w),
            other => {
                self.pos -= 1;
                Err(self.error(format!("expected a value, found {}", other.describe())))
            }
        }
    }

    fn number<T: std::str::FromStr>(&mut self) -> Result<T> {
        let w = self.word()?;
        w.parse().map_err(|_| {
            self.pos -= 1;
            self.error(format!("invalid number '{w}'"))
        })
    }

    /// Skip a `FoamFile { ... }` block at the start of the table
    fn skip_header(&mut self) {
        if self.peek() == Some(Token::Word("FoamFile")) {
            self.pos += 1;
            self.skip_block();
        }
    }

    /// Skip a balanced `{ ... }` or `( ... )` group starting at the cursor
    fn skip_block(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            self.pos += 1;
            match token {
                Token::Open | Token::OpenBrace => depth += 1,
                Token::Close | Token::CloseBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return;
                    }
                }
                _ if depth == 0 => return,
                _ => {}
            }
        }
    }

    /// Read the list prefix `[count] (` and return the announced size
    fn list_start(&mut self) -> Result<Option<usize>> {
        let count = match self.peek() {
            Some(Token::Word(_)) => Some(self.number::<usize>()?),
            _ => None,
        };
        self.expect(Token::Open)?;
        Ok(count)
    }

    /// Parse `[count] ( item ... )` with `item` reading one element
    fn list<T>(&mut self, mut item: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let count = self.list_start()?;
        let mut items = Vec::with_capacity(count.unwrap_or(0));
        while self.peek() != Some(Token::Close) {
            if self.peek().is_none() {
                return Err(self.error("unterminated list"));
            }
            items.push(item(self)?);
        }
        self.pos += 1;
        if let Some(count) = count.filter(|&c| c != items.len()) {
            return Err(self.error(format!(
                "list announces {count} entries but holds {}",
                items.len()
            )));
        }
        Ok(items)
    }
}

fn parse_points(text: &str) -> Result<Vec<[f64; 3]>> {
    let mut parser = Parser::new("points", text);
    parser.list(|p| {
        p.expect(Token::Open)?;
        let point = [p.number()?, p.number()?, p.number()?];
        p.expect(Token::Close)?;
        Ok(point)
    })
}

fn parse_faces(text: &str) -> Result<Vec<Vec<usize>>> {
    let mut parser = Parser::new("faces", text);
    parser.list(|p| p.list(|q| q.number::<usize>()))
}

fn parse_boundary(text: &str) -> Result<Vec<BoundaryPatch>> {
    let mut parser = Parser::new("boundary", text);
    parser.list(|p| {
        let name = p.word()?.to_string();
        p.expect(Token::OpenBrace)?;
        let mut start_face = None;
        let mut n_faces = None;
        while p.peek() != Some(Token::CloseBrace) {
            let key = p.word()?;
            match key {
                "startFace" => start_face = Some(p.number::<usize>()?),
                "nFaces" => n_faces = Some(p.number::<usize>()?),
                _ => {
                    // Skip any value, including nested lists such as inGroups.
                    while !matches!(p.peek(), Some(Token::Semicolon) | None) {
                        if matches!(p.peek(), Some(Token::Open | Token::OpenBrace)) {
                            p.skip_block();
                        } else {
                            p.pos += 1;
                        }
                    }
                }
            }
            p.expect(Token::Semicolon)?;
        }
        p.pos += 1;
        match (start_face, n_faces) {
            (Some(start_face), Some(n_faces)) => Ok(BoundaryPatch {
                name,
                start_face,
                n_faces,
            }),
            _ => Err(p.error(format!("patch '{name}' lacks startFace or nFaces"))),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = r#"/*--------------------------------*- C++ -*----------------------------------*\
  =========                 |
\*---------------------------------------------------------------------------*/
FoamFile
{
    version     2.0;
    format      ascii;
    class       vectorField;
    location    "constant/polyMesh";
    object      points;
}
// * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * //
"#;

    #[test]
    fn test_parse_points_with_header() {
        let text = format!("{HEADER}\n3\n(\n(0 0 0)\n(1.5 -2e-1 3)\n(0 1 0)\n)\n// end\n");
        let points = parse_points(&text).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[1], [1.5, -0.2, 3.0]);
    }

    #[test]
    fn test_parse_faces_mixed() {
        let text = "3\n(\n4(0 1 2 3)\n3(1 2 4) 4(4 5 6 7)\n)\n";
        let faces = parse_faces(text).unwrap();
        assert_eq!(faces, vec![vec![0, 1, 2, 3], vec![1, 2, 4], vec![4, 5, 6, 7]]);
    }

    #[test]
    fn test_parse_boundary() {
        let text = r#"
2
(
    inlet
    {
        type            patch;
        inGroups        1(inletGroup);
        nFaces          4;
        startFace       12;
    }
    walls
    {
        type            wall;
        nFaces          8;
        startFace       16;
    }
)
"#;
        let patches = parse_boundary(text).unwrap();
        assert_eq!(
            patches[0],
            BoundaryPatch {
                name: "inlet".into(),
                start_face: 12,
                n_faces: 4
            }
        );
        assert_eq!(patches[1].name, "walls");
    }

    #[test]
    fn test_parse_errors_carry_line() {
        let err = parse_points("2\n(\n(0 0 0)\n(1 x 0)\n)\n").unwrap_err();
        match err {
            MeshError::Parse { file, line, .. } => {
                assert_eq!(file, "points");
                assert_eq!(line, 4);
            }
            other => panic!("unexpected error {other:?}"),
        }

        let err = parse_points("3\n(\n(0 0 0)\n)\n").unwrap_err();
        assert!(err.to_string().contains("announces 3 entries"));
    }

    #[test]
    fn test_patch_lookup() {
        let mesh = FoamMesh {
            patches: vec![BoundaryPatch {
                name: "inlet".into(),
                start_face: 0,
                n_faces: 1,
            }],
            ..Default::default()
        };
        assert!(mesh.patch("inlet").is_ok());
        assert!(matches!(
            mesh.patch("outlet"),
            Err(MeshError::PatchNotFound(name)) if name == "outlet"
        ));
    }
}
