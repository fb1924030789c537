//! Vector import: sanitize, parse, and extract silhouettes from SVG markup.
//!
//! Markup is stripped of embedded styling and scripting before it is parsed,
//! and the sanitized text is what gets stored on the image object.

#[cfg(test)]
#[path = "svg_test.rs"]
mod svg_test;

use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::warn;
use usvg::tiny_skia_path::{PathSegment, Transform};

use crate::error::CanvasError;
use crate::geom::{Point, Size};

const UNSAFE_PATTERNS: [&str; 4] = [
    r"(?is)<style\b[^>]*>.*?</style\s*>",
    r"(?is)<style\b[^>]*/>",
    r"(?is)<script\b[^>]*>.*?</script\s*>",
    r#"(?i)\s+on[a-z]+\s*=\s*("[^"]*"|'[^']*')"#,
];

static UNSAFE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    UNSAFE_PATTERNS
        .iter()
        .filter_map(|p| match Regex::new(p) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!(pattern = p, error = %e, "svg: sanitizer pattern rejected");
                None
            }
        })
        .collect()
});

/// A parsed and sanitized vector document.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorImage {
    /// Sanitized markup.
    pub markup: String,
    /// Intrinsic document size.
    pub size: Size,
    /// Number of drawable leaf nodes.
    pub drawable_count: usize,
}

/// One absolute path command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCmd {
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    CubicTo(Point, Point, Point),
    Close,
}

/// Outline of every path in a document, in document coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Silhouette {
    pub size: Size,
    pub paths: Vec<Vec<PathCmd>>,
}

/// Remove `<style>` and `<script>` elements and inline event handlers.
#[must_use]
pub fn sanitize(markup: &str) -> String {
    UNSAFE.iter().fold(markup.to_string(), |acc, re| re.replace_all(&acc, "").into_owned())
}

/// Sanitize and parse markup into a usvg tree.
///
/// # Errors
///
/// [`CanvasError::InvalidFormat`] when the markup is empty, has no `<svg`
/// root, or fails to parse.
pub fn parse_tree(markup: &str) -> Result<(String, usvg::Tree), CanvasError> {
    let trimmed = markup.trim();
    if trimmed.is_empty() {
        return Err(CanvasError::InvalidFormat("empty markup".into()));
    }
    if !trimmed.to_ascii_lowercase().contains("<svg") {
        return Err(CanvasError::InvalidFormat("missing <svg> root".into()));
    }
    let clean = sanitize(trimmed);
    let tree = usvg::Tree::from_str(&clean, &usvg::Options::default())
        .map_err(|e| CanvasError::InvalidFormat(e.to_string()))?;
    Ok((clean, tree))
}

/// Parse markup into a [`VectorImage`].
///
/// # Errors
///
/// [`CanvasError::InvalidFormat`] for malformed input and
/// [`CanvasError::UnsupportedContent`] when nothing in the document draws.
pub fn parse(markup: &str) -> Result<VectorImage, CanvasError> {
    let (clean, tree) = parse_tree(markup)?;
    let drawable_count = count_drawables(tree.root());
    if drawable_count == 0 {
        return Err(CanvasError::UnsupportedContent);
    }
    let size = tree.size();
    Ok(VectorImage {
        markup: clean,
        size: Size::new(f64::from(size.width()), f64::from(size.height())),
        drawable_count,
    })
}

fn count_drawables(group: &usvg::Group) -> usize {
    group
        .children()
        .iter()
        .map(|node| match node {
            usvg::Node::Group(g) => count_drawables(g),
            _ => 1,
        })
        .sum()
}

/// Parse markup and collect the absolute outline of every path.
///
/// # Errors
///
/// Same as [`parse`]; a document with no paths is
/// [`CanvasError::UnsupportedContent`].
pub fn silhouette(markup: &str) -> Result<Silhouette, CanvasError> {
    let (_, tree) = parse_tree(markup)?;
    let mut paths = Vec::new();
    collect_paths(tree.root(), &mut paths);
    if paths.is_empty() {
        return Err(CanvasError::UnsupportedContent);
    }
    let size = tree.size();
    Ok(Silhouette { size: Size::new(f64::from(size.width()), f64::from(size.height())), paths })
}

fn collect_paths(group: &usvg::Group, out: &mut Vec<Vec<PathCmd>>) {
    for node in group.children() {
        match node {
            usvg::Node::Group(g) => collect_paths(g, out),
            usvg::Node::Path(path) => {
                let ts = path.abs_transform();
                let map = |p: usvg::tiny_skia_path::Point| apply(ts, p);
                let cmds = path
                    .data()
                    .segments()
                    .map(|seg| match seg {
                        PathSegment::MoveTo(p) => PathCmd::MoveTo(map(p)),
                        PathSegment::LineTo(p) => PathCmd::LineTo(map(p)),
                        PathSegment::QuadTo(c, p) => PathCmd::QuadTo(map(c), map(p)),
                        PathSegment::CubicTo(c1, c2, p) => PathCmd::CubicTo(map(c1), map(c2), map(p)),
                        PathSegment::Close => PathCmd::Close,
                    })
                    .collect();
                out.push(cmds);
            }
            _ => {}
        }
    }
}

fn apply(ts: Transform, p: usvg::tiny_skia_path::Point) -> Point {
    let (x, y) = (f64::from(p.x), f64::from(p.y));
    Point::new(
        f64::from(ts.sx) * x + f64::from(ts.kx) * y + f64::from(ts.tx),
        f64::from(ts.ky) * x + f64::from(ts.sy) * y + f64::from(ts.ty),
    )
}

/// SVG path data for a command list, suitable for `Path2D`.
#[must_use]
pub fn path_data(cmds: &[PathCmd]) -> String {
    cmds.iter()
        .map(|cmd| match cmd {
            PathCmd::MoveTo(p) => format!("M{} {}", p.x, p.y),
            PathCmd::LineTo(p) => format!("L{} {}", p.x, p.y),
            PathCmd::QuadTo(c, p) => format!("Q{} {} {} {}", c.x, c.y, p.x, p.y),
            PathCmd::CubicTo(a, b, p) => format!("C{} {} {} {} {} {}", a.x, a.y, b.x, b.y, p.x, p.y),
            PathCmd::Close => "Z".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
