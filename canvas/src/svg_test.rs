#![allow(clippy::float_cmp)]

use super::*;

const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20"><rect x="0" y="0" width="40" height="20" fill="red"/></svg>"#;

#[test]
fn parses_size_and_drawables() {
    let img = parse(SQUARE).unwrap();
    assert_eq!(img.size, Size::new(40.0, 20.0));
    assert_eq!(img.drawable_count, 1);
}

#[test]
fn counts_nested_drawables() {
    let markup = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10">
        <g opacity="0.5"><rect width="5" height="5"/><circle cx="7" cy="7" r="2"/></g>
        <rect x="1" y="1" width="2" height="2"/>
    </svg>"#;
    assert_eq!(parse(markup).unwrap().drawable_count, 3);
}

#[test]
fn non_svg_markup_is_invalid_format() {
    let err = parse("<not-svg>").unwrap_err();
    assert!(matches!(err, CanvasError::InvalidFormat(_)));
}

#[test]
fn empty_markup_is_invalid_format() {
    assert!(matches!(parse("   ").unwrap_err(), CanvasError::InvalidFormat(_)));
}

#[test]
fn malformed_xml_is_invalid_format() {
    let err = parse(r#"<svg xmlns="http://www.w3.org/2000/svg"><rect"#).unwrap_err();
    assert!(matches!(err, CanvasError::InvalidFormat(_)));
}

#[test]
fn document_without_drawables_is_unsupported() {
    let markup = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"></svg>"#;
    assert_eq!(parse(markup).unwrap_err(), CanvasError::UnsupportedContent);
}

#[test]
fn sanitize_strips_style_script_and_handlers() {
    let dirty = r#"<svg xmlns="http://www.w3.org/2000/svg" onload="alert(1)"><style>rect{fill:blue}</style><script>evil()</script><rect width="1" height="1" onclick='x()'/></svg>"#;
    let clean = sanitize(dirty);
    assert!(!clean.contains("<style"));
    assert!(!clean.contains("<script"));
    assert!(!clean.contains("onload"));
    assert!(!clean.contains("onclick"));
    assert!(clean.contains("<rect"));
}

#[test]
fn parsed_markup_is_sanitized() {
    let dirty = r#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"><STYLE type="text/css">rect{}</STYLE><rect width="4" height="4"/></svg>"#;
    let img = parse(dirty).unwrap();
    assert!(!img.markup.to_ascii_lowercase().contains("<style"));
}

#[test]
fn silhouette_applies_group_transform() {
    let markup = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100"><g transform="translate(10 20)"><rect width="30" height="30"/></g></svg>"#;
    let sil = silhouette(markup).unwrap();
    assert_eq!(sil.paths.len(), 1);
    let first = sil.paths[0][0];
    assert_eq!(first, PathCmd::MoveTo(Point::new(10.0, 20.0)));
}

#[test]
fn path_data_formats_commands() {
    let cmds = [
        PathCmd::MoveTo(Point::new(0.0, 0.0)),
        PathCmd::LineTo(Point::new(10.0, 0.0)),
        PathCmd::QuadTo(Point::new(10.0, 10.0), Point::new(0.0, 10.0)),
        PathCmd::Close,
    ];
    assert_eq!(path_data(&cmds), "M0 0 L10 0 Q10 10 0 10 Z");
}
