//! Inline SVG to canvas shape conversion.
//!
//! Converts the first drawable element of an SVG fragment into the
//! Fabric-style object description the canvas editor loads.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

const DRAWABLE: [&str; 7] = [
    "rect", "circle", "ellipse", "line", "polyline", "polygon", "path",
];

/// Parses `markup` (the inner content of an `<svg>` root) and returns the
/// first drawable element as a shape object.
pub fn first_shape(markup: &str) -> Result<Map<String, Value>, String> {
    let wrapped = format!("<svg>{markup}</svg>");
    let mut reader = Reader::from_str(&wrapped);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) | Ok(Event::Empty(element)) => {
                let name = local_name(&element);
                if DRAWABLE.contains(&name.as_str()) {
                    let attrs = attributes(&element)?;
                    return Ok(shape_for(&name, &attrs));
                }
            }
            Ok(Event::Eof) => return Err("no drawable element in SVG markup".to_string()),
            Ok(_) => {}
            Err(err) => {
                return Err(format!(
                    "invalid SVG at position {}: {err}",
                    reader.buffer_position()
                ))
            }
        }
    }
}

fn local_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).to_ascii_lowercase()
}

fn attributes(element: &BytesStart<'_>) -> Result<HashMap<String, String>, String> {
    let mut attrs = HashMap::new();
    for attr in element.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| format!("invalid attribute `{key}`: {err}"))?;
        attrs.insert(key, value.into_owned());
    }
    Ok(attrs)
}

fn number(attrs: &HashMap<String, String>, key: &str) -> f64 {
    attrs
        .get(key)
        .and_then(|value| leading_number(value))
        .unwrap_or(0.0)
}

/// Parses a length like `12`, `12.5px` or `-3e2`, ignoring any unit suffix.
fn leading_number(value: &str) -> Option<f64> {
    let value = value.trim();
    let end = value
        .char_indices()
        .find(|(idx, ch)| {
            !(ch.is_ascii_digit()
                || *ch == '.'
                || ((*ch == '-' || *ch == '+') && (*idx == 0 || value[..*idx].ends_with(['e', 'E'])))
                || ((*ch == 'e' || *ch == 'E') && *idx > 0))
        })
        .map(|(idx, _)| idx)
        .unwrap_or(value.len());
    value[..end].parse().ok()
}

fn shape_for(name: &str, attrs: &HashMap<String, String>) -> Map<String, Value> {
    let mut shape = Map::new();
    let (kind, left, top, width, height) = match name {
        "rect" => {
            let rx = number(attrs, "rx");
            let ry = attrs
                .get("ry")
                .and_then(|value| leading_number(value))
                .unwrap_or(rx);
            shape.insert("rx".into(), json!(rx));
            shape.insert("ry".into(), json!(ry));
            (
                "rect",
                number(attrs, "x"),
                number(attrs, "y"),
                number(attrs, "width"),
                number(attrs, "height"),
            )
        }
        "circle" => {
            let r = number(attrs, "r");
            shape.insert("radius".into(), json!(r));
            (
                "circle",
                number(attrs, "cx") - r,
                number(attrs, "cy") - r,
                2.0 * r,
                2.0 * r,
            )
        }
        "ellipse" => {
            let rx = number(attrs, "rx");
            let ry = number(attrs, "ry");
            shape.insert("rx".into(), json!(rx));
            shape.insert("ry".into(), json!(ry));
            (
                "ellipse",
                number(attrs, "cx") - rx,
                number(attrs, "cy") - ry,
                2.0 * rx,
                2.0 * ry,
            )
        }
        "line" => {
            let (x1, y1, x2, y2) = (
                number(attrs, "x1"),
                number(attrs, "y1"),
                number(attrs, "x2"),
                number(attrs, "y2"),
            );
            shape.insert("x1".into(), json!(x1));
            shape.insert("y1".into(), json!(y1));
            shape.insert("x2".into(), json!(x2));
            shape.insert("y2".into(), json!(y2));
            (
                "line",
                x1.min(x2),
                y1.min(y2),
                (x2 - x1).abs(),
                (y2 - y1).abs(),
            )
        }
        "polyline" | "polygon" => {
            let points = parse_points(attrs.get("points").map(String::as_str).unwrap_or(""));
            let bounds = Bounds::from_points(&points);
            shape.insert(
                "points".into(),
                Value::Array(
                    points
                        .iter()
                        .map(|(x, y)| json!({"x": x, "y": y}))
                        .collect(),
                ),
            );
            let kind = if name == "polygon" { "polygon" } else { "polyline" };
            (kind, bounds.min_x, bounds.min_y, bounds.width(), bounds.height())
        }
        _ => {
            let (commands, bounds) = parse_path(attrs.get("d").map(String::as_str).unwrap_or(""));
            shape.insert("path".into(), Value::Array(commands));
            ("path", bounds.min_x, bounds.min_y, bounds.width(), bounds.height())
        }
    };

    shape.insert("type".into(), json!(kind));
    shape.insert("originX".into(), json!("left"));
    shape.insert("originY".into(), json!("top"));
    shape.insert("left".into(), json!(left));
    shape.insert("top".into(), json!(top));
    shape.insert("width".into(), json!(width));
    shape.insert("height".into(), json!(height));
    shape.insert(
        "fill".into(),
        json!(attrs.get("fill").cloned().unwrap_or_else(|| "rgb(0,0,0)".into())),
    );
    shape.insert(
        "stroke".into(),
        attrs.get("stroke").map_or(Value::Null, |stroke| json!(stroke)),
    );
    let stroke_width = attrs
        .get("stroke-width")
        .and_then(|value| leading_number(value))
        .unwrap_or(1.0);
    shape.insert("strokeWidth".into(), json!(stroke_width));
    shape
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Bounds {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Bounds {
    fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    fn from_points(points: &[(f64, f64)]) -> Self {
        let mut bounds = Self::empty();
        for &(x, y) in points {
            bounds.include(x, y);
        }
        bounds.finish()
    }

    fn include(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Collapses an empty box to the origin.
    fn finish(self) -> Self {
        if self.min_x.is_finite() {
            self
        } else {
            Self {
                min_x: 0.0,
                min_y: 0.0,
                max_x: 0.0,
                max_y: 0.0,
            }
        }
    }

    fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

fn numbers(text: &str) -> Vec<f64> {
    text.split(|ch: char| ch.is_whitespace() || ch == ',')
        .filter(|token| !token.is_empty())
        .filter_map(|token| token.parse().ok())
        .collect()
}

fn parse_points(text: &str) -> Vec<(f64, f64)> {
    numbers(text)
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect()
}

/// Splits path data into `[command, args...]` arrays and tracks the
/// bounding box of every endpoint and control point.
fn parse_path(data: &str) -> (Vec<Value>, Bounds) {
    let mut commands = Vec::new();
    let mut bounds = Bounds::empty();
    let (mut x, mut y) = (0.0f64, 0.0f64);
    let (mut start_x, mut start_y) = (0.0f64, 0.0f64);

    for (command, args) in split_path(data) {
        let relative = command.is_ascii_lowercase();
        let origin = |x: f64, y: f64| if relative { (x, y) } else { (0.0, 0.0) };
        let upper = command.to_ascii_uppercase();
        match upper {
            'M' | 'L' | 'T' => {
                for (idx, pair) in args.chunks_exact(2).enumerate() {
                    let (base_x, base_y) = origin(x, y);
                    x = base_x + pair[0];
                    y = base_y + pair[1];
                    bounds.include(x, y);
                    if upper == 'M' && idx == 0 {
                        start_x = x;
                        start_y = y;
                    }
                }
            }
            'H' => {
                for value in &args {
                    x = origin(x, y).0 + value;
                    bounds.include(x, y);
                }
            }
            'V' => {
                for value in &args {
                    y = origin(x, y).1 + value;
                    bounds.include(x, y);
                }
            }
            'C' | 'S' | 'Q' => {
                let stride = if upper == 'C' { 6 } else { 4 };
                for group in args.chunks_exact(stride) {
                    let (base_x, base_y) = origin(x, y);
                    for pair in group.chunks_exact(2) {
                        bounds.include(base_x + pair[0], base_y + pair[1]);
                    }
                    x = base_x + group[stride - 2];
                    y = base_y + group[stride - 1];
                }
            }
            'A' => {
                for group in args.chunks_exact(7) {
                    let (base_x, base_y) = origin(x, y);
                    x = base_x + group[5];
                    y = base_y + group[6];
                    bounds.include(x, y);
                }
            }
            'Z' => {
                x = start_x;
                y = start_y;
            }
            _ => continue,
        }

        let mut entry = vec![json!(command.to_string())];
        entry.extend(args.iter().map(|arg| json!(arg)));
        commands.push(Value::Array(entry));
    }

    (commands, bounds.finish())
}

fn split_path(data: &str) -> Vec<(char, Vec<f64>)> {
    let mut segments = Vec::new();
    let mut current: Option<(char, String)> = None;
    for ch in data.chars() {
        if ch.is_ascii_alphabetic() && ch != 'e' && ch != 'E' {
            if let Some((command, args)) = current.take() {
                segments.push((command, path_numbers(&args)));
            }
            current = Some((ch, String::new()));
        } else if let Some((_, args)) = current.as_mut() {
            args.push(ch);
        }
    }
    if let Some((command, args)) = current {
        segments.push((command, path_numbers(&args)));
    }
    segments
}

/// Path arguments may omit separators before a minus sign (`10-5`).
fn path_numbers(text: &str) -> Vec<f64> {
    let mut spaced = String::with_capacity(text.len() + 8);
    let mut prev = ' ';
    for ch in text.chars() {
        if ch == '-' && prev != 'e' && prev != 'E' {
            spaced.push(' ');
        }
        spaced.push(ch);
        prev = ch;
    }
    numbers(&spaced)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_keeps_position_and_size() {
        let shape = first_shape(r#"<rect x="10" y="20" width="30" height="40"/>"#).unwrap();
        assert_eq!(shape["type"], "rect");
        assert_eq!(shape["left"], 10.0);
        assert_eq!(shape["top"], 20.0);
        assert_eq!(shape["width"], 30.0);
        assert_eq!(shape["height"], 40.0);
        assert_eq!(shape["strokeWidth"], 1.0);
    }

    #[test]
    fn circle_is_positioned_by_its_bounding_box() {
        let shape = first_shape(r#"<circle cx="50" cy="60" r="5" stroke-width="2px"/>"#).unwrap();
        assert_eq!(shape["type"], "circle");
        assert_eq!(shape["left"], 45.0);
        assert_eq!(shape["top"], 55.0);
        assert_eq!(shape["radius"], 5.0);
        assert_eq!(shape["strokeWidth"], 2.0);
    }

    #[test]
    fn polygon_points_define_bounds() {
        let shape = first_shape(r#"<polygon points="0,0 10,5 4,12"/>"#).unwrap();
        assert_eq!(shape["type"], "polygon");
        assert_eq!(shape["width"], 10.0);
        assert_eq!(shape["height"], 12.0);
        assert_eq!(shape["points"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn path_tracks_relative_commands() {
        let shape = first_shape(r#"<path d="M10 10 l20-5 v15 z"/>"#).unwrap();
        assert_eq!(shape["type"], "path");
        assert_eq!(shape["left"], 10.0);
        assert_eq!(shape["top"], 5.0);
        assert_eq!(shape["width"], 20.0);
        assert_eq!(shape["height"], 15.0);
        assert_eq!(shape["path"][1], json!(["l", 20.0, -5.0]));
    }

    #[test]
    fn repeated_relative_pairs_advance_from_the_current_point() {
        let shape = first_shape(r#"<path d="m0 0 10 0 10 10"/>"#).unwrap();
        assert_eq!(shape["width"], 20.0);
        assert_eq!(shape["height"], 10.0);
    }

    #[test]
    fn first_drawable_wins_inside_groups() {
        let shape =
            first_shape(r#"<g><title>t</title><ellipse cx="5" cy="5" rx="2" ry="1"/></g><rect/>"#)
                .unwrap();
        assert_eq!(shape["type"], "ellipse");
        assert_eq!(shape["width"], 4.0);
    }

    #[test]
    fn markup_without_shape_is_rejected() {
        assert!(first_shape("<g><title>empty</title></g>").is_err());
        assert!(first_shape("").is_err());
    }

    #[test]
    fn leading_number_ignores_units() {
        assert_eq!(leading_number("12.5px"), Some(12.5));
        assert_eq!(leading_number("-3e2"), Some(-300.0));
        assert_eq!(leading_number("abc"), None);
    }
}
