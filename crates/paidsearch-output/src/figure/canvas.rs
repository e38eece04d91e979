//! Minimal immediate-mode SVG canvas.

use std::fmt;

/// RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

impl Color {
    /// Build a colour from its channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Light grey used for grid lines.
    pub const GRID: Self = Self::rgb(225, 225, 225);
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Stroke style for lines and polylines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    /// Stroke colour
    pub color: Color,
    /// Stroke width in pixels
    pub width: f64,
    /// Dashed instead of solid
    pub dashed: bool,
}

impl LineStyle {
    /// Solid stroke.
    pub const fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dashed: false,
        }
    }

    /// Dashed stroke.
    pub const fn dashed(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dashed: true,
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Left aligned
    Start,
    /// Centred
    Middle,
    /// Right aligned
    End,
}

impl Anchor {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

/// Text style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Font size in pixels
    pub size: f64,
    /// Alignment relative to the anchor point
    pub anchor: Anchor,
    /// Rotation in degrees around the anchor point
    pub rotate: Option<f64>,
}

impl TextStyle {
    /// Text of the given size and alignment, unrotated.
    pub const fn new(size: f64, anchor: Anchor) -> Self {
        Self {
            size,
            anchor,
            rotate: None,
        }
    }

    /// Rotate the text.
    pub const fn rotated(mut self, degrees: f64) -> Self {
        self.rotate = Some(degrees);
        self
    }
}

#[derive(Debug, Clone)]
enum Element {
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        style: LineStyle,
    },
    Polyline {
        points: Vec<(f64, f64)>,
        style: LineStyle,
    },
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        stroke: Color,
    },
    Text {
        x: f64,
        y: f64,
        content: String,
        style: TextStyle,
    },
}

/// SVG canvas in pixel coordinates, origin top-left.
#[derive(Debug, Clone)]
pub struct SvgCanvas {
    width: f64,
    height: f64,
    elements: Vec<Element>,
}

impl SvgCanvas {
    /// Empty canvas of the given size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            elements: Vec::new(),
        }
    }

    /// Canvas width.
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Canvas height.
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Straight segment.
    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, style: LineStyle) {
        self.elements.push(Element::Line {
            x1,
            y1,
            x2,
            y2,
            style,
        });
    }

    /// Connected segments; fewer than two points draws nothing.
    pub fn polyline(&mut self, points: Vec<(f64, f64)>, style: LineStyle) {
        if points.len() >= 2 {
            self.elements.push(Element::Polyline { points, style });
        }
    }

    /// Unfilled rectangle.
    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, stroke: Color) {
        self.elements.push(Element::Rect { x, y, w, h, stroke });
    }

    /// Text label.
    pub fn text(&mut self, x: f64, y: f64, content: impl Into<String>, style: TextStyle) {
        self.elements.push(Element::Text {
            x,
            y,
            content: content.into(),
            style,
        });
    }

    /// Serialize the canvas to an SVG document.
    pub fn finish_svg(&self) -> String {
        self.to_string()
    }
}

fn write_stroke(f: &mut fmt::Formatter<'_>, style: &LineStyle) -> fmt::Result {
    write!(
        f,
        r#" stroke="{}" stroke-width="{:.2}""#,
        style.color, style.width
    )?;
    if style.dashed {
        write!(f, r#" stroke-dasharray="6 4""#)?;
    }
    Ok(())
}

fn write_escaped(f: &mut fmt::Formatter<'_>, content: &str) -> fmt::Result {
    for ch in content.chars() {
        match ch {
            '<' => f.write_str("&lt;")?,
            '>' => f.write_str("&gt;")?,
            '&' => f.write_str("&amp;")?,
            '"' => f.write_str("&quot;")?,
            _ => write!(f, "{ch}")?,
        }
    }
    Ok(())
}

impl fmt::Display for SvgCanvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height,
        )?;
        writeln!(
            f,
            r#"<rect width="{}" height="{}" fill="white" />"#,
            self.width, self.height
        )?;

        for element in &self.elements {
            match element {
                Element::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    style,
                } => {
                    write!(
                        f,
                        r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}""#
                    )?;
                    write_stroke(f, style)?;
                    writeln!(f, " />")?;
                }
                Element::Polyline { points, style } => {
                    write!(f, r#"<polyline fill="none" points=""#)?;
                    for (i, (x, y)) in points.iter().enumerate() {
                        if i > 0 {
                            f.write_str(" ")?;
                        }
                        write!(f, "{x:.2},{y:.2}")?;
                    }
                    f.write_str("\"")?;
                    write_stroke(f, style)?;
                    writeln!(f, " />")?;
                }
                Element::Rect { x, y, w, h, stroke } => {
                    writeln!(
                        f,
                        r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="none" stroke="{stroke}" />"#
                    )?;
                }
                Element::Text {
                    x,
                    y,
                    content,
                    style,
                } => {
                    write!(
                        f,
                        r#"<text x="{x:.2}" y="{y:.2}" font-family="DejaVu Sans, Arial, sans-serif" font-size="{:.1}" text-anchor="{}""#,
                        style.size,
                        style.anchor.as_str()
                    )?;
                    if let Some(angle) = style.rotate {
                        write!(f, r#" transform="rotate({angle:.1},{x:.2},{y:.2})""#)?;
                    }
                    f.write_str(">")?;
                    write_escaped(f, content)?;
                    writeln!(f, "</text>")?;
                }
            }
        }

        writeln!(f, "</svg>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex() {
        assert_eq!(Color::rgb(31, 119, 180).to_string(), "#1f77b4");
    }

    #[test]
    fn test_document_shape() {
        let mut canvas = SvgCanvas::new(200.0, 100.0);
        canvas.line(0.0, 0.0, 10.0, 10.0, LineStyle::dashed(Color::BLACK, 1.0));
        canvas.text(5.0, 5.0, "a < b & c", TextStyle::new(10.0, Anchor::Middle));
        let svg = canvas.finish_svg();

        assert!(svg.starts_with("<svg "));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(r#"stroke-dasharray="6 4""#));
        assert!(svg.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn test_single_point_polyline_skipped() {
        let mut canvas = SvgCanvas::new(10.0, 10.0);
        canvas.polyline(vec![(1.0, 1.0)], LineStyle::solid(Color::BLACK, 1.0));
        assert!(!canvas.finish_svg().contains("<polyline"));
    }
}
