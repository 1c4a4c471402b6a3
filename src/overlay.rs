//! Annotation geometry drawn over the controller image.
//!
//! Everything here is in profile view-box units. The same primitive list
//! feeds the on-screen painter and the SVG export.

use crate::mapping::MappingStore;
use crate::profile::{ControlSpec, DeviceProfile, LineDirection, Point};

/// Length of the horizontal line the labels sit on
pub const LABEL_LINE_LENGTH: f32 = 250.0;
const LABEL_INSET: f32 = 10.0;
const TITLE_RISE: f32 = 10.0;
const FUNCTION_DROP: f32 = 20.0;

pub const CONNECTOR_WIDTH: f32 = 2.0;
pub const LABEL_LINE_WIDTH: f32 = 1.5;
pub const TITLE_SIZE: f32 = 17.6;
pub const FUNCTION_SIZE: f32 = 12.8;

pub const UNASSIGNED: &str = "Unassigned";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    End,
}

impl TextAnchor {
    fn svg(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelRole {
    /// "A Button", bold white
    Title,
    /// Mapped function name or "Unassigned", grey
    Function,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Line {
        from: Point,
        to: Point,
        width: f32,
    },
    Label {
        at: Point,
        text: String,
        anchor: TextAnchor,
        role: LabelRole,
    },
}

/// Where the horizontal label line ends
pub fn label_end(spec: &ControlSpec) -> Point {
    let x = match spec.direction {
        LineDirection::Left => spec.elbow.x - LABEL_LINE_LENGTH,
        LineDirection::Right => spec.elbow.x + LABEL_LINE_LENGTH,
    };
    Point::new(x, spec.elbow.y)
}

pub fn render(profile: &DeviceProfile, store: &MappingStore) -> Vec<Primitive> {
    let mut primitives = Vec::with_capacity(profile.items.len() * 4);

    for spec in &profile.items {
        let end = label_end(spec);
        let (text_x, anchor) = match spec.direction {
            LineDirection::Left => (end.x + LABEL_INSET, TextAnchor::Start),
            LineDirection::Right => (end.x - LABEL_INSET, TextAnchor::End),
        };

        let function = store
            .get(spec.key())
            .map(|entry| entry.function_name.clone())
            .unwrap_or_else(|| UNASSIGNED.to_string());

        primitives.push(Primitive::Line {
            from: spec.origin,
            to: spec.elbow,
            width: CONNECTOR_WIDTH,
        });
        primitives.push(Primitive::Line {
            from: spec.elbow,
            to: end,
            width: LABEL_LINE_WIDTH,
        });
        primitives.push(Primitive::Label {
            at: Point::new(text_x, spec.elbow.y - TITLE_RISE),
            text: spec.full_title(),
            anchor,
            role: LabelRole::Title,
        });
        primitives.push(Primitive::Label {
            at: Point::new(text_x, spec.elbow.y + FUNCTION_DROP),
            text: function,
            anchor,
            role: LabelRole::Function,
        });
    }

    primitives
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Standalone SVG with the background image referenced by `image_href`
pub fn to_svg(profile: &DeviceProfile, primitives: &[Primitive], image_href: &str) -> String {
    let (width, height) = profile.view_box;
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}">"#
    );
    svg.push('\n');
    svg.push_str(&format!(
        r#"  <rect width="{width}" height="{height}" fill="hsl(240 10% 3.9%)" />"#
    ));
    svg.push('\n');
    svg.push_str(&format!(
        r#"  <image href="{}" width="{width}" height="{height}" />"#,
        escape(image_href)
    ));
    svg.push('\n');

    for primitive in primitives {
        let element = match primitive {
            Primitive::Line { from, to, width } => format!(
                r#"  <line x1="{}" y1="{}" x2="{}" y2="{}" stroke="white" stroke-width="{}" />"#,
                from.x, from.y, to.x, to.y, width
            ),
            Primitive::Label {
                at,
                text,
                anchor,
                role,
            } => {
                let style = match role {
                    LabelRole::Title => {
                        format!(r#"fill="white" font-size="{TITLE_SIZE}" font-weight="bold""#)
                    }
                    LabelRole::Function => format!(r##"fill="#737373" font-size="{FUNCTION_SIZE}""##),
                };
                format!(
                    r#"  <text x="{}" y="{}" {} text-anchor="{}">{}</text>"#,
                    at.x,
                    at.y,
                    style,
                    anchor.svg(),
                    escape(text)
                )
            }
        };
        svg.push_str(&element);
        svg.push('\n');
    }

    svg.push_str("</svg>\n");
    svg
}
