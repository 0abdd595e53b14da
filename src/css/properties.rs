//! Property application: declaration values → typed fields on
//! [`crate::css::styles::Styles`].
//!
//! The property set is closed. Unknown properties and malformed values are
//! reported as errors here; the stylesheet compiler logs and skips them so
//! one bad declaration never rejects a rule.

use crate::css::model::DeclarationValue;
use crate::css::scalar::{Scalar, ScalarBox};
use crate::css::styles::*;

/// Errors from property application.
#[derive(Debug, thiserror::Error)]
pub enum PropertyError {
    #[error("unknown property: {0}")]
    UnknownProperty(String),
    #[error("invalid value for {property}: {message}")]
    InvalidValue { property: String, message: String },
}

fn invalid(property: &str, message: impl Into<String>) -> PropertyError {
    PropertyError::InvalidValue {
        property: property.into(),
        message: message.into(),
    }
}

/// Parse a single declaration value into a [`Scalar`].
pub fn parse_scalar(value: &DeclarationValue) -> Result<Scalar, PropertyError> {
    match value {
        DeclarationValue::Number(n) => Ok(Scalar::cells(*n)),
        DeclarationValue::Dimension(n, unit) => match unit.as_str() {
            "fr" => Ok(Scalar::fr(*n)),
            "%" => Ok(Scalar::percent(*n)),
            "vw" => Ok(Scalar::vw(*n)),
            "vh" => Ok(Scalar::vh(*n)),
            other => Err(invalid("scalar", format!("unknown unit: {other}"))),
        },
        DeclarationValue::Ident(name) if name.eq_ignore_ascii_case("auto") => Ok(Scalar::auto()),
        other => Err(invalid(
            "scalar",
            format!("expected number, dimension, or 'auto', got: {other:?}"),
        )),
    }
}

/// Parse 1-4 scalar values into a [`ScalarBox`] (CSS shorthand).
///
/// - 1 value: all sides
/// - 2 values: vertical, horizontal
/// - 3 values: top, horizontal, bottom
/// - 4 values: top, right, bottom, left
pub fn parse_scalar_box(values: &[DeclarationValue]) -> Result<ScalarBox, PropertyError> {
    match values.len() {
        1 => {
            let v = parse_scalar(&values[0])?;
            Ok(ScalarBox::all(v))
        }
        2 => {
            let vertical = parse_scalar(&values[0])?;
            let horizontal = parse_scalar(&values[1])?;
            Ok(ScalarBox::symmetric(vertical, horizontal))
        }
        3 => {
            let top = parse_scalar(&values[0])?;
            let horizontal = parse_scalar(&values[1])?;
            let bottom = parse_scalar(&values[2])?;
            Ok(ScalarBox::new(top, horizontal, bottom, horizontal))
        }
        4 => {
            let top = parse_scalar(&values[0])?;
            let right = parse_scalar(&values[1])?;
            let bottom = parse_scalar(&values[2])?;
            let left = parse_scalar(&values[3])?;
            Ok(ScalarBox::new(top, right, bottom, left))
        }
        n => Err(invalid("margin/padding", format!("expected 1-4 values, got {n}"))),
    }
}

fn require_single<'a>(
    values: &'a [DeclarationValue],
    property: &str,
) -> Result<&'a DeclarationValue, PropertyError> {
    if values.len() != 1 {
        return Err(invalid(
            property,
            format!("expected 1 value, got {}", values.len()),
        ));
    }
    Ok(&values[0])
}

fn require_single_ident<'a>(
    values: &'a [DeclarationValue],
    property: &str,
) -> Result<&'a str, PropertyError> {
    match require_single(values, property)? {
        DeclarationValue::Ident(name) => Ok(name.as_str()),
        other => Err(invalid(
            property,
            format!("expected identifier, got: {other:?}"),
        )),
    }
}

fn require_color_value(
    values: &[DeclarationValue],
    property: &str,
) -> Result<String, PropertyError> {
    match require_single(values, property)? {
        DeclarationValue::Ident(name) => Ok(name.clone()),
        DeclarationValue::Color(hex) => Ok(format!("#{hex}")),
        other => Err(invalid(
            property,
            format!("expected color name or hex color, got: {other:?}"),
        )),
    }
}

fn require_span(values: &[DeclarationValue], property: &str) -> Result<u32, PropertyError> {
    match require_single(values, property)? {
        DeclarationValue::Number(n) if *n >= 0.0 && n.fract() == 0.0 => Ok(*n as u32),
        other => Err(invalid(
            property,
            format!("expected non-negative integer, got: {other:?}"),
        )),
    }
}

fn parse_overflow(name: &str, property: &str) -> Result<Overflow, PropertyError> {
    match name {
        "visible" => Ok(Overflow::Visible),
        "hidden" => Ok(Overflow::Hidden),
        "scroll" => Ok(Overflow::Scroll),
        "auto" => Ok(Overflow::Auto),
        other => Err(invalid(
            property,
            format!("expected visible|hidden|scroll|auto, got: {other}"),
        )),
    }
}

/// Parse a scalar track template: `grid-rows: 1fr 2 30%;`.
fn parse_tracks(values: &[DeclarationValue], property: &str) -> Result<Vec<Scalar>, PropertyError> {
    if values.is_empty() {
        return Err(invalid(property, "expected at least 1 track"));
    }
    values.iter().map(parse_scalar).collect()
}

/// Parse border values: `<kind>` or `<kind> <color>`.
fn parse_border(values: &[DeclarationValue]) -> Result<Border, PropertyError> {
    let kind_str = match values.first() {
        Some(DeclarationValue::Ident(name)) => name.as_str(),
        Some(other) => {
            return Err(invalid(
                "border",
                format!("expected border kind identifier, got: {other:?}"),
            ));
        }
        None => return Err(invalid("border", "expected at least 1 value")),
    };

    let kind = match kind_str {
        "none" => BorderKind::None,
        "thin" => BorderKind::Thin,
        "heavy" => BorderKind::Heavy,
        "double" => BorderKind::Double,
        "round" => BorderKind::Round,
        "ascii" => BorderKind::Ascii,
        other => return Err(invalid("border", format!("unknown border kind: {other}"))),
    };

    let color = match values.get(1) {
        Some(DeclarationValue::Ident(name)) => Some(name.clone()),
        Some(DeclarationValue::Color(hex)) => Some(format!("#{hex}")),
        Some(other) => {
            return Err(invalid(
                "border",
                format!("expected color for border, got: {other:?}"),
            ));
        }
        None => None,
    };

    Ok(Border { kind, color })
}

/// Parse text-style values: one or more of bold, dim, italic, underline,
/// strikethrough, reverse; or `none` to reset.
fn parse_text_style(values: &[DeclarationValue]) -> Result<TextStyleFlags, PropertyError> {
    let mut flags = TextStyleFlags::default();
    for value in values {
        let name = match value {
            DeclarationValue::Ident(name) => name.as_str(),
            other => {
                return Err(invalid(
                    "text-style",
                    format!("expected text style identifier, got: {other:?}"),
                ));
            }
        };
        match name {
            "bold" => flags.bold = Some(true),
            "dim" => flags.dim = Some(true),
            "italic" => flags.italic = Some(true),
            "underline" => flags.underline = Some(true),
            "strikethrough" => flags.strikethrough = Some(true),
            "reverse" => flags.reverse = Some(true),
            "none" => {
                flags.bold = Some(false);
                flags.dim = Some(false);
                flags.italic = Some(false);
                flags.underline = Some(false);
                flags.strikethrough = Some(false);
                flags.reverse = Some(false);
            }
            other => return Err(invalid("text-style", format!("unknown text style: {other}"))),
        }
    }
    Ok(flags)
}

/// Apply a declaration (property name + values) to a mutable [`Styles`].
pub fn apply_declaration(
    styles: &mut Styles,
    property: &str,
    values: &[DeclarationValue],
) -> Result<(), PropertyError> {
    match property {
        // Display & layout strategy
        "display" => {
            let name = require_single_ident(values, "display")?;
            styles.display = Some(match name {
                "block" => Display::Block,
                "none" => Display::None,
                other => return Err(invalid("display", format!("expected block|none, got: {other}"))),
            });
        }
        "visibility" => {
            let name = require_single_ident(values, "visibility")?;
            styles.visibility = Some(match name {
                "visible" => Visibility::Visible,
                "hidden" => Visibility::Hidden,
                other => {
                    return Err(invalid(
                        "visibility",
                        format!("expected visible|hidden, got: {other}"),
                    ));
                }
            });
        }
        "layout" => {
            let name = require_single_ident(values, "layout")?;
            styles.layout = Some(match name {
                "vertical" => LayoutDirection::Vertical,
                "horizontal" => LayoutDirection::Horizontal,
                "grid" => LayoutDirection::Grid,
                other => {
                    return Err(invalid(
                        "layout",
                        format!("expected vertical|horizontal|grid, got: {other}"),
                    ));
                }
            });
        }
        "dock" => {
            let name = require_single_ident(values, "dock")?;
            styles.dock = Some(match name {
                "top" => Dock::Top,
                "right" => Dock::Right,
                "bottom" => Dock::Bottom,
                "left" => Dock::Left,
                other => {
                    return Err(invalid(
                        "dock",
                        format!("expected top|right|bottom|left, got: {other}"),
                    ));
                }
            });
        }
        "position" => {
            let name = require_single_ident(values, "position")?;
            styles.position = Some(match name {
                "static" => Position::Static,
                "relative" => Position::Relative,
                "absolute" => Position::Absolute,
                other => {
                    return Err(invalid(
                        "position",
                        format!("expected static|relative|absolute, got: {other}"),
                    ));
                }
            });
        }
        "overflow" => {
            let name = require_single_ident(values, "overflow")?;
            let overflow = parse_overflow(name, "overflow")?;
            styles.overflow_x = Some(overflow);
            styles.overflow_y = Some(overflow);
        }
        "overflow-x" => {
            let name = require_single_ident(values, "overflow-x")?;
            styles.overflow_x = Some(parse_overflow(name, "overflow-x")?);
        }
        "overflow-y" => {
            let name = require_single_ident(values, "overflow-y")?;
            styles.overflow_y = Some(parse_overflow(name, "overflow-y")?);
        }

        // Sizing
        "width" => styles.width = Some(parse_scalar(require_single(values, "width")?)?),
        "height" => styles.height = Some(parse_scalar(require_single(values, "height")?)?),
        "min-width" => {
            styles.min_width = Some(parse_scalar(require_single(values, "min-width")?)?)
        }
        "min-height" => {
            styles.min_height = Some(parse_scalar(require_single(values, "min-height")?)?)
        }
        "max-width" => {
            styles.max_width = Some(parse_scalar(require_single(values, "max-width")?)?)
        }
        "max-height" => {
            styles.max_height = Some(parse_scalar(require_single(values, "max-height")?)?)
        }

        // Spacing
        "margin" => styles.margin = Some(parse_scalar_box(values)?),
        "padding" => styles.padding = Some(parse_scalar_box(values)?),

        // Offsets (absolute positioning)
        "offset-x" => styles.offset_x = Some(parse_scalar(require_single(values, "offset-x")?)?),
        "offset-y" => styles.offset_y = Some(parse_scalar(require_single(values, "offset-y")?)?),

        // Grid
        "grid-rows" => styles.grid_rows = Some(parse_tracks(values, "grid-rows")?),
        "grid-columns" => styles.grid_columns = Some(parse_tracks(values, "grid-columns")?),
        "row-span" => styles.row_span = Some(require_span(values, "row-span")?),
        "column-span" => styles.column_span = Some(require_span(values, "column-span")?),

        // Colors
        "color" => styles.color = Some(require_color_value(values, "color")?),
        "background" => styles.background = Some(require_color_value(values, "background")?),

        // Text
        "text-align" => {
            let name = require_single_ident(values, "text-align")?;
            styles.text_align = Some(match name {
                "left" => TextAlign::Left,
                "center" => TextAlign::Center,
                "right" => TextAlign::Right,
                other => {
                    return Err(invalid(
                        "text-align",
                        format!("expected left|center|right, got: {other}"),
                    ));
                }
            });
        }
        "text-style" => styles.text_style = Some(parse_text_style(values)?),

        // Border
        "border" => styles.border = Some(parse_border(values)?),

        // Unknown
        other => return Err(PropertyError::UnknownProperty(other.to_string())),
    }

    Ok(())
}

// ===========================================================================
// Tests
// ===========================================================================
