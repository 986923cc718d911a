//! Loading example view trees from the two input shapes of spec §6.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use viewsynth_core::{Rational, ViewSpec, ViewSynthError, ViewTree};

/// Which of the two JSON view shapes the input document uses.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputFormat {
    /// `{ "rect": [left, top, right, bottom] }`
    #[default]
    Default,
    /// `{ "left": .., "top": .., "width": .., "height": .. }`
    Bench,
}

/// How a JSON coordinate value is interpreted before entering the
/// exact-rational data model. All downstream math is exact regardless of
/// domain; `R` and `N` coerce through a fixed-precision rational
/// approximation at the ingestion boundary (see [`approximate`]).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumericType {
    /// Preserve whatever the JSON parser produced: integers parse exactly,
    /// everything else goes through [`approximate`].
    #[default]
    N,
    /// Real-valued: always coerced through [`approximate`], even when the
    /// JSON literal happens to be an integer value.
    R,
    /// Exact rationals: a JSON number parses exactly (integers exactly, a
    /// `"numerator/denominator"` string exactly), a JSON float is rejected.
    Q,
    /// Integers only; any fractional literal is an error.
    Z,
}

/// Fixed-precision scale used to coerce an inexact (`f64`) coordinate into
/// an exact [`Rational`]. Matches the scale `viewsynth_learn` uses when
/// snapping a fitted parameter back to exact rational space, so a value
/// that round-trips through both paths doesn't pick up avoidable drift.
const APPROXIMATION_SCALE: i64 = 1_000_000;

/// Coerce an `f64` into the nearest rational with denominator
/// [`APPROXIMATION_SCALE`].
pub fn approximate(x: f64) -> Rational {
    Rational::new((x * APPROXIMATION_SCALE as f64).round() as i64, APPROXIMATION_SCALE)
}

fn invalid(msg: impl Into<String>) -> ViewSynthError {
    ViewSynthError::invalid_input(msg.into())
}

fn parse_fraction_literal(s: &str) -> Result<Rational, ViewSynthError> {
    match s.split_once('/') {
        Some((n, d)) => {
            let n: i64 = n
                .trim()
                .parse()
                .map_err(|_| invalid(format!("malformed rational literal `{s}`")))?;
            let d: i64 = d
                .trim()
                .parse()
                .map_err(|_| invalid(format!("malformed rational literal `{s}`")))?;
            if d == 0 {
                return Err(invalid(format!("zero denominator in rational literal `{s}`")));
            }
            Ok(Rational::new(n, d))
        }
        None => s
            .trim()
            .parse::<i64>()
            .map(Rational::from_integer)
            .map_err(|_| invalid(format!("malformed numeric literal `{s}`"))),
    }
}

/// Parse one JSON coordinate value under the given numeric domain.
pub fn parse_number(value: &Value, domain: NumericType) -> Result<Rational, ViewSynthError> {
    match domain {
        NumericType::Z => value
            .as_i64()
            .map(Rational::from_integer)
            .ok_or_else(|| invalid("expected an integer coordinate under the Z numeric domain")),
        NumericType::Q => {
            if let Some(s) = value.as_str() {
                parse_fraction_literal(s)
            } else if let Some(i) = value.as_i64() {
                Ok(Rational::from_integer(i))
            } else {
                Err(invalid(
                    "expected an integer or `\"n/d\"` literal under the Q numeric domain",
                ))
            }
        }
        NumericType::R => value
            .as_f64()
            .map(approximate)
            .ok_or_else(|| invalid("expected a numeric coordinate under the R numeric domain")),
        NumericType::N => {
            if let Some(i) = value.as_i64() {
                Ok(Rational::from_integer(i))
            } else if let Some(f) = value.as_f64() {
                Ok(approximate(f))
            } else {
                Err(invalid("unsupported coordinate value"))
            }
        }
    }
}

/// The raw, format-agnostic JSON shape of one view node.
#[derive(Deserialize)]
struct RawView {
    name: String,
    rect: Option<[Value; 4]>,
    left: Option<Value>,
    top: Option<Value>,
    right: Option<Value>,
    bottom: Option<Value>,
    width: Option<Value>,
    height: Option<Value>,
    #[serde(default)]
    children: Vec<RawView>,
}

fn build_spec(raw: RawView, format: InputFormat, domain: NumericType) -> Result<ViewSpec, ViewSynthError> {
    let rect = match format {
        InputFormat::Default => {
            let [l, t, r, b] = raw
                .rect
                .ok_or_else(|| invalid(format!("view `{}` is missing `rect`", raw.name)))?;
            let left = parse_number(&l, domain)?;
            let top = parse_number(&t, domain)?;
            let right = parse_number(&r, domain)?;
            let bottom = parse_number(&b, domain)?;
            viewsynth_core::Rect::new(left, top, right, bottom)
                .ok_or_else(|| invalid(format!("view `{}` has an inverted rect", raw.name)))?
        }
        InputFormat::Bench => {
            let left = raw
                .left
                .as_ref()
                .ok_or_else(|| invalid(format!("view `{}` is missing `left`", raw.name)))
                .and_then(|v| parse_number(v, domain))?;
            let top = raw
                .top
                .as_ref()
                .ok_or_else(|| invalid(format!("view `{}` is missing `top`", raw.name)))
                .and_then(|v| parse_number(v, domain))?;
            let width = raw
                .width
                .as_ref()
                .ok_or_else(|| invalid(format!("view `{}` is missing `width`", raw.name)))
                .and_then(|v| parse_number(v, domain))?;
            let height = raw
                .height
                .as_ref()
                .ok_or_else(|| invalid(format!("view `{}` is missing `height`", raw.name)))
                .and_then(|v| parse_number(v, domain))?;
            viewsynth_core::Rect::from_xywh(left, top, width, height)
                .ok_or_else(|| invalid(format!("view `{}` has a negative dimension", raw.name)))?
        }
    };

    let children = raw
        .children
        .into_iter()
        .map(|c| build_spec(c, format, domain))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ViewSpec {
        name: raw.name,
        rect,
        children,
    })
}

/// Parse a JSON array of example view trees.
pub fn load_examples(json: &str, format: InputFormat, domain: NumericType) -> Result<Vec<ViewTree>, ViewSynthError> {
    let raw: Vec<RawView> =
        serde_json::from_str(json).map_err(|e| invalid(format!("malformed input JSON: {e}")))?;
    raw.into_iter()
        .map(|r| build_spec(r, format, domain).and_then(ViewTree::build))
        .collect()
}
