//! Rendering of Python protocol-API source lines.
//!
//! Every command creator returns its Python next to its commands; these helpers
//! keep the formatting of values consistent across creators.

use crate::command::{WellLocation, WellOrigin};

/// Name of the protocol context variable inside the generated `run()` body.
pub const PROTOCOL_CONTEXT_NAME: &str = "protocol";

/// Decimal places kept when rendering numbers.
const NUMBER_PRECISION: f64 = 1e6;

/// Renders a number the way Python source would spell it: integers without a
/// fractional part, others rounded to six decimal places.
#[must_use]
pub fn format_number(value: f64) -> String {
    let rounded = (value * NUMBER_PRECISION).round() / NUMBER_PRECISION;
    if rounded == 0.0 {
        // Avoid rendering negative zero as "-0".
        return "0".to_string();
    }
    format!("{rounded}")
}

/// Renders a double-quoted Python string literal.
#[must_use]
pub fn format_str(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Renders a list of integers, e.g. `[450, 562]`.
#[must_use]
pub fn format_int_list(values: &[u32]) -> String {
    let items: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}

/// Renders `receiver.method(arg, ...)`.
#[must_use]
pub fn call(receiver: &str, method: &str, args: &[String]) -> String {
    format!("{receiver}.{method}({})", args.join(", "))
}

/// Renders a keyword argument `name=value`.
#[must_use]
pub fn kwarg(name: &str, value: impl AsRef<str>) -> String {
    format!("{name}={}", value.as_ref())
}

/// Renders a well reference, e.g. `well_plate_1["A1"]`.
#[must_use]
pub fn well(labware_python_name: &str, well_name: &str) -> String {
    format!("{labware_python_name}[{}]", format_str(well_name))
}

/// Renders a position inside a well, e.g. `well_plate_1["A1"].bottom(z=1)`.
#[must_use]
pub fn well_location(labware_python_name: &str, well_name: &str, location: &WellLocation) -> String {
    let method = match location.origin {
        WellOrigin::Bottom => "bottom",
        WellOrigin::Top => "top",
    };
    let z = location.offset.z;
    let args = if z == 0.0 {
        Vec::new()
    } else {
        vec![kwarg("z", format_number(z))]
    };
    call(&well(labware_python_name, well_name), method, &args)
}

/// Joins lines into one Python snippet. `None` when there are no lines.
#[must_use]
pub fn join_lines<I>(lines: I) -> Option<String>
where
    I: IntoIterator<Item = String>,
{
    let lines: Vec<String> = lines.into_iter().filter(|l| !l.is_empty()).collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
