//! Defensive document readers
//!
//! Attribute lookups over the JSON state document. Every reader takes a
//! hard-coded default: a missing or malformed attribute logs a warning and
//! returns the default, it never fails. This is what makes the whole load
//! path tolerant of partial documents.

use serde_json::Value;

/// A named child section of the document, if present.
pub fn section<'a>(root: &'a Value, name: &str) -> Option<&'a Value> {
    root.get(name).filter(|v| v.is_object())
}

/// Read a boolean attribute, defaulting on absence or bad syntax.
pub fn bool_attr(e: &Value, attribute: &str, default: bool) -> bool {
    match e.get(attribute) {
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            log::warn!(
                "bad boolean syntax for attribute \"{attribute}\" ({other}); setting value to {default}"
            );
            default
        }
        None => {
            log::warn!("\"{attribute}\" attribute missing; setting value to {default}");
            default
        }
    }
}

/// Read a float attribute, defaulting on absence, bad syntax or NaN.
pub fn f32_attr(e: &Value, attribute: &str, default: f32) -> f32 {
    match e.get(attribute) {
        Some(value) => match value.as_f64() {
            Some(v) if !v.is_nan() => v as f32,
            Some(_) => {
                log::warn!("attribute \"{attribute}\" is not a number; setting value to {default}");
                default
            }
            None => {
                log::warn!(
                    "bad float syntax for attribute \"{attribute}\" ({value}); setting value to {default}"
                );
                default
            }
        },
        None => {
            log::warn!("\"{attribute}\" attribute missing; setting value to {default}");
            default
        }
    }
}

/// Read an integer attribute, defaulting on absence or bad syntax.
pub fn i64_attr(e: &Value, attribute: &str, default: i64) -> i64 {
    match e.get(attribute) {
        Some(value) => match value.as_i64() {
            Some(v) => v,
            None => {
                log::warn!(
                    "bad integer syntax for attribute \"{attribute}\" ({value}); setting value to {default}"
                );
                default
            }
        },
        None => {
            log::warn!("\"{attribute}\" attribute missing; setting value to {default}");
            default
        }
    }
}

/// Read a string attribute, defaulting on absence or bad syntax.
pub fn str_attr(e: &Value, attribute: &str, default: &str) -> String {
    match e.get(attribute) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            log::warn!(
                "bad string syntax for attribute \"{attribute}\" ({other}); setting value to \"{default}\""
            );
            default.to_string()
        }
        None => {
            log::warn!("\"{attribute}\" attribute missing; setting value to \"{default}\"");
            default.to_string()
        }
    }
}

/// Read a color element (`{"red": r, "green": g, "blue": b}`), defaulting
/// each channel independently.
pub fn color_attr(e: &Value, attribute: &str, default: [u8; 3]) -> [u8; 3] {
    match section(e, attribute) {
        Some(color) => [
            i64_attr(color, "red", default[0] as i64).clamp(0, 255) as u8,
            i64_attr(color, "green", default[1] as i64).clamp(0, 255) as u8,
            i64_attr(color, "blue", default[2] as i64).clamp(0, 255) as u8,
        ],
        None => {
            log::warn!("\"{attribute}\" color element missing; keeping default");
            default
        }
    }
}

/// Read a vector element (`{"x": .., "y": .., "z": ..}`), defaulting each
/// component independently.
pub fn vec3_attr(e: &Value, attribute: &str, default: [f32; 3]) -> [f32; 3] {
    match section(e, attribute) {
        Some(v) => [
            f32_attr(v, "x", default[0]),
            f32_attr(v, "y", default[1]),
            f32_attr(v, "z", default[2]),
        ],
        None => {
            log::warn!("\"{attribute}\" vector element missing; keeping default");
            default
        }
    }
}

/// Read a quaternion element (`{"q0": w, "q1": x, "q2": y, "q3": z}`),
/// defaulting each component independently.
pub fn quat_attr(e: &Value, attribute: &str, default: [f32; 4]) -> [f32; 4] {
    match section(e, attribute) {
        Some(q) => [
            f32_attr(q, "q0", default[0]),
            f32_attr(q, "q1", default[1]),
            f32_attr(q, "q2", default[2]),
            f32_attr(q, "q3", default[3]),
        ],
        None => {
            log::warn!("\"{attribute}\" quaternion element missing; keeping default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bool_attr() {
        let e = json!({"flag": true, "bad": "yes"});
        assert!(bool_attr(&e, "flag", false));
        assert!(!bool_attr(&e, "bad", false));
        assert!(bool_attr(&e, "missing", true));
    }

    #[test]
    fn test_f32_attr() {
        let e = json!({"value": 2.5, "bad": "oops"});
        assert_eq!(f32_attr(&e, "value", 0.0), 2.5);
        assert_eq!(f32_attr(&e, "bad", 1.25), 1.25);
        assert_eq!(f32_attr(&e, "missing", -3.0), -3.0);
    }

    #[test]
    fn test_i64_attr() {
        let e = json!({"value": 42, "frac": 1.5});
        assert_eq!(i64_attr(&e, "value", 0), 42);
        assert_eq!(i64_attr(&e, "frac", 7), 7);
        assert_eq!(i64_attr(&e, "missing", -1), -1);
    }

    #[test]
    fn test_color_attr() {
        let e = json!({"fg": {"red": 10, "green": 20, "blue": 30}});
        assert_eq!(color_attr(&e, "fg", [0, 0, 0]), [10, 20, 30]);
        assert_eq!(color_attr(&e, "missing", [1, 2, 3]), [1, 2, 3]);

        let partial = json!({"fg": {"red": 300}});
        assert_eq!(color_attr(&partial, "fg", [1, 2, 3]), [255, 2, 3]);
    }

    #[test]
    fn test_vec3_and_quat_attr() {
        let e = json!({
            "position": {"x": 1.0, "y": 2.0, "z": 3.0},
            "orientation": {"q0": 1.0, "q1": 0.0, "q2": 0.0, "q3": 0.0},
        });
        assert_eq!(vec3_attr(&e, "position", [0.0; 3]), [1.0, 2.0, 3.0]);
        assert_eq!(
            quat_attr(&e, "orientation", [1.0, 0.0, 0.0, 0.0]),
            [1.0, 0.0, 0.0, 0.0]
        );
        assert_eq!(vec3_attr(&e, "missing", [9.0, 8.0, 7.0]), [9.0, 8.0, 7.0]);
    }
}
