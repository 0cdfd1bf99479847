//! Canonical text encoding for the value domain.
//!
//! The encoding is deterministic and injective over the supported domain:
//! object keys are emitted in sorted order (free, since `ValueObject` keeps
//! its entries sorted), strings are quoted and escaped, integers render
//! bare, and floats always carry a `.` or exponent marker so `1` and `1.0`
//! can never collide. Non-finite floats have no canonical form; encoding
//! reports them by returning `false` and the caller discards the buffer.

use alloc::string::String;
use core::fmt::Write;
use liveq_core::{Value, ValueObject};

/// Appends the canonical form of `value` to `out`.
///
/// Returns false if the value contains anything outside the encodable
/// domain, in which case `out` is left partially written and must be
/// discarded by the caller.
pub(crate) fn write_value(out: &mut String, value: &Value) -> bool {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Int64(i) => {
            let _ = write!(out, "{}", i);
        }
        Value::Float64(f) => {
            if !f.is_finite() {
                return false;
            }
            // Debug formatting of a finite f64 is the shortest round-trip
            // form and always contains a '.' or an exponent, so it is
            // disjoint from the bare-integer rendering of Int64.
            let _ = write!(out, "{:?}", f);
        }
        Value::String(s) => write_escaped(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                if !write_value(out, item) {
                    return false;
                }
            }
            out.push(']');
        }
        Value::Object(obj) => {
            if !write_object(out, obj) {
                return false;
            }
        }
    }
    true
}

/// Appends the canonical form of an object, keys in sorted order.
pub(crate) fn write_object(out: &mut String, obj: &ValueObject) -> bool {
    out.push('{');
    for (i, (key, value)) in obj.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_escaped(out, key);
        out.push(':');
        if !write_value(out, value) {
            return false;
        }
    }
    out.push('}');
    true
}

/// Appends a quoted, escaped string.
fn write_escaped(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
