use crate::value::Value;

/// Encode a [`Value`] into its canonical UTF-8 byte form.
///
/// Rules: object keys in lexicographic order, arrays in source order,
/// integers as plain decimal, floats via Rust's default `Display` (the
/// shortest decimal that round-trips to the same `f64`), no insignificant
/// whitespace. Two values that are `==` always encode to the same bytes,
/// and the encoding is the sole input to [`crate::hash::hash`].
pub fn canonical_encode(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    write_value(value, &mut out);
    out
}

fn write_value(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Int(n) => out.extend_from_slice(n.to_string().as_bytes()),
        Value::Float(f) => write_float(*f, out),
        Value::String(s) => write_string(s, out),
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(item, out);
            }
            out.push(b']');
        }
        Value::Object(map) => {
            out.push(b'{');
            // BTreeMap iteration is already lexicographic by key.
            for (i, (key, val)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_string(key, out);
                out.push(b':');
                write_value(val, out);
            }
            out.push(b'}');
        }
    }
}

fn write_float(f: f64, out: &mut Vec<u8>) {
    if f.is_nan() || f.is_infinite() {
        // Not JSON-representable; canonicalize to null rather than emit
        // bytes a decoder couldn't parse back.
        out.extend_from_slice(b"null");
        return;
    }
    let mut repr = f.to_string();
    if !repr.contains('.') && !repr.contains('e') && !repr.contains('E') {
        repr.push_str(".0");
    }
    out.extend_from_slice(repr.as_bytes());
}

fn write_string(s: &str, out: &mut Vec<u8>) {
    out.push(b'"');
    for c in s.chars() {
        match c {
            '"' => out.extend_from_slice(b"\\\""),
            '\\' => out.extend_from_slice(b"\\\\"),
            '\n' => out.extend_from_slice(b"\\n"),
            '\r' => out.extend_from_slice(b"\\r"),
            '\t' => out.extend_from_slice(b"\\t"),
            c if (c as u32) < 0x20 => {
                out.extend_from_slice(format!("\\u{:04x}", c as u32).as_bytes());
            }
            c => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    out.push(b'"');
}
