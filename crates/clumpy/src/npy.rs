//! Minimal reader for the NumPy `.npy` arrays written by `clumpy`.
//!
//! Supports format versions 1–3, C order, and `f4`/`f8` element types in
//! either byte order. That covers everything the generator emits.

use island_zoom_core::{EngineError, Field};

const MAGIC: &[u8] = b"\x93NUMPY";

/// A decoded array, widened to `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct NpyArray {
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
}

impl NpyArray {
    /// Interprets a `(rows, cols)` array as a field with row 0 at the top.
    pub fn into_field(self) -> Result<Field, EngineError> {
        match self.shape.as_slice() {
            &[rows, cols] => Field::from_data(cols, rows, self.data),
            other => Err(EngineError::NpyFormat(format!(
                "expected a 2-D array, got shape {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dtype {
    F32Le,
    F32Be,
    F64Le,
    F64Be,
}

impl Dtype {
    fn parse(descr: &str) -> Result<Self, EngineError> {
        match descr {
            "<f4" => Ok(Dtype::F32Le),
            ">f4" => Ok(Dtype::F32Be),
            "<f8" => Ok(Dtype::F64Le),
            ">f8" => Ok(Dtype::F64Be),
            other => Err(EngineError::NpyFormat(format!("unsupported dtype '{other}'"))),
        }
    }

    fn size(self) -> usize {
        match self {
            Dtype::F32Le | Dtype::F32Be => 4,
            Dtype::F64Le | Dtype::F64Be => 8,
        }
    }

    fn read(self, chunk: &[u8]) -> f64 {
        match self {
            Dtype::F32Le => f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as f64,
            Dtype::F32Be => f32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as f64,
            Dtype::F64Le | Dtype::F64Be => {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(&chunk[..8]);
                if self == Dtype::F64Le {
                    f64::from_le_bytes(bytes)
                } else {
                    f64::from_be_bytes(bytes)
                }
            }
        }
    }
}

fn format_err(msg: impl Into<String>) -> EngineError {
    EngineError::NpyFormat(msg.into())
}

/// Returns the text following `'key':` in a header dict, trimmed.
fn header_value<'a>(header: &'a str, key: &str) -> Result<&'a str, EngineError> {
    let needle = format!("'{key}':");
    let start = header
        .find(&needle)
        .ok_or_else(|| format_err(format!("header is missing '{key}'")))?;
    Ok(header[start + needle.len()..].trim_start())
}

fn parse_descr(header: &str) -> Result<Dtype, EngineError> {
    let rest = header_value(header, "descr")?;
    let quote = rest
        .chars()
        .next()
        .filter(|c| *c == '\'' || *c == '"')
        .ok_or_else(|| format_err("descr is not a string"))?;
    let body = &rest[1..];
    let end = body
        .find(quote)
        .ok_or_else(|| format_err("unterminated descr"))?;
    Dtype::parse(&body[..end])
}

fn parse_fortran_order(header: &str) -> Result<bool, EngineError> {
    let rest = header_value(header, "fortran_order")?;
    if rest.starts_with("True") {
        Ok(true)
    } else if rest.starts_with("False") {
        Ok(false)
    } else {
        Err(format_err("fortran_order is not a boolean"))
    }
}

fn parse_shape(header: &str) -> Result<Vec<usize>, EngineError> {
    let rest = header_value(header, "shape")?;
    let body = rest
        .strip_prefix('(')
        .ok_or_else(|| format_err("shape is not a tuple"))?;
    let end = body
        .find(')')
        .ok_or_else(|| format_err("unterminated shape"))?;
    body[..end]
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.trim_end_matches('L')
                .parse::<usize>()
                .map_err(|e| format_err(format!("bad shape entry '{s}': {e}")))
        })
        .collect()
}

/// Decodes a complete `.npy` file.
pub fn decode(bytes: &[u8]) -> Result<NpyArray, EngineError> {
    if bytes.len() < MAGIC.len() + 2 || &bytes[..MAGIC.len()] != MAGIC {
        return Err(format_err("missing NUMPY magic"));
    }
    let major = bytes[MAGIC.len()];
    let (header_len, header_start): (usize, usize) = match major {
        1 => {
            let b = bytes.get(8..10).ok_or_else(|| format_err("truncated header length"))?;
            (u16::from_le_bytes([b[0], b[1]]) as usize, 10)
        }
        2 | 3 => {
            let b = bytes.get(8..12).ok_or_else(|| format_err("truncated header length"))?;
            (u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as usize, 12)
        }
        v => return Err(format_err(format!("unsupported format version {v}"))),
    };
    let data_start = header_start
        .checked_add(header_len)
        .ok_or_else(|| format_err("header length overflows"))?;
    let header_bytes = bytes
        .get(header_start..data_start)
        .ok_or_else(|| format_err("truncated header"))?;
    let header = std::str::from_utf8(header_bytes)
        .map_err(|e| format_err(format!("header is not text: {e}")))?;

    let dtype = parse_descr(header)?;
    if parse_fortran_order(header)? {
        return Err(format_err("fortran-ordered arrays are not supported"));
    }
    let shape = parse_shape(header)?;

    let count = shape
        .iter()
        .try_fold(1usize, |acc, &n| acc.checked_mul(n))
        .ok_or_else(|| format_err("shape overflows"))?;
    let byte_len = count
        .checked_mul(dtype.size())
        .ok_or_else(|| format_err("shape overflows"))?;
    let payload = &bytes[data_start..];
    if payload.len() < byte_len {
        return Err(format_err(format!(
            "expected {byte_len} data bytes, found {}",
            payload.len()
        )));
    }
    let data = payload[..byte_len]
        .chunks_exact(dtype.size())
        .map(|chunk| dtype.read(chunk))
        .collect();
    Ok(NpyArray { shape, data })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Encodes a little-endian `f4` array the way cnpy does (version 1.0).
    pub(crate) fn encode_f32(shape: &[usize], values: &[f32]) -> Vec<u8> {
        let dims = shape
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let shape_text = if shape.len() == 1 {
            format!("({dims},)")
        } else {
            format!("({dims})")
        };
        let mut header =
            format!("{{'descr': '<f4', 'fortran_order': False, 'shape': {shape_text}, }}");
        while (MAGIC.len() + 4 + header.len() + 1) % 16 != 0 {
            header.push(' ');
        }
        header.push('\n');
        let mut out = MAGIC.to_vec();
        out.extend_from_slice(&[1, 0]);
        out.extend_from_slice(&(header.len() as u16).to_le_bytes());
        out.extend_from_slice(header.as_bytes());
        for v in values {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out
    }

    #[test]
    fn decodes_cnpy_style_f32_grid() {
        let bytes = encode_f32(&[2, 3], &[0.0, 0.5, -0.5, 1.0, -1.0, 0.25]);
        let array = decode(&bytes).unwrap();
        assert_eq!(array.shape, vec![2, 3]);
        assert_eq!(array.data, vec![0.0, 0.5, -0.5, 1.0, -1.0, 0.25]);
    }

    #[test]
    fn into_field_uses_rows_as_height() {
        let bytes = encode_f32(&[2, 3], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let field = decode(&bytes).unwrap().into_field().unwrap();
        assert_eq!(field.width(), 3);
        assert_eq!(field.height(), 2);
        assert_eq!(field.get(0, 1), 4.0);
    }

    #[test]
    fn into_field_rejects_one_dimensional_arrays() {
        let bytes = encode_f32(&[4], &[1.0, 2.0, 3.0, 4.0]);
        let array = decode(&bytes).unwrap();
        assert_eq!(array.shape, vec![4]);
        assert!(matches!(array.into_field(), Err(EngineError::NpyFormat(_))));
    }

    #[test]
    fn decodes_version_two_f8_header() {
        let header = "{'descr': '<f8', 'fortran_order': False, 'shape': (1, 2), }\n";
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&[2, 0]);
        bytes.extend_from_slice(&(header.len() as u32).to_le_bytes());
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(&1.5f64.to_le_bytes());
        bytes.extend_from_slice(&(-2.25f64).to_le_bytes());
        let array = decode(&bytes).unwrap();
        assert_eq!(array.data, vec![1.5, -2.25]);
    }

    #[test]
    fn rejects_bad_magic() {
        assert!(matches!(
            decode(b"NOTNUMPYATALL"),
            Err(EngineError::NpyFormat(_))
        ));
    }

    #[test]
    fn rejects_truncated_payload() {
        let mut bytes = encode_f32(&[2, 2], &[1.0, 2.0, 3.0, 4.0]);
        bytes.truncate(bytes.len() - 2);
        assert!(matches!(decode(&bytes), Err(EngineError::NpyFormat(_))));
    }

    fn patch(bytes: &mut [u8], from: &[u8], to: &[u8]) {
        let at = bytes
            .windows(from.len())
            .position(|w| w == from)
            .expect("pattern present");
        bytes[at..at + to.len()].copy_from_slice(to);
    }

    #[test]
    fn rejects_unsupported_dtype() {
        let mut bytes = encode_f32(&[1, 1], &[1.0]);
        patch(&mut bytes, b"<f4", b"<i4");
        let err = decode(&bytes).unwrap_err();
        assert!(err.to_string().contains("<i4"), "unexpected error: {err}");
    }

    #[test]
    fn rejects_fortran_order() {
        let mut bytes = encode_f32(&[1, 1], &[1.0]);
        patch(&mut bytes, b"False", b"True ");
        let err = decode(&bytes).unwrap_err();
        assert!(err.to_string().contains("fortran"), "unexpected error: {err}");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn decode_never_panics_on_arbitrary_bytes(
                bytes in prop::collection::vec(any::<u8>(), 0..256),
            ) {
                let _ = decode(&bytes);
            }

            #[test]
            fn decode_never_panics_on_corrupted_headers(
                index in 0_usize..96,
                byte in any::<u8>(),
            ) {
                let mut bytes = encode_f32(&[2, 2], &[1.0, 2.0, 3.0, 4.0]);
                if index < bytes.len() {
                    bytes[index] = byte;
                }
                let _ = decode(&bytes);
            }
        }
    }
}
