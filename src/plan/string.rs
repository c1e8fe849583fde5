//! String procedures: `RawString` (verbatim) and `EscapedString` (processes
//! backslash escapes).

use std::any::TypeId;
use std::collections::HashSet;

use crate::error::DecodeError;
use crate::op::DecodeOp;
use crate::plan::Procedure;
use crate::report::PlanReport;
use crate::scan::expect_quote_or_container_end;

/// Scans a quoted run starting anywhere before its opening `"` and returns
/// `(inner_start, inner_end, cursor_past_closing_quote)`, where
/// `inner_start..inner_end` are the raw bytes between the quotes.
///
/// Raises [`DecodeError::UnexpectedListEnd`]/[`DecodeError::UnexpectedMapEnd`]
/// if `]`/`}` is found before the opening quote — this is the literal
/// mechanism list and map procedures rely on to detect the end of their
/// container (spec.md §4.4/§4.5): they call this through [`RawString`] and
/// treat those two errors as "the container is done" instead of
/// propagating them.
pub fn scan_key(input: &[u8], cursor: usize) -> Result<(usize, usize, usize), DecodeError> {
    let open = expect_quote_or_container_end(input, cursor)?;
    let inner_start = open + 1;
    let inner_end = crate::scan::find_quote(input, inner_start)
        .ok_or(DecodeError::NoQuote(inner_start))?;
    Ok((inner_start, inner_end, inner_end + 1))
}

/// Decodes a quoted string by copying the bytes between the quotes
/// verbatim — no escape processing. Used both as the `string` leaf
/// procedure and, internally, for key-scanning in map/object procedures
/// (spec.md's raw-string procedure is dual-purposed the same way).
#[derive(Debug, Default)]
pub struct RawString;

impl Procedure<String> for RawString {
    fn decode(&self, op: &DecodeOp, cursor: usize, dest: &mut String) -> Result<usize, DecodeError> {
        let (start, end, next) = scan_key(op.input, cursor)?;
        dest.clear();
        dest.push_str(
            std::str::from_utf8(&op.input[start..end]).unwrap_or_default(),
        );
        Ok(next)
    }

    fn skip(&self, op: &DecodeOp, cursor: usize) -> Result<usize, DecodeError> {
        let (_, _, next) = scan_key(op.input, cursor)?;
        Ok(next)
    }

    fn report_plan(&self, report: &mut PlanReport, depth: usize, _seen: &mut HashSet<TypeId>) {
        report.push(depth, "raw string");
    }
}

/// Decodes a quoted string, translating `\n \t \r \" \\ \/ \uXXXX`
/// (including UTF-16 surrogate pairs) into their real characters.
///
/// spec.md's escaped-string procedure is, in the source engine, byte-for-
/// byte identical to raw-string (escape translation was never implemented
/// there). This crate actually performs it — Design Notes §9(b).
#[derive(Debug, Default)]
pub struct EscapedString;

impl Procedure<String> for EscapedString {
    fn decode(&self, op: &DecodeOp, cursor: usize, dest: &mut String) -> Result<usize, DecodeError> {
        let open = expect_quote_or_container_end(op.input, cursor)?;
        let mut i = open + 1;
        dest.clear();
        loop {
            match op.byte_at(i) {
                None => return Err(DecodeError::NoQuote(i)),
                Some(b'"') => return Ok(i + 1),
                Some(b'\\') => {
                    let (ch, consumed) = decode_escape(op.input, i)?;
                    dest.push(ch);
                    i += consumed;
                }
                Some(&b) => {
                    // Re-slice the next UTF-8 scalar rather than pushing raw
                    // bytes one at a time.
                    let rest = &op.input[i..];
                    let width = utf8_width(b);
                    let s = std::str::from_utf8(&rest[..width.min(rest.len())])
                        .unwrap_or_default();
                    dest.push_str(s);
                    i += width.max(1);
                }
            }
        }
    }

    fn skip(&self, op: &DecodeOp, cursor: usize) -> Result<usize, DecodeError> {
        let open = expect_quote_or_container_end(op.input, cursor)?;
        let mut i = open + 1;
        loop {
            match op.byte_at(i) {
                None => return Err(DecodeError::NoQuote(i)),
                Some(b'"') => return Ok(i + 1),
                Some(b'\\') => {
                    let (_, consumed) = decode_escape(op.input, i)?;
                    i += consumed;
                }
                Some(_) => i += 1,
            }
        }
    }

    fn report_plan(&self, report: &mut PlanReport, depth: usize, _seen: &mut HashSet<TypeId>) {
        report.push(depth, "escaped string");
    }
}

fn utf8_width(first_byte: u8) -> usize {
    if first_byte & 0x80 == 0 {
        1
    } else if first_byte & 0xE0 == 0xC0 {
        2
    } else if first_byte & 0xF0 == 0xE0 {
        3
    } else {
        4
    }
}

/// Decodes one backslash escape starting at `i` (the position of the
/// backslash). Returns the decoded character and the number of input bytes
/// consumed, including the leading backslash.
fn decode_escape(input: &[u8], i: usize) -> Result<(char, usize), DecodeError> {
    match input.get(i + 1) {
        Some(b'n') => Ok(('\n', 2)),
        Some(b't') => Ok(('\t', 2)),
        Some(b'r') => Ok(('\r', 2)),
        Some(b'"') => Ok(('"', 2)),
        Some(b'\\') => Ok(('\\', 2)),
        Some(b'/') => Ok(('/', 2)),
        Some(b'b') => Ok(('\u{8}', 2)),
        Some(b'f') => Ok(('\u{c}', 2)),
        Some(b'u') => {
            let high = read_hex4(input, i + 2)?;
            if (0xD800..=0xDBFF).contains(&high) {
                if input.get(i + 6) != Some(&b'\\') || input.get(i + 7) != Some(&b'u') {
                    return Err(DecodeError::MalformedNumber(i));
                }
                let low = read_hex4(input, i + 8)?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(DecodeError::MalformedNumber(i));
                }
                let combined =
                    0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                let ch = char::from_u32(combined).ok_or(DecodeError::MalformedNumber(i))?;
                Ok((ch, 12))
            } else {
                let ch = char::from_u32(high).ok_or(DecodeError::MalformedNumber(i))?;
                Ok((ch, 6))
            }
        }
        Some(_) => Err(DecodeError::MalformedNumber(i)),
        None => Err(DecodeError::NoQuote(i)),
    }
}

fn read_hex4(input: &[u8], at: usize) -> Result<u32, DecodeError> {
    let bytes = input.get(at..at + 4).ok_or(DecodeError::NoQuote(at))?;
    let s = std::str::from_utf8(bytes).map_err(|_| DecodeError::MalformedNumber(at))?;
    u32::from_str_radix(s, 16).map_err(|_| DecodeError::MalformedNumber(at))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_raw(input: &[u8]) -> (String, usize) {
        let mut dest = String::new();
        let op = DecodeOp::alloc(input);
        let next = RawString.decode(&op, 0, &mut dest).unwrap();
        (dest, next)
    }

    fn decode_escaped(input: &[u8]) -> (String, usize) {
        let mut dest = String::new();
        let op = DecodeOp::alloc(input);
        let next = EscapedString.decode(&op, 0, &mut dest).unwrap();
        (dest, next)
    }

    #[test]
    fn raw_string_copies_verbatim() {
        let (s, next) = decode_raw(br#""hello" rest"#);
        assert_eq!(s, "hello");
        assert_eq!(next, 7);
    }

    #[test]
    fn raw_string_does_not_translate_escapes() {
        let (s, _) = decode_raw(br#""a\nb""#);
        assert_eq!(s, "a\\nb");
    }

    #[test]
    fn raw_string_detects_list_end() {
        let op = DecodeOp::alloc(b" ]");
        let mut dest = String::new();
        let err = RawString.decode(&op, 0, &mut dest).unwrap_err();
        assert_eq!(err, DecodeError::UnexpectedListEnd(1));
    }

    #[test]
    fn escaped_string_translates_basic_escapes() {
        let (s, _) = decode_escaped(br#""a\nb\tc\"d""#);
        assert_eq!(s, "a\nb\tc\"d");
    }

    #[test]
    fn escaped_string_translates_unicode_escape() {
        let (s, _) = decode_escaped(b"\"\\u0041\"");
        assert_eq!(s, "A");
    }

    #[test]
    fn escaped_string_translates_surrogate_pair() {
        // U+1F600 GRINNING FACE, encoded as a UTF-16 surrogate pair.
        let (s, _) = decode_escaped(b"\"\\uD83D\\uDE00\"");
        assert_eq!(s, "\u{1F600}");
    }

    #[test]
    fn skip_consumes_same_bytes_as_decode() {
        let input = br#""hello world" trailer"#;
        let op_alloc = DecodeOp::alloc(input);
        let mut dest = String::new();
        let decoded_cursor = RawString.decode(&op_alloc, 0, &mut dest).unwrap();

        let op_skip = DecodeOp::skip(input);
        let skipped_cursor = RawString.skip(&op_skip, 0).unwrap();

        assert_eq!(decoded_cursor, skipped_cursor);
    }
}
