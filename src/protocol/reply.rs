use crate::error::{ModemError, Result};

/// Extract the integer in field `field_index` after `token`.
///
/// For `"+CREG: 0,1"`, token `"+CREG: "`, divider `','` and index 1 this
/// yields 1. The field runs up to the next divider or the end of the reply
/// and is read like C's `atoi`: leading blanks skipped, digits consumed
/// until the first non-digit, no digits at all reading as 0.
pub fn parse_reply(reply: &str, token: &str, divider: char, field_index: usize) -> Result<u16> {
    let mut rest = reply_text(reply, token)?;

    for _ in 0..field_index {
        let at = rest.find(divider).ok_or(ModemError::Reply)?;
        rest = &rest[at + divider.len_utf8()..];
    }

    let field = rest.split(divider).next().unwrap_or_default();
    Ok(leading_integer(field))
}

/// Text following the first occurrence of `token`.
pub fn reply_text<'a>(reply: &'a str, token: &str) -> Result<&'a str> {
    reply
        .find(token)
        .map(|start| &reply[start + token.len()..])
        .ok_or(ModemError::Reply)
}

fn leading_integer(field: &str) -> u16 {
    field
        .trim_start()
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u16, |acc, digit| {
            acc.saturating_mul(10).saturating_add(u16::from(digit - b'0'))
        })
}
