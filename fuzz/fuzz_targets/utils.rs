use std::str;

pub const MAX_INPUT_SIZE: usize = 256 * 1024;

/// Returns a UTF-8 view of `data` truncated to `MAX_INPUT_SIZE`.
///
/// Inputs are capped to keep pathological cases from ballooning. When the cap
/// lands inside a multibyte codepoint the trailing fragment is dropped;
/// inputs with genuinely invalid bytes are skipped.
#[inline]
pub fn truncate_utf8(data: &[u8]) -> Option<&str> {
    let cap = data.len().min(MAX_INPUT_SIZE);
    match str::from_utf8(&data[..cap]) {
        Ok(text) => Some(text),
        // error_len() is None only for a codepoint cut short at the end.
        Err(err) if err.error_len().is_none() => {
            str::from_utf8(&data[..err.valid_up_to()]).ok()
        }
        Err(_) => None,
    }
}
