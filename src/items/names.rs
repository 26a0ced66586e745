//! Names stored inline in item payloads
//!
//! Each byte is offset by +128 and four bytes are packed big-endian into
//! one i32. The lowest byte of the final int is always zero so the decoded
//! string is NUL terminated.

/// Pack `name` into `ints` integers, truncating to `ints * 4 - 1` bytes
pub fn pack_name(name: &str, ints: usize) -> Vec<i32> {
    let capacity = ints * 4;
    let mut bytes = vec![0u8; capacity];
    for (slot, &byte) in bytes
        .iter_mut()
        .zip(name.as_bytes().iter().take(capacity.saturating_sub(1)))
    {
        *slot = byte;
    }

    let mut packed: Vec<i32> = bytes
        .chunks_exact(4)
        .map(|chunk| {
            let shifted = [
                chunk[0].wrapping_add(128),
                chunk[1].wrapping_add(128),
                chunk[2].wrapping_add(128),
                chunk[3].wrapping_add(128),
            ];
            i32::from_be_bytes(shifted)
        })
        .collect();

    if let Some(last) = packed.last_mut() {
        *last &= !0xff;
    }
    packed
}

/// Inverse of [`pack_name`]; an empty name decodes to `None`
pub fn unpack_name(ints: &[i32]) -> Option<String> {
    let bytes: Vec<u8> = ints
        .iter()
        .flat_map(|value| value.to_be_bytes())
        .map(|byte| byte.wrapping_sub(128))
        .take_while(|&byte| byte != 0)
        .collect();

    if bytes.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(&bytes).into_owned())
    }
}
