//! Regenerate payloads carry the original prompt so a button press can be
//! replayed without looking anything up server side.

pub const SEPARATOR: char = '|';
pub const REGEN: &str = "regen";

/// Telegram rejects callback data longer than this many bytes.
pub const MAX_PAYLOAD_BYTES: usize = 64;

/// `kind|prompt`, with the prompt cut on a char boundary so the payload
/// stays within [`MAX_PAYLOAD_BYTES`].
pub fn encode(kind: &str, prompt: &str) -> String {
    let budget = MAX_PAYLOAD_BYTES.saturating_sub(kind.len() + SEPARATOR.len_utf8());
    let mut end = prompt.len().min(budget);
    while !prompt.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{}{}", kind, SEPARATOR, &prompt[..end])
}

/// Splits on the first separator only. No separator means an empty prompt.
pub fn decode(payload: &str) -> (String, String) {
    match payload.split_once(SEPARATOR) {
        Some((kind, prompt)) => (kind.to_string(), prompt.to_string()),
        None => (payload.to_string(), String::new()),
    }
}

pub fn is_regen(payload: &str) -> bool {
    decode(payload).0 == REGEN
}
