//! Session id generation

use rand::RngCore;
use session_shared::constants::SESSION_ID_BYTES;

/// 8 bytes from the thread-local CSPRNG, lowercase hex (16 characters).
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
