use thiserror::Error;

use super::gsm_data::BtsRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CipherError {
    #[error("cipher {0} not supported")]
    NotSupported(u8),
}

/// Checks an RSL encryption algorithm identifier against the BTS capabilities.
/// 1 is "no encryption", 2 is A5/1 and so on up to A5/7.
pub fn bts_supports_cipher(role: &BtsRole, rsl_cipher: u8) -> Result<bool, CipherError> {
    if !(1..=8).contains(&rsl_cipher) {
        return Err(CipherError::NotSupported(rsl_cipher));
    }
    if rsl_cipher == 1 {
        return Ok(true);
    }
    Ok(role.ciphers & (1 << (rsl_cipher - 2)) != 0)
}
