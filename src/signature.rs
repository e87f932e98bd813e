use crate::error::VerificationError;
use base64::{engine::general_purpose::STANDARD, Engine};
use log::debug;
use ring::signature::{UnparsedPublicKey, RSA_PKCS1_2048_8192_SHA1_FOR_LEGACY_USE_ONLY};

/// Parses the public key and verifies `signature` is a valid RSA SHA-1 signature
/// of `body` using it.
///
/// `body` must be the raw bytes received on the wire. Re-serializing the parsed
/// JSON changes the bytes and the signature will not match.
pub fn verify_signature(signature: &str, body: &[u8], public_key: &[u8]) -> bool {
    match check_signature(signature, body, public_key) {
        Ok(()) => true,
        Err(e) => {
            debug!("Signature check failed: {}", e);
            false
        }
    }
}

pub(crate) fn check_signature(
    signature: &str,
    body: &[u8],
    public_key: &[u8],
) -> Result<(), VerificationError> {
    let decoded_signature = STANDARD
        .decode(signature.trim())
        .map_err(|_| VerificationError::SignatureDecode)?;

    // Algorithm is fixed by the platform
    let pkey = UnparsedPublicKey::new(&RSA_PKCS1_2048_8192_SHA1_FOR_LEGACY_USE_ONLY, public_key);

    pkey.verify(body, &decoded_signature)
        .map_err(|_| VerificationError::InvalidSignature)
}
