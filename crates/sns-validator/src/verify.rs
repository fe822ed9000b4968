//! Signature verification (SNS signature version 1).
//!
//! Version 1 is RSA PKCS#1 v1.5 with SHA-1 over the canonical buffer, using
//! the public key of the X.509 certificate at `SigningCertURL`.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::pkcs8::DecodePublicKey;
use rsa::signature::Verifier;
use rsa::RsaPublicKey;
use sha1::Sha1;
use tracing::debug;
use x509_cert::der::Encode;
use x509_cert::Certificate;

use crate::canonicalize::{canonical_bytes, TextEncoding};
use crate::cert::CertificateStore;
use crate::error::{SignatureFailure, ValidationError, ValidationResult};
use crate::message::{Field, Message, MessageType};

/// The only signature version this crate verifies.
pub const SUPPORTED_SIGNATURE_VERSION: &str = "1";

/// Verify a structurally valid message's signature.
///
/// # Verification Steps
///
/// 1. Reject any `SignatureVersion` other than `"1"`
/// 2. Build the canonical buffer for the message type
/// 3. Retrieve the signing certificate (cached per URL)
/// 4. Verify the base64 `Signature` with the certificate's RSA key
pub async fn verify_signature(
    message: &Message,
    message_type: MessageType,
    encoding: TextEncoding,
    certificates: &CertificateStore,
) -> ValidationResult<()> {
    // 1. Version gate
    let version = message.get(Field::SignatureVersion).unwrap_or_default();
    if version != SUPPORTED_SIGNATURE_VERSION {
        return Err(ValidationError::UnsupportedSignatureVersion {
            version: version.to_string(),
        });
    }

    // 2. Canonical buffer
    let canonical = canonical_bytes(message, message_type, encoding);

    // 3. Certificate
    let cert_url = message.get(Field::SigningCertUrl).unwrap_or_default();
    let certificate = certificates
        .get_certificate(cert_url)
        .await
        .map_err(|source| ValidationError::CertificateUnavailable {
            url: cert_url.to_string(),
            source,
        })?;

    // 4. Verify
    let signature_b64 = message.get(Field::Signature).unwrap_or_default();
    verify_with_certificate(&canonical, signature_b64, &certificate).map_err(|source| {
        debug!(
            message_id = message.get(Field::MessageId).unwrap_or_default(),
            error = %source,
            "signature rejected"
        );
        ValidationError::InvalidSignature { source }
    })
}

/// Verify an RSA-SHA1 signature over `data` against a PEM certificate.
///
/// When the PEM holds a chain, the first certificate is the signer.
pub fn verify_with_certificate(
    data: &[u8],
    signature_b64: &str,
    certificate_pem: &[u8],
) -> Result<(), SignatureFailure> {
    let public_key = rsa_public_key_from_pem(certificate_pem)?;

    let signature_bytes = BASE64.decode(signature_b64.trim())?;
    let signature = Signature::try_from(signature_bytes.as_slice())?;

    VerifyingKey::<Sha1>::new(public_key).verify(data, &signature)?;
    Ok(())
}

/// Extract the RSA public key from a PEM-encoded certificate.
fn rsa_public_key_from_pem(certificate_pem: &[u8]) -> Result<RsaPublicKey, SignatureFailure> {
    if certificate_pem.iter().all(u8::is_ascii_whitespace) {
        return Err(SignatureFailure::Certificate("empty certificate".to_string()));
    }

    let chain = Certificate::load_pem_chain(certificate_pem)
        .map_err(|e| SignatureFailure::Certificate(e.to_string()))?;
    let leaf = chain
        .first()
        .ok_or_else(|| SignatureFailure::Certificate("no certificate in PEM".to_string()))?;

    let spki_der = leaf
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|e| SignatureFailure::Certificate(e.to_string()))?;

    RsaPublicKey::from_public_key_der(&spki_der)
        .map_err(|e| SignatureFailure::PublicKey(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CERT_PEM: &str = include_str!("../tests/fixtures/signing-cert.pem");
    const OTHER_CERT_PEM: &str = include_str!("../tests/fixtures/other-cert.pem");

    const CANONICAL: &str = "Message\nhi\nMessageId\n1\nTimestamp\n2024-01-01T00:00:00.000Z\nTopicArn\narn\nType\nNotification\n";

    // Produced with: openssl dgst -sha1 -sign signing-key.pem
    const CANONICAL_SIGNATURE: &str = "b5yn+kOtUvpQvn5da9zWYPEPwKPtfdKZP39es45PHC+C487LGFeWA1m92qeH+y1qQ26NamHlEUgLIO/cyHCdm0a6KLEqZe1pediIFUUxisPeWCzBkE0HKwBn8a5qLnSY6WQPYZ9a8cOt4l++Zm6vAAH89TjEvGE8ZDwILrZmbdWprkVmT1TSk8WGPrNl5Jgyiw9K5G/H0xZSQ+Q4BPdR3zrqf0j+cqpeHSNL8s4T5Ax2Tkr1jCBhRev9D2LC+cJDqluh4RQXs+o0POHe/ngJy1ZRZjsM/oWk1nR99rool7zPX1xcWDZcfyfrIa2G+IcrGhwKJA1ib8v7HqnWzEXK7g==";

    #[test]
    fn test_golden_signature_verifies() {
        verify_with_certificate(
            CANONICAL.as_bytes(),
            CANONICAL_SIGNATURE,
            CERT_PEM.as_bytes(),
        )
        .unwrap();
    }

    #[test]
    fn test_tampered_data_fails() {
        let tampered = CANONICAL.replace("hi", "ho");
        let err = verify_with_certificate(
            tampered.as_bytes(),
            CANONICAL_SIGNATURE,
            CERT_PEM.as_bytes(),
        )
        .unwrap_err();
        assert!(matches!(err, SignatureFailure::Mismatch(_)));
    }

    #[test]
    fn test_wrong_certificate_fails() {
        let err = verify_with_certificate(
            CANONICAL.as_bytes(),
            CANONICAL_SIGNATURE,
            OTHER_CERT_PEM.as_bytes(),
        )
        .unwrap_err();
        assert!(matches!(err, SignatureFailure::Mismatch(_)));
    }

    #[test]
    fn test_chain_uses_first_certificate() {
        let chain = format!("{}{}", CERT_PEM, OTHER_CERT_PEM);
        verify_with_certificate(CANONICAL.as_bytes(), CANONICAL_SIGNATURE, chain.as_bytes())
            .unwrap();
    }

    #[test]
    fn test_malformed_inputs_are_classified() {
        let err =
            verify_with_certificate(CANONICAL.as_bytes(), "!!!", CERT_PEM.as_bytes()).unwrap_err();
        assert!(matches!(err, SignatureFailure::Encoding(_)));

        let err = verify_with_certificate(CANONICAL.as_bytes(), CANONICAL_SIGNATURE, b"garbage")
            .unwrap_err();
        assert!(matches!(err, SignatureFailure::Certificate(_)));

        let err =
            verify_with_certificate(CANONICAL.as_bytes(), "", CERT_PEM.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            SignatureFailure::Mismatch(_) | SignatureFailure::Encoding(_)
        ));
    }
}
