//! Shared helpers: fixture certificate, message signing, stub fetcher.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use serde_json::json;
use sha1::Sha1;
use sns_validator::{
    canonical_bytes, CertificateFetcher, FetchError, Message, MessageType, MessageValidator,
    TextEncoding, ValidatorConfig,
};

pub const CERT_PEM: &str = include_str!("../fixtures/signing-cert.pem");
pub const OTHER_CERT_PEM: &str = include_str!("../fixtures/other-cert.pem");
pub const SIGNING_KEY_PEM: &str = include_str!("../fixtures/signing-key.pem");

pub const CERT_URL: &str = "https://sns.us-east-1.amazonaws.com/cert.pem";
pub const TIMESTAMP: &str = "2024-01-01T00:00:00.000Z";

/// Sign a message in place the way SNS does, using the fixture key.
pub fn sign_with(mut message: Message, encoding: TextEncoding) -> Message {
    let key = RsaPrivateKey::from_pkcs8_pem(SIGNING_KEY_PEM).expect("fixture key parses");
    let signing_key = SigningKey::<Sha1>::new(key);

    let normalized = message.normalized();
    let message_type: MessageType = normalized
        .message_type
        .as_deref()
        .expect("message has a type")
        .parse()
        .expect("known message type");

    let data = canonical_bytes(&normalized, message_type, encoding);
    let signature = signing_key.sign(&data);
    message.signature = Some(BASE64.encode(signature.to_bytes()));
    message
}

pub fn sign(message: Message) -> Message {
    sign_with(message, TextEncoding::Utf8)
}

pub fn notification(body: &str) -> Message {
    Message::from_value(json!({
        "Type": "Notification",
        "MessageId": "1",
        "TopicArn": "arn",
        "Message": body,
        "Timestamp": TIMESTAMP,
        "SignatureVersion": "1",
        "SigningCertURL": CERT_URL
    }))
    .expect("fixture message decodes")
}

pub fn lambda_notification() -> Message {
    Message::from_value(json!({
        "Type": "Notification",
        "MessageId": "1",
        "TopicArn": "arn",
        "Subject": null,
        "Message": "A Lambda message for you!",
        "Timestamp": TIMESTAMP,
        "SignatureVersion": "1",
        "SigningCertUrl": CERT_URL
    }))
    .expect("fixture message decodes")
}

pub fn subscription_confirmation() -> Message {
    Message::from_value(json!({
        "Type": "SubscriptionConfirmation",
        "MessageId": "1",
        "TopicArn": "arn",
        "Token": "Nonce",
        "SubscribeURL": "https://sns.us-east-1.amazonaws.com/?Action=ConfirmSubscription",
        "Message": "You have chosen to subscribe to the topic arn.",
        "Timestamp": TIMESTAMP,
        "SignatureVersion": "1",
        "SigningCertURL": CERT_URL
    }))
    .expect("fixture message decodes")
}

/// What the stub fetcher answers with.
pub enum StubResponse {
    Pem(&'static str),
    Status(u16),
}

/// In-memory fetcher that counts calls.
pub struct StubFetcher {
    response: StubResponse,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn serving(pem: &'static str) -> Arc<Self> {
        Arc::new(Self {
            response: StubResponse::Pem(pem),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            response: StubResponse::Status(status),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CertificateFetcher for StubFetcher {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            StubResponse::Pem(pem) => Ok(pem.as_bytes().to_vec()),
            StubResponse::Status(status) => Err(FetchError::Status { status: *status }),
        }
    }
}

/// Validator with default config backed by `fetcher`.
pub fn validator_with(fetcher: Arc<StubFetcher>) -> MessageValidator {
    MessageValidator::with_fetcher(ValidatorConfig::default(), fetcher)
        .expect("default config is valid")
}
