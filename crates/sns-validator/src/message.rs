//! Inbound SNS message model.
//!
//! The wire form is a flat JSON object of string values. [`Message`] keeps
//! every known key as an optional field so that shape checks can run after
//! decoding, and preserves unknown keys in [`Message::extra`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};

/// SNS message type (`Type` key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    Notification,
    SubscriptionConfirmation,
    UnsubscribeConfirmation,
}

/// Keys every message must carry.
const REQUIRED_FIELDS: &[Field] = &[
    Field::Message,
    Field::MessageId,
    Field::Timestamp,
    Field::TopicArn,
    Field::Type,
    Field::Signature,
    Field::SigningCertUrl,
    Field::SignatureVersion,
];

/// [`REQUIRED_FIELDS`] plus the subscription control keys.
const REQUIRED_FIELDS_CONTROL: &[Field] = &[
    Field::Message,
    Field::MessageId,
    Field::Timestamp,
    Field::TopicArn,
    Field::Type,
    Field::Signature,
    Field::SigningCertUrl,
    Field::SignatureVersion,
    Field::SubscribeUrl,
    Field::Token,
];

const SIGNABLE_FIELDS_NOTIFICATION: &[Field] = &[
    Field::Message,
    Field::MessageId,
    Field::Subject,
    Field::SubscribeUrl,
    Field::Timestamp,
    Field::TopicArn,
    Field::Type,
];

const SIGNABLE_FIELDS_SUBSCRIPTION: &[Field] = &[
    Field::Message,
    Field::MessageId,
    Field::Subject,
    Field::SubscribeUrl,
    Field::Timestamp,
    Field::Token,
    Field::TopicArn,
    Field::Type,
];

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Notification => "Notification",
            Self::SubscriptionConfirmation => "SubscriptionConfirmation",
            Self::UnsubscribeConfirmation => "UnsubscribeConfirmation",
        }
    }

    /// Subscription control messages require `SubscribeURL` and `Token`.
    pub fn is_subscription_control(&self) -> bool {
        matches!(
            self,
            Self::SubscriptionConfirmation | Self::UnsubscribeConfirmation
        )
    }

    /// Fields that must be present for this type.
    pub fn required_fields(&self) -> &'static [Field] {
        if self.is_subscription_control() {
            REQUIRED_FIELDS_CONTROL
        } else {
            REQUIRED_FIELDS
        }
    }

    /// Fields covered by the signature, in signing order.
    ///
    /// `UnsubscribeConfirmation` signs like a notification: only
    /// `SubscriptionConfirmation` includes `Token`.
    pub fn signable_fields(&self) -> &'static [Field] {
        match self {
            Self::SubscriptionConfirmation => SIGNABLE_FIELDS_SUBSCRIPTION,
            Self::Notification | Self::UnsubscribeConfirmation => SIGNABLE_FIELDS_NOTIFICATION,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Notification" => Ok(Self::Notification),
            "SubscriptionConfirmation" => Ok(Self::SubscriptionConfirmation),
            "UnsubscribeConfirmation" => Ok(Self::UnsubscribeConfirmation),
            other => Err(ValidationError::structure(format!(
                "unknown message type {:?}",
                other
            ))),
        }
    }
}

/// A known message key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Type,
    MessageId,
    TopicArn,
    Subject,
    Message,
    Timestamp,
    Signature,
    SignatureVersion,
    SigningCertUrl,
    SubscribeUrl,
    UnsubscribeUrl,
    Token,
}

impl Field {
    /// Wire name of the key, as signed.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Type => "Type",
            Self::MessageId => "MessageId",
            Self::TopicArn => "TopicArn",
            Self::Subject => "Subject",
            Self::Message => "Message",
            Self::Timestamp => "Timestamp",
            Self::Signature => "Signature",
            Self::SignatureVersion => "SignatureVersion",
            Self::SigningCertUrl => "SigningCertURL",
            Self::SubscribeUrl => "SubscribeURL",
            Self::UnsubscribeUrl => "UnsubscribeURL",
            Self::Token => "Token",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An inbound SNS message.
///
/// JSON `null` for any known key decodes as `None`, so a null `Subject` is
/// neither required nor signed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,

    #[serde(rename = "MessageId", default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,

    #[serde(rename = "TopicArn", default, skip_serializing_if = "Option::is_none")]
    pub topic_arn: Option<String>,

    #[serde(rename = "Subject", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Payload body, opaque to the validator.
    #[serde(rename = "Message", default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(rename = "Timestamp", default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Base64 signature over the canonical buffer.
    #[serde(rename = "Signature", default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    #[serde(
        rename = "SignatureVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub signature_version: Option<String>,

    #[serde(
        rename = "SigningCertURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub signing_cert_url: Option<String>,

    #[serde(rename = "SubscribeURL", default, skip_serializing_if = "Option::is_none")]
    pub subscribe_url: Option<String>,

    #[serde(
        rename = "UnsubscribeURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub unsubscribe_url: Option<String>,

    /// Confirmation token (subscription control messages).
    #[serde(rename = "Token", default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// `SigningCertUrl`, as sent by Lambda-triggered deliveries.
    #[serde(
        rename = "SigningCertUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub signing_cert_url_alias: Option<String>,

    /// `UnsubscribeUrl`, as sent by Lambda-triggered deliveries.
    #[serde(
        rename = "UnsubscribeUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub unsubscribe_url_alias: Option<String>,

    /// Keys the validator does not know about. Never signed.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Message {
    /// Decode a message from its JSON text.
    pub fn from_json_str(json: &str) -> ValidationResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::structure(format!("undecodable message: {}", e)))
    }

    /// Decode a message from an already-parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> ValidationResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| ValidationError::structure(format!("undecodable message: {}", e)))
    }

    /// Resolve Lambda-style key aliases into their canonical fields.
    ///
    /// Alias fields are left in place. Applying this twice is a no-op.
    pub fn normalized(&self) -> Self {
        let mut normalized = self.clone();
        if let Some(url) = &self.signing_cert_url_alias {
            normalized.signing_cert_url = Some(url.clone());
        }
        if let Some(url) = &self.unsubscribe_url_alias {
            normalized.unsubscribe_url = Some(url.clone());
        }
        normalized
    }

    /// Value of a known key, if present.
    pub fn get(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::Type => &self.message_type,
            Field::MessageId => &self.message_id,
            Field::TopicArn => &self.topic_arn,
            Field::Subject => &self.subject,
            Field::Message => &self.message,
            Field::Timestamp => &self.timestamp,
            Field::Signature => &self.signature,
            Field::SignatureVersion => &self.signature_version,
            Field::SigningCertUrl => &self.signing_cert_url,
            Field::SubscribeUrl => &self.subscribe_url,
            Field::UnsubscribeUrl => &self.unsubscribe_url,
            Field::Token => &self.token,
        };
        value.as_deref()
    }

    /// Whether a known key is present.
    pub fn contains(&self, field: Field) -> bool {
        self.get(field).is_some()
    }

    /// Serialize back to the JSON wire form.
    pub fn to_json_value(&self) -> serde_json::Value {
        // Every field is a string or an already-valid JSON value.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl FromStr for Message {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json_str(s)
    }
}
