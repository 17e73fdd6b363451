//! Validation requests: the pending and cleared claims a wallet holds on
//! an address before it may submit a record.

use serde::{Deserialize, Serialize};

use crate::clock::UnixSeconds;
use crate::types::Address;

/// Suffix of every message a wallet signs to prove control of its address.
pub const MESSAGE_SUFFIX: &str = "starRegistry";

/// A pending claim on an address.
///
/// The `message` is fixed when the request is created and is never
/// rebuilt from a later timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRequest {
    pub wallet_address: Address,
    #[serde(with = "unix_string")]
    pub request_time_stamp: UnixSeconds,
    pub message: String,
    /// Seconds left in the validation window when this copy was produced.
    pub validation_window: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_signature: Option<bool>,
}

impl ValidationRequest {
    /// Create a fresh request with a full window.
    pub fn new(address: Address, requested_at: UnixSeconds, window_secs: u64) -> Self {
        let message = Self::message_for(&address, requested_at);
        Self {
            wallet_address: address,
            request_time_stamp: requested_at,
            message,
            validation_window: i64::try_from(window_secs).unwrap_or(i64::MAX),
            message_signature: None,
        }
    }

    /// Build the message a wallet has to sign.
    pub fn message_for(address: &Address, requested_at: UnixSeconds) -> String {
        format!("{}:{}:{}", address, requested_at, MESSAGE_SUFFIX)
    }

    /// Seconds left in the window at `now`. Zero or negative means expired.
    pub fn remaining_at(&self, now: UnixSeconds, window_secs: u64) -> i64 {
        let elapsed = now as i128 - self.request_time_stamp as i128;
        let remaining = window_secs as i128 - elapsed;
        remaining.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }

    /// Recompute `validation_window` as of `now`.
    pub fn refresh(&mut self, now: UnixSeconds, window_secs: u64) -> &mut Self {
        self.validation_window = self.remaining_at(now, window_secs);
        self
    }
}

/// A signature-verified, one-shot authorization to submit a record.
///
/// On the wire the status names the wallet's field `address` rather than
/// `walletAddress`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearedRequest {
    pub register_star: bool,
    #[serde(with = "cleared_status")]
    pub status: ValidationRequest,
}

impl ClearedRequest {
    /// Promote a verified request.
    pub fn new(mut request: ValidationRequest) -> Self {
        request.message_signature = Some(true);
        Self {
            register_star: true,
            status: request,
        }
    }

    pub fn address(&self) -> &Address {
        &self.status.wallet_address
    }
}

/// Unix seconds carried as a decimal string on the wire.
mod unix_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(secs: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(secs)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// A [`ValidationRequest`] with its address keyed as `address`.
mod cleared_status {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{unix_string, ValidationRequest};
    use crate::clock::UnixSeconds;
    use crate::types::Address;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct StatusRef<'a> {
        address: &'a Address,
        #[serde(with = "unix_string")]
        request_time_stamp: UnixSeconds,
        message: &'a str,
        validation_window: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        message_signature: Option<bool>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Status {
        address: Address,
        #[serde(with = "unix_string")]
        request_time_stamp: UnixSeconds,
        message: String,
        validation_window: i64,
        #[serde(default)]
        message_signature: Option<bool>,
    }

    pub fn serialize<S: Serializer>(
        request: &ValidationRequest,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        StatusRef {
            address: &request.wallet_address,
            request_time_stamp: request.request_time_stamp,
            message: &request.message,
            validation_window: request.validation_window,
            message_signature: request.message_signature,
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<ValidationRequest, D::Error> {
        let status = Status::deserialize(deserializer)?;
        Ok(ValidationRequest {
            wallet_address: status.address,
            request_time_stamp: status.request_time_stamp,
            message: status.message,
            validation_window: status.validation_window,
            message_signature: status.message_signature,
        })
    }
}
