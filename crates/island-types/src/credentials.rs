//! Credentials that agents may use to propagate, either configured by the
//! operator or stolen during a simulation.

use serde::{Deserialize, Serialize};

/// Who the credentials authenticate as.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Identity {
    Username(String),
    EmailAddress(String),
}

/// The secret half of a credential pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Secret {
    Password { password: String },
    LmHash { lm_hash: String },
    NtHash { nt_hash: String },
    SshKeypair { public_key: String, private_key: String },
}

/// An identity/secret pair. Either side may be unknown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Credentials {
    pub identity: Option<Identity>,
    pub secret: Option<Secret>,
}

impl Credentials {
    pub fn new(identity: Option<Identity>, secret: Option<Secret>) -> Self {
        Self { identity, secret }
    }
}
