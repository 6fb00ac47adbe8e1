use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;

/// Request information for authentication
#[derive(Debug, Clone)]
pub struct AuthRequest {
    /// Header names are lowercased.
    pub headers: HashMap<String, String>,
    pub source_ip: IpAddr,
}

/// Authenticated caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub method: String,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            user_id: "anonymous".to_string(),
            method: "none".to_string(),
        }
    }

    /// Holder of the shared bearer secret. The secret carries no identity of
    /// its own, so every bearer caller maps to the same id.
    pub fn bearer() -> Self {
        Self {
            user_id: "bearer_client".to_string(),
            method: "bearer".to_string(),
        }
    }
}
