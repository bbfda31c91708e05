use serde::{Deserialize, Serialize};

/// Claims of a CMS user session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserClaims {
    pub id: i64,
    #[serde(default)]
    pub iat: Option<u64>,
    pub exp: u64,
}

/// Who a bearer token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Principal {
    Service,
    User(i64),
}
