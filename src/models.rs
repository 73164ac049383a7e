use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CardSwipeReq {
    /// Everything the reader typed, up to and including the `?` sentinel
    #[schema(example = "%B6010560000000000^REED/BOBBY^2612101000000000?", value_type = String)]
    pub card_data: Option<String>,
}

/// Claims carried by an instructor session token.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    /// Parsed card pattern, `LAST/FIRST`
    pub sub: String,
    pub instructor: String,
    /// Key into the session store
    pub sid: String,
    pub iat: usize,
    pub exp: usize,
}
