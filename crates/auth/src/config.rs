//! Token verification settings

/// Settings for verifying bearer tokens.
///
/// Tokens are HS256-signed with `jwt_secret`. When `issuer` or `audience`
/// is set, the corresponding claim must match; when unset, the claim is
/// not checked.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}
