use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RefreshTokenRequest<'rt> {
    pub grant_type: &'static str,
    pub refresh_token: &'rt str,
}
