use clap::Parser;

use crate::{
    auth::{Authenticator, Credential},
    prelude::*,
};

#[derive(Parser)]
pub struct AuthArgs {
    /// HMAC secret signing the bearer tokens, at least 32 bytes.
    #[clap(long = "jwt-secret", env = "JWT_SECRET", hide_env_values = true)]
    secret: String,

    #[clap(long = "jwt-issuer", env = "JWT_ISSUER", default_value = "supplier-rates")]
    issuer: String,

    #[clap(long = "jwt-audience", env = "JWT_AUDIENCE", default_value = "supplier-rates")]
    audience: String,

    #[clap(long = "jwt-lifetime", env = "JWT_LIFETIME", default_value = "24h")]
    lifetime: humantime::Duration,

    /// Allowed users as `name:password` pairs.
    #[clap(
        long = "users",
        env = "API_USERS",
        value_delimiter = ',',
        num_args = 1..,
        required = true,
        hide_env_values = true
    )]
    users: Vec<Credential>,
}

impl AuthArgs {
    pub fn authenticator(&self) -> Result<Authenticator> {
        Authenticator::builder()
            .secret(&self.secret)
            .users(self.users.iter().cloned().collect())
            .issuer(&self.issuer)
            .audience(&self.audience)
            .lifetime(self.lifetime.into())
            .build()
    }
}
