use std::{collections::BTreeMap, str::FromStr, time::Duration};

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Shorter HMAC keys are trivially brute-forced.
pub const MIN_SECRET_LENGTH: usize = 32;

/// User name and password pair, parsed from `name:password`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl FromStr for Credential {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (username, password) =
            s.split_once(':').context("the credential must look like `name:password`")?;
        ensure!(!username.trim().is_empty(), "empty user name");
        ensure!(!password.is_empty(), "empty password");
        Ok(Self { username: username.trim().to_string(), password: password.to_string() })
    }
}

/// Configured user table.
#[must_use]
#[derive(Clone, Debug, Default)]
pub struct Users(BTreeMap<String, String>);

impl FromIterator<Credential> for Users {
    fn from_iter<T: IntoIterator<Item = Credential>>(iter: T) -> Self {
        Self(iter.into_iter().map(|credential| (credential.username, credential.password)).collect())
    }
}

impl Users {
    #[must_use]
    pub fn check(&self, username: &str, password: &str) -> bool {
        self.0.get(username).is_some_and(|expected| expected == password)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(username, password)| (username.as_str(), password.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Token claims.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User name.
    pub sub: String,

    pub name: String,
    pub username: String,
    pub iss: String,
    pub aud: String,

    /// Issued at, UNIX seconds.
    pub iat: i64,

    /// Expires at, UNIX seconds.
    pub exp: i64,
}

#[derive(Clone, Debug)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Checks credentials and issues or verifies HS256 bearer tokens.
pub struct Authenticator {
    users: Users,
    issuer: String,
    audience: String,
    lifetime: TimeDelta,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

#[bon::bon]
impl Authenticator {
    #[builder]
    pub fn new(
        secret: &str,
        users: Users,
        #[builder(into)] issuer: String,
        #[builder(into)] audience: String,
        lifetime: Duration,
    ) -> Result<Self> {
        ensure!(
            secret.len() >= MIN_SECRET_LENGTH,
            "the token secret must be at least {MIN_SECRET_LENGTH} bytes long",
        );
        let lifetime = TimeDelta::from_std(lifetime).context("the token lifetime is too long")?;
        ensure!(lifetime > TimeDelta::zero(), "the token lifetime must be positive");
        ensure!(!users.is_empty(), "at least one user must be configured");
        info!(n_users = users.len(), %issuer, %audience, "configured the authenticator");
        Ok(Self {
            users,
            issuer,
            audience,
            lifetime,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }
}

impl Authenticator {
    pub const fn users(&self) -> &Users {
        &self.users
    }

    /// Issue a token for the user, returns [`None`] if the credentials do not match.
    #[instrument(skip_all, fields(username = username))]
    pub fn login(&self, username: &str, password: &str) -> Result<Option<IssuedToken>> {
        if !self.users.check(username, password) {
            warn!("invalid credentials");
            return Ok(None);
        }
        let token = self.issue(username, Utc::now())?;
        info!(expires_at = %token.expires_at, "issued");
        Ok(Some(token))
    }

    pub fn issue(&self, username: &str, now: DateTime<Utc>) -> Result<IssuedToken> {
        let expires_at = now + self.lifetime;
        let claims = Claims {
            sub: username.to_string(),
            name: username.to_string(),
            username: username.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("failed to sign the token")?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Verify the signature, issuer, audience and expiry, with no clock skew allowance.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .context("invalid token")?;
        Ok(data.claims)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    pub const SECRET: &str = "0123456789abcdef0123456789abcdef";

    pub fn authenticator(secret: &str, audience: &str) -> Authenticator {
        Authenticator::builder()
            .secret(secret)
            .users(["admin:password123".parse::<Credential>().unwrap()].into_iter().collect())
            .issuer("supplier-rates")
            .audience(audience)
            .lifetime(Duration::from_secs(3600))
            .build()
            .unwrap()
    }

    #[test]
    fn credential_parsing() -> Result {
        let credential: Credential = "api_user:api:secret".parse()?;
        assert_eq!(credential.username, "api_user");
        assert_eq!(credential.password, "api:secret");
        assert!("no-password".parse::<Credential>().is_err());
        assert!(":password".parse::<Credential>().is_err());
        Ok(())
    }

    #[test]
    fn short_secret_rejected() {
        let result = Authenticator::builder()
            .secret("short")
            .users(["admin:password123".parse::<Credential>().unwrap()].into_iter().collect())
            .issuer("supplier-rates")
            .audience("supplier-rates")
            .lifetime(Duration::from_secs(3600))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn login_ok() -> Result {
        let authenticator = authenticator(SECRET, "supplier-rates");
        let issued = authenticator.login("admin", "password123")?.context("no token")?;
        let claims = authenticator.verify(&issued.token)?;
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.exp, issued.expires_at.timestamp());
        Ok(())
    }

    #[test]
    fn login_invalid_credentials() -> Result {
        let authenticator = authenticator(SECRET, "supplier-rates");
        assert!(authenticator.login("admin", "wrong")?.is_none());
        assert!(authenticator.login("nobody", "password123")?.is_none());
        Ok(())
    }

    #[test]
    fn wrong_secret_rejected() -> Result {
        let issued = authenticator(SECRET, "supplier-rates").issue("admin", Utc::now())?;
        let other = authenticator("fedcba9876543210fedcba9876543210", "supplier-rates");
        assert!(other.verify(&issued.token).is_err());
        Ok(())
    }

    #[test]
    fn wrong_audience_rejected() -> Result {
        let issued = authenticator(SECRET, "someone-else").issue("admin", Utc::now())?;
        assert!(authenticator(SECRET, "supplier-rates").verify(&issued.token).is_err());
        Ok(())
    }

    #[test]
    fn expired_rejected() -> Result {
        let authenticator = authenticator(SECRET, "supplier-rates");
        let issued = authenticator.issue("admin", Utc::now() - TimeDelta::hours(2))?;
        assert!(authenticator.verify(&issued.token).is_err());
        Ok(())
    }

    #[test]
    fn garbage_rejected() {
        assert!(authenticator(SECRET, "supplier-rates").verify("not.a.token").is_err());
    }
}
