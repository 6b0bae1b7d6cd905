use std::env;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::AuthError;

/// Default environment variable holding the tracker token
pub const DEF_TOKEN_ENV: &str = "PROXIMITY_TOKEN";

/// Describe the possible ways to authenticate oneself
///
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Auth {
    /// Nothing special, no auth
    Anon,
    /// Token read from an environment variable at startup
    Env { token_env: String },
    /// Using an API key supplied directly in the configuration
    Key { api_key: String },
}

impl Default for Auth {
    fn default() -> Self {
        Auth::Env {
            token_env: DEF_TOKEN_ENV.to_string(),
        }
    }
}

impl Auth {
    /// Resolve the token to send in the `Authorization` header, if any.
    ///
    #[tracing::instrument]
    pub fn token(&self) -> Result<Option<String>, AuthError> {
        let token = match self {
            Auth::Anon => return Ok(None),
            Auth::Env { token_env } => {
                trace!("reading token from {token_env}");
                let token =
                    env::var(token_env).map_err(|_| AuthError::NoToken(token_env.to_owned()))?;
                if token.trim().is_empty() {
                    return Err(AuthError::Invalid(token_env.to_owned()));
                }
                token
            }
            Auth::Key { api_key } => {
                if api_key.trim().is_empty() {
                    return Err(AuthError::Invalid("api_key".to_string()));
                }
                api_key.to_owned()
            }
        };
        Ok(Some(token.trim().to_string()))
    }
}

impl Display for Auth {
    /// Obfuscate the keys
    ///
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let auth = match self.clone() {
            Auth::Key { .. } => Auth::Key {
                api_key: "HIDDEN".to_string(),
            },
            auth => auth,
        };
        write!(f, "{:?}", auth)
    }
}
