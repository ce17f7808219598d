//! Identity collaborator
//!
//! Engine operations act on a [`VerifiedPlayer`], which can only be obtained
//! by checking a signed token. Tokens are `"<player id>.<signature>"` where the
//! signature is HMAC-SHA256 over the decimal id with a secret injected at startup,
//! encoded as unpadded URL-safe base64.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;

use crate::error::{GameError, Result};
use crate::models::PlayerId;

type HmacSha256 = Hmac<Sha256>;

/// A player id that passed token verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VerifiedPlayer(PlayerId);

impl VerifiedPlayer {
    pub(crate) fn new(id: PlayerId) -> Self {
        Self(id)
    }

    pub fn id(&self) -> PlayerId {
        self.0
    }
}

impl fmt::Display for VerifiedPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Turns a caller's credential into a [`VerifiedPlayer`].
pub trait IdentityProvider: Send + Sync {
    fn verify(&self, token: &str) -> Result<VerifiedPlayer>;
}

#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner").field("secret", &"<redacted>").finish()
    }
}

impl TokenSigner {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self { secret: secret.into() }
    }

    pub fn issue(&self, player: PlayerId) -> String {
        let signature = self.mac(player).finalize().into_bytes();
        format!("{}.{}", player.0, URL_SAFE_NO_PAD.encode(signature))
    }

    fn mac(&self, player: PlayerId) -> HmacSha256 {
        let mut mac = match HmacSha256::new_from_slice(&self.secret) {
            Ok(mac) => mac,
            Err(_) => unreachable!("HMAC accepts keys of any length"),
        };
        mac.update(player.0.to_string().as_bytes());
        mac
    }
}

impl IdentityProvider for TokenSigner {
    fn verify(&self, token: &str) -> Result<VerifiedPlayer> {
        let (id_part, sig_part) = token
            .trim()
            .split_once('.')
            .ok_or_else(|| GameError::Unauthorized("malformed token".into()))?;

        let id = id_part
            .parse::<u64>()
            .map(PlayerId)
            .map_err(|_| GameError::Unauthorized("malformed player id".into()))?;

        let given = URL_SAFE_NO_PAD
            .decode(sig_part)
            .map_err(|_| GameError::Unauthorized("malformed signature".into()))?;

        self.mac(id)
            .verify_slice(&given)
            .map_err(|_| GameError::Unauthorized("bad signature".into()))?;

        Ok(VerifiedPlayer::new(id))
    }
}
