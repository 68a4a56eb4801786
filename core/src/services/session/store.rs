//! Session store owning revocation state and token lineage.

use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::domain::entities::token::SubjectId;
use crate::domain::value_objects::session::Session;
use crate::errors::{DomainError, DomainResult};

use super::clock::{Clock, SystemClock};
use super::codec::{Decoded, TokenCodec};
use super::config::SessionStoreConfig;

/// Sizes of the store's internal containers.
///
/// All three are bounded by live tokens: cleanup drops entries whose
/// underlying token has expired on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStoreStats {
    /// Tokens rejected ahead of signature verification
    pub revoked_tokens: usize,
    /// Access tokens with a recorded issuing refresh token
    pub lineage_entries: usize,
    /// Refresh tokens with a recorded family
    pub token_families: usize,
}

/// Revocation and lineage bookkeeping, only ever touched under the lock.
#[derive(Default)]
struct SessionState {
    /// access token -> refresh token that produced it
    issued_by: HashMap<String, String>,
    /// refresh token -> every access token minted from it
    families: HashMap<String, HashSet<String>>,
    /// tokens rejected regardless of signature and expiry
    revoked: HashSet<String>,
}

impl SessionState {
    /// Records that `access` was minted from `refresh`.
    fn record_issue(&mut self, access: String, refresh: String) {
        self.families
            .entry(refresh.clone())
            .or_default()
            .insert(access.clone());
        self.issued_by.insert(access, refresh);
    }

    /// Drops every record whose underlying token has expired as of `now`,
    /// returning how many revoked entries went away.
    ///
    /// Only a definite `Expired` outcome prunes a revoked entry. Entries
    /// that fail signature or structure checks stay: expiry is the one
    /// condition under which verification already rejects the token
    /// without consulting the revoked set.
    fn cleanup(&mut self, codec: &TokenCodec, now: i64) -> usize {
        let Self {
            issued_by,
            families,
            revoked,
        } = self;

        let revoked_before = revoked.len();
        revoked.retain(|token| !matches!(codec.decode(token, now), Decoded::Expired));

        issued_by.retain(|access, refresh| {
            if matches!(codec.decode(access, now), Decoded::Expired) {
                if let Some(members) = families.get_mut(refresh) {
                    members.remove(access);
                }
                false
            } else {
                true
            }
        });

        // A family whose refresh token still lives keeps its (possibly
        // empty) entry: the refresh token can mint new members.
        families.retain(|refresh, _| !matches!(codec.decode(refresh, now), Decoded::Expired));

        revoked_before - revoked.len()
    }
}

/// Issues, verifies, refreshes, and revokes paired access/refresh tokens.
///
/// One instance serves every request-handling context. All state sits
/// behind a single `RwLock`, so the multi-step revocation cascade sees a
/// consistent snapshot: an access token recorded in the lineage map by
/// the time `revoke` takes the write guard cannot escape the cascade.
pub struct SessionStore<C: Clock = SystemClock> {
    codec: TokenCodec,
    config: SessionStoreConfig,
    clock: C,
    state: RwLock<SessionState>,
}

impl SessionStore<SystemClock> {
    /// Creates a store reading the wall clock.
    ///
    /// # Errors
    ///
    /// Returns a validation error when either configured lifetime is not
    /// positive.
    pub fn new(codec: TokenCodec, config: SessionStoreConfig) -> DomainResult<Self> {
        Self::with_clock(codec, config, SystemClock)
    }
}

impl<C: Clock> SessionStore<C> {
    /// Creates a store reading time from `clock`.
    ///
    /// An access lifetime longer than the refresh lifetime is accepted
    /// but logged: such access tokens can outlive the refresh token whose
    /// revocation would have invalidated their family.
    ///
    /// # Errors
    ///
    /// Returns a validation error when either configured lifetime is not
    /// positive.
    pub fn with_clock(
        codec: TokenCodec,
        config: SessionStoreConfig,
        clock: C,
    ) -> DomainResult<Self> {
        if config.access_token_lifetime <= 0 || config.refresh_token_lifetime <= 0 {
            return Err(DomainError::Validation {
                message: "token lifetimes must be positive".to_string(),
            });
        }

        if config.access_token_lifetime > config.refresh_token_lifetime {
            warn!(
                access_token_lifetime = config.access_token_lifetime,
                refresh_token_lifetime = config.refresh_token_lifetime,
                "access token lifetime exceeds refresh token lifetime; \
                 revocation cannot reach access tokens that outlive their family"
            );
        }

        Ok(Self {
            codec,
            config,
            clock,
            state: RwLock::new(SessionState::default()),
        })
    }

    /// Opens a new session for `subject`.
    ///
    /// Mints an independent token family: a fresh access token and a
    /// fresh refresh token, with the access token recorded as issued by
    /// the refresh token. No prior state is consulted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::TokenGeneration` if signing fails.
    pub async fn create(&self, subject: SubjectId) -> DomainResult<Session> {
        let now = self.clock.now_unix();
        let access = self
            .codec
            .encode(subject, now, self.config.access_token_lifetime)?;
        let refresh = self
            .codec
            .encode(subject, now, self.config.refresh_token_lifetime)?;

        let mut state = self.state.write().await;
        state.record_issue(access.clone(), refresh.clone());
        let pruned = state.cleanup(&self.codec, now);
        drop(state);

        if pruned > 0 {
            debug!(pruned, "pruned expired session records");
        }
        debug!(subject, "opened session");

        Ok(Session::new(
            access,
            refresh,
            self.config.access_token_lifetime,
        ))
    }

    /// Resolves the subject behind `access_token`, or `None` when the
    /// token is revoked, expired, or not one of ours.
    ///
    /// Revocation membership is checked before the signature: a revoked
    /// token stays rejected even while its signature and expiry would
    /// pass. The caller learns nothing about which check failed.
    pub async fn get_user_id(&self, access_token: &str) -> Option<SubjectId> {
        let now = self.clock.now_unix();
        let state = self.state.read().await;
        if state.revoked.contains(access_token) {
            return None;
        }

        match self.codec.decode(access_token, now) {
            Decoded::Valid { subject, .. } => Some(subject),
            _ => None,
        }
    }

    /// Mints a new access token from `refresh_token`, returning
    /// `Ok(None)` when the refresh token is revoked, expired, or invalid.
    ///
    /// The refresh token itself is reused, not rotated: every access
    /// token it ever mints stays attributable to it, which is what lets
    /// [`revoke`](Self::revoke) end the whole family in one call.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::TokenGeneration` if signing fails.
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<Option<Session>> {
        let now = self.clock.now_unix();
        let mut state = self.state.write().await;
        if state.revoked.contains(refresh_token) {
            return Ok(None);
        }

        let subject = match self.codec.decode(refresh_token, now) {
            Decoded::Valid { subject, .. } => subject,
            _ => return Ok(None),
        };

        let access = self
            .codec
            .encode(subject, now, self.config.access_token_lifetime)?;
        state.record_issue(access.clone(), refresh_token.to_string());
        let pruned = state.cleanup(&self.codec, now);
        drop(state);

        if pruned > 0 {
            debug!(pruned, "pruned expired session records");
        }
        debug!(subject, "refreshed session");

        Ok(Some(Session::new(
            access,
            refresh_token.to_string(),
            self.config.access_token_lifetime,
        )))
    }

    /// Revokes `access_token` and its entire token family.
    ///
    /// When the token's issuing refresh token is known, every access
    /// token ever minted from that refresh token is revoked along with
    /// the refresh token itself, including access tokens from earlier
    /// refresh calls the caller may not remember. The given token is
    /// revoked unconditionally, so the operation is idempotent and
    /// no-op-safe for unknown or already-revoked input.
    pub async fn revoke(&self, access_token: &str) {
        let now = self.clock.now_unix();
        let mut state = self.state.write().await;
        let SessionState {
            issued_by,
            families,
            revoked,
        } = &mut *state;

        if let Some(refresh) = issued_by.get(access_token) {
            let mut family = 0;
            if let Some(members) = families.get(refresh) {
                family = members.len();
                revoked.extend(members.iter().cloned());
            }
            revoked.insert(refresh.clone());
            info!(family, "revoked token family");
        }
        revoked.insert(access_token.to_string());

        let pruned = state.cleanup(&self.codec, now);
        if pruned > 0 {
            debug!(pruned, "pruned expired session records");
        }
    }

    /// Current sizes of the revocation and lineage containers.
    pub async fn stats(&self) -> SessionStoreStats {
        let state = self.state.read().await;
        SessionStoreStats {
            revoked_tokens: state.revoked.len(),
            lineage_entries: state.issued_by.len(),
            token_families: state.families.len(),
        }
    }
}
