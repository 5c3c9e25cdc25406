//! Per-flow session state.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Mutable state of a single onboarding flow.
///
/// One instance exists per flow: it is created when the flow starts and
/// dropped when the flow ends, and is passed explicitly to every component
/// that needs it. All mutation happens from the flow's own call sequence;
/// the lock only satisfies the `Send + Sync` requirement of the binding
/// layer, last writer wins.
#[derive(Debug, Default, uniffi::Object)]
pub struct Session {
    data: Mutex<SessionData>,
}

#[derive(Debug, Default)]
struct SessionData {
    session_id: Option<String>,
    identity_id: Option<String>,
    account_type_id: Option<String>,
    account_type_name: Option<String>,
    card_type_id: Option<String>,
    card_type_name: Option<String>,
    token: Option<String>,
    checkpoint: Option<String>,
}

#[uniffi::export]
impl Session {
    /// Creates an empty session.
    #[uniffi::constructor]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the flow identifiers returned by the start-onboarding call.
    pub fn set_session_data(
        &self,
        session_id: Option<String>,
        identity_id: Option<String>,
    ) {
        let mut data = self.data();
        data.session_id = session_id;
        data.identity_id = identity_id;
    }

    /// The current session id, if onboarding has been started.
    #[must_use]
    pub fn session_id(&self) -> Option<String> {
        self.data().session_id.clone()
    }

    /// The identity id bound to this flow.
    #[must_use]
    pub fn identity_id(&self) -> Option<String> {
        self.data().identity_id.clone()
    }

    /// Stores the bearer token for the identity-capture capability. Must be
    /// refreshed (via reinitiate) before every repeated capability launch.
    pub fn set_token(&self, token: Option<String>) {
        self.data().token = token;
    }

    /// The current capability bearer token.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.data().token.clone()
    }

    /// Stores the server-assigned checkpoint string.
    pub fn set_checkpoint(&self, checkpoint: Option<String>) {
        self.data().checkpoint = checkpoint;
    }

    /// The raw checkpoint string as last returned by the server.
    #[must_use]
    pub fn checkpoint(&self) -> Option<String> {
        self.data().checkpoint.clone()
    }

    /// Stores the account type id assigned at onboarding start.
    pub fn set_account_type_id(&self, id: Option<String>) {
        self.data().account_type_id = id;
    }

    /// The account type id, if any.
    #[must_use]
    pub fn account_type_id(&self) -> Option<String> {
        self.data().account_type_id.clone()
    }

    /// Stores the display name of the account type the user picked.
    pub fn set_account_type_name(&self, name: Option<String>) {
        self.data().account_type_name = name;
    }

    /// The account type display name, if the user has picked one.
    #[must_use]
    pub fn account_type_name(&self) -> Option<String> {
        self.data().account_type_name.clone()
    }

    /// Stores the card type id assigned at onboarding start.
    pub fn set_card_type_id(&self, id: Option<String>) {
        self.data().card_type_id = id;
    }

    /// The card type id, if any.
    #[must_use]
    pub fn card_type_id(&self) -> Option<String> {
        self.data().card_type_id.clone()
    }

    /// Stores the display name of the card type the user picked.
    pub fn set_card_type_name(&self, name: Option<String>) {
        self.data().card_type_name = name;
    }

    /// The card type display name, if the user has picked one.
    #[must_use]
    pub fn card_type_name(&self) -> Option<String> {
        self.data().card_type_name.clone()
    }

    /// Wipes all session state. Called on flow end and before a new flow.
    pub fn clear(&self) {
        *self.data() = SessionData::default();
    }

    /// Whether the flow identifiers required by most API calls are present.
    #[must_use]
    pub fn has_valid_session(&self) -> bool {
        let data = self.data();
        data.session_id.is_some() && data.identity_id.is_some()
    }
}

impl Session {
    fn data(&self) -> MutexGuard<'_, SessionData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
