//! Checkpoint markers and screen routing.

use std::str::FromStr;

use strum::{Display, EnumString};

/// Server-tracked position marker in the onboarding flow.
///
/// Checkpoints are created implicitly at onboarding start and advance only
/// through the update-checkpoint call; the stored value is always the one the
/// server returns, which may differ from the one requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum, EnumString, Display)]
pub enum Checkpoint {
    /// Flow opened, account/card selection not yet confirmed.
    StartCob,
    /// Terms accepted and capability token issued; capture may begin.
    StartKyc,
    /// Retry leg: a fresh capability session was initiated.
    ReStartKyc,
    /// First-pass verification settled successfully.
    FinishKyc,
    /// Retry-leg verification settled successfully.
    ReFinishKyc,
}

/// Which screen a (re)entering user lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum Route {
    /// Welcome / account-selection path, for flows that have not completed
    /// capture yet.
    Welcome,
    /// Post-verification web handoff.
    WebHandoff,
}

impl Checkpoint {
    /// The screen this checkpoint resumes at. A two-way branch: the two
    /// pre-capture checkpoints go to the welcome path, everything else goes
    /// straight to the web handoff.
    #[must_use]
    pub const fn route(self) -> Route {
        match self {
            Self::StartCob | Self::StartKyc => Route::Welcome,
            Self::ReStartKyc | Self::FinishKyc | Self::ReFinishKyc => Route::WebHandoff,
        }
    }

    /// The wire name sent in update-checkpoint requests.
    #[must_use]
    pub fn wire_name(self) -> String {
        self.to_string()
    }
}

/// Routing for a raw checkpoint string as stored in the session. Unrecognized
/// or absent checkpoints default to the welcome screen.
#[uniffi::export]
#[must_use]
pub fn route_for_checkpoint(checkpoint: Option<String>) -> Route {
    checkpoint
        .as_deref()
        .and_then(|value| Checkpoint::from_str(value).ok())
        .map_or(Route::Welcome, Checkpoint::route)
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(Checkpoint::StartCob, Route::Welcome)]
    #[test_case(Checkpoint::StartKyc, Route::Welcome)]
    #[test_case(Checkpoint::ReStartKyc, Route::WebHandoff)]
    #[test_case(Checkpoint::FinishKyc, Route::WebHandoff)]
    #[test_case(Checkpoint::ReFinishKyc, Route::WebHandoff)]
    fn test_checkpoint_routing(checkpoint: Checkpoint, expected: Route) {
        assert_eq!(checkpoint.route(), expected);
    }

    #[test]
    fn test_wire_names_round_trip() {
        for checkpoint in [
            Checkpoint::StartCob,
            Checkpoint::StartKyc,
            Checkpoint::ReStartKyc,
            Checkpoint::FinishKyc,
            Checkpoint::ReFinishKyc,
        ] {
            let name = checkpoint.wire_name();
            assert_eq!(Checkpoint::from_str(&name).unwrap(), checkpoint);
        }
    }

    #[test]
    fn test_unknown_or_absent_checkpoint_defaults_to_welcome() {
        assert_eq!(route_for_checkpoint(None), Route::Welcome);
        assert_eq!(
            route_for_checkpoint(Some("SomethingNew".to_string())),
            Route::Welcome
        );
    }

    #[test]
    fn test_start_kyc_resumes_on_welcome_path() {
        // A flow whose OTP validation left it at StartKyc must re-enter the
        // account-selection path, not the web handoff.
        assert_eq!(
            route_for_checkpoint(Some("StartKyc".to_string())),
            Route::Welcome
        );
    }
}
