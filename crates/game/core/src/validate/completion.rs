use super::error::{ValidationError, ValidationErrorKind};
use super::policy::ValidationReport;
use crate::config::SessionConfig;
use crate::state::SessionState;

/// Checks that an explore session may be completed.
///
/// Both conditions are always enforced: every enemy defeated and the player
/// standing on the portal. Every unmet condition is reported.
pub fn check_completion(state: &SessionState, config: &SessionConfig) -> Result<(), ValidationReport> {
    let mut report = ValidationReport::new();

    let alive = state.alive_enemies().count();
    if alive > 0 {
        report.push(ValidationError::hard(
            ValidationErrorKind::EnemiesAlive,
            format!("Enemies still alive ({alive})"),
        ));
    }

    if state.player.position != config.portal {
        report.push(
            ValidationError::hard(
                ValidationErrorKind::NotOnPortal,
                format!(
                    "Player is not on the portal (at {}, portal at {})",
                    state.player.position, config.portal
                ),
            )
            .for_unit(&state.player.id),
        );
    }

    if report.is_empty() { Ok(()) } else { Err(report) }
}
