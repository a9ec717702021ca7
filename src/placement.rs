//! Placement-boundary validation.
//!
//! Bet placement itself belongs to an external collaborator; this module
//! is the check it runs before inserting a wager. Rejecting placement
//! against a started or completed game closes the race where a wager
//! created after settlement would sit pending forever — settlement stays
//! idempotent regardless, so a late wager is still caught by the next
//! re-run, but the boundary check keeps it from existing at all.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::types::{is_valid_american_price, Game, Wager, WagerKind, WagerStatus};

/// A bet request as submitted by a bettor, before validation.
#[derive(Debug, Clone)]
pub struct WagerDraft {
    pub bettor_id: String,
    pub kind: WagerKind,
    pub team: Option<String>,
    pub line: Option<Decimal>,
    pub price: i32,
    pub stake: Decimal,
}

/// Why a placement was rejected.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("Game is already completed")]
    GameCompleted,

    #[error("Game has already started")]
    GameStarted,

    #[error("Stake must be positive (got {0})")]
    NonPositiveStake(Decimal),

    #[error("Price {0} is not a valid American odds value")]
    InvalidPrice(i32),

    #[error("{0} wagers require a team")]
    MissingTeam(WagerKind),

    #[error("Totals wagers must not name a team")]
    UnexpectedTeam,

    #[error("Team '{0}' is not playing in this game")]
    UnknownTeam(String),

    #[error("{0} wagers require a line")]
    MissingLine(WagerKind),
}

/// Validate a draft against its game and mint the pending wager.
///
/// `now` is injected so callers control the clock.
pub fn validate_placement(
    game: &Game,
    draft: WagerDraft,
    now: DateTime<Utc>,
) -> Result<Wager, PlacementError> {
    if game.completed {
        return Err(PlacementError::GameCompleted);
    }
    if game.commence_time <= now {
        return Err(PlacementError::GameStarted);
    }
    if draft.stake <= Decimal::ZERO {
        return Err(PlacementError::NonPositiveStake(draft.stake));
    }
    if !is_valid_american_price(draft.price) {
        return Err(PlacementError::InvalidPrice(draft.price));
    }

    match (&draft.team, draft.kind.requires_team()) {
        (None, true) => return Err(PlacementError::MissingTeam(draft.kind)),
        (Some(_), false) => return Err(PlacementError::UnexpectedTeam),
        (Some(team), true) if !game.has_team(team) => {
            return Err(PlacementError::UnknownTeam(team.clone()));
        }
        _ => {}
    }

    if draft.kind.requires_line() && draft.line.is_none() {
        return Err(PlacementError::MissingLine(draft.kind));
    }

    Ok(Wager {
        id: Uuid::new_v4(),
        bettor_id: draft.bettor_id,
        game_id: game.id,
        kind: draft.kind,
        team: draft.team,
        line: draft.line,
        price: draft.price,
        stake: draft.stake,
        status: WagerStatus::Pending,
        profit: None,
        placed_at: now,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn draft(kind: WagerKind, team: Option<&str>, line: Option<Decimal>) -> WagerDraft {
        WagerDraft {
            bettor_id: "alice".to_string(),
            kind,
            team: team.map(String::from),
            line,
            price: -110,
            stake: dec!(50),
        }
    }

    #[test]
    fn test_valid_spread_placement() {
        let game = Game::sample();
        let wager = validate_placement(
            &game,
            draft(WagerKind::Spread, Some("Duke Blue Devils"), Some(dec!(-3.5))),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(wager.game_id, game.id);
        assert_eq!(wager.status, WagerStatus::Pending);
        assert!(wager.profit.is_none());
        assert_eq!(wager.stake, dec!(50));
    }

    #[test]
    fn test_valid_total_placement() {
        let game = Game::sample();
        let wager = validate_placement(
            &game,
            draft(WagerKind::TotalOver, None, Some(dec!(145.5))),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(wager.kind, WagerKind::TotalOver);
        assert!(wager.team.is_none());
    }

    #[test]
    fn test_rejects_completed_game() {
        let mut game = Game::sample();
        game.completed = true;
        let err = validate_placement(
            &game,
            draft(WagerKind::Moneyline, Some("Duke Blue Devils"), None),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, PlacementError::GameCompleted);
    }

    #[test]
    fn test_rejects_started_game() {
        let mut game = Game::sample();
        game.commence_time = Utc::now() - chrono::Duration::minutes(5);
        let err = validate_placement(
            &game,
            draft(WagerKind::Moneyline, Some("Duke Blue Devils"), None),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, PlacementError::GameStarted);
    }

    #[test]
    fn test_rejects_non_positive_stake() {
        let game = Game::sample();
        let mut d = draft(WagerKind::Moneyline, Some("Duke Blue Devils"), None);
        d.stake = Decimal::ZERO;
        assert_eq!(
            validate_placement(&game, d, Utc::now()).unwrap_err(),
            PlacementError::NonPositiveStake(Decimal::ZERO),
        );
    }

    #[test]
    fn test_rejects_price_inside_band() {
        let game = Game::sample();
        for price in [0, 50, -99, 99] {
            let mut d = draft(WagerKind::Moneyline, Some("Duke Blue Devils"), None);
            d.price = price;
            assert_eq!(
                validate_placement(&game, d, Utc::now()).unwrap_err(),
                PlacementError::InvalidPrice(price),
            );
        }
    }

    #[test]
    fn test_rejects_missing_team_for_moneyline() {
        let game = Game::sample();
        let err = validate_placement(&game, draft(WagerKind::Moneyline, None, None), Utc::now())
            .unwrap_err();
        assert_eq!(err, PlacementError::MissingTeam(WagerKind::Moneyline));
    }

    #[test]
    fn test_rejects_team_on_totals() {
        let game = Game::sample();
        let err = validate_placement(
            &game,
            draft(WagerKind::TotalUnder, Some("Duke Blue Devils"), Some(dec!(145.5))),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, PlacementError::UnexpectedTeam);
    }

    #[test]
    fn test_rejects_unknown_team() {
        let game = Game::sample();
        let err = validate_placement(
            &game,
            draft(WagerKind::Moneyline, Some("Kansas Jayhawks"), None),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, PlacementError::UnknownTeam("Kansas Jayhawks".to_string()));
    }

    #[test]
    fn test_rejects_missing_line_for_spread_and_totals() {
        let game = Game::sample();
        let err = validate_placement(
            &game,
            draft(WagerKind::Spread, Some("Duke Blue Devils"), None),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, PlacementError::MissingLine(WagerKind::Spread));

        let err = validate_placement(&game, draft(WagerKind::TotalOver, None, None), Utc::now())
            .unwrap_err();
        assert_eq!(err, PlacementError::MissingLine(WagerKind::TotalOver));
    }

    #[test]
    fn test_moneyline_without_line_is_fine() {
        let game = Game::sample();
        let wager = validate_placement(
            &game,
            draft(WagerKind::Moneyline, Some("North Carolina Tar Heels"), None),
            Utc::now(),
        )
        .unwrap();
        assert!(wager.line.is_none());
    }
}
