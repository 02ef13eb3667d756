//! Pair snapshot reads.

use crate::error::FetchError;
use clmm_keeper_domain::entities::{PairState, Position};
use clmm_keeper_protocols::{GatewaySession, LedgerGateway};
use tracing::debug;

/// Reads the pair's current tick, open positions and last-add time.
///
/// Fails if the listed ids disagree with the reported count. A pair with no
/// recorded add is returned as read; the policy classifies it.
pub async fn fetch_pair_state<G>(
    gateway: &G,
    session: &GatewaySession,
) -> Result<PairState, FetchError>
where
    G: LedgerGateway + ?Sized,
{
    let current_tick = gateway
        .current_tick(session)
        .await
        .map_err(FetchError::read("current_tick"))?;
    let count = gateway
        .position_count(session)
        .await
        .map_err(FetchError::read("position_count"))?;

    let mut positions = Vec::with_capacity(count);
    let mut last_add_timestamp = None;
    if count > 0 {
        let ids = gateway
            .position_ids(session)
            .await
            .map_err(FetchError::read("position_ids"))?;
        if ids.len() != count {
            return Err(FetchError::Inconsistent {
                count,
                ids: ids.len(),
            });
        }
        for id in ids {
            let range = gateway
                .position_ticks(session, id)
                .await
                .map_err(FetchError::read("position_ticks"))?;
            positions.push(Position::from_range(id, range));
        }
        last_add_timestamp = gateway
            .last_add_timestamp(session)
            .await
            .map_err(FetchError::read("last_add_timestamp"))?;
    }

    let state = PairState::new(
        session.token0.clone(),
        session.token1.clone(),
        current_tick,
        positions,
        last_add_timestamp,
    );
    debug!(
        session = %session.id,
        tick = state.current_tick,
        positions = state.positions.len(),
        last_add = ?state.last_add_timestamp,
        "Fetched pair state"
    );
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{amount, ledger, start};
    use chrono::TimeDelta;
    use clmm_keeper_domain::entities::PairShape;
    use clmm_keeper_domain::value_objects::{InvalidShape, TickRange};
    use clmm_keeper_protocols::GatewayError;

    #[tokio::test]
    async fn test_empty_ledger() {
        let ledger = ledger(1000, amount(100), amount(100));
        let state = fetch_pair_state(&ledger, &ledger.session()).await.unwrap();
        assert_eq!(state.current_tick, 1000);
        assert!(state.positions.is_empty());
        assert_eq!(state.last_add_timestamp, None);
    }

    #[tokio::test]
    async fn test_positions_are_ordered_with_timestamp() {
        let ledger = ledger(150, amount(100), amount(100));
        ledger.inject_position(TickRange::new(200, 700).unwrap()).await;
        ledger.inject_position(TickRange::new(100, 200).unwrap()).await;
        let added = start() - TimeDelta::seconds(60);
        ledger.set_last_add(Some(added)).await;

        let state = fetch_pair_state(&ledger, &ledger.session()).await.unwrap();
        assert_eq!(state.positions[0].range(), TickRange::new(100, 200).unwrap());
        assert_eq!(state.positions[1].range(), TickRange::new(200, 700).unwrap());
        assert_eq!(state.last_add_timestamp, Some(added));
    }

    #[tokio::test]
    async fn test_pair_without_timestamp_is_readable() {
        let ledger = ledger(150, amount(100), amount(100));
        ledger.inject_position(TickRange::new(100, 200).unwrap()).await;
        ledger.inject_position(TickRange::new(200, 700).unwrap()).await;

        let state = fetch_pair_state(&ledger, &ledger.session()).await.unwrap();
        assert_eq!(state.positions.len(), 2);
        assert_eq!(state.last_add_timestamp, None);
        assert_eq!(
            state.shape(),
            PairShape::Invalid(InvalidShape::MissingAddTime)
        );
    }

    #[tokio::test]
    async fn test_single_position_without_timestamp_is_readable() {
        let ledger = ledger(150, amount(100), amount(100));
        ledger.inject_position(TickRange::new(100, 200).unwrap()).await;
        let state = fetch_pair_state(&ledger, &ledger.session()).await.unwrap();
        assert_eq!(state.positions.len(), 1);
    }

    #[tokio::test]
    async fn test_read_failure_names_the_call() {
        let ledger = ledger(150, amount(100), amount(100));
        ledger.fail_next_reads(1).await;
        let err = fetch_pair_state(&ledger, &ledger.session())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::Read {
                call: "current_tick",
                source: GatewayError::Rpc { .. }
            }
        ));
    }
}
