//! Simulated processing delays.
//!
//! A workflow step waits, then applies its mutation under the store's write
//! lock. The wait is part of the request future: if the client disconnects,
//! axum drops the future and the mutation never runs.

use subpay::io::config::SimulatedStep;
use subpay::store::Store;
use tracing::debug;

use crate::state::AppState;

/// Wait the configured delay for `step`, then run `apply` against the store.
pub async fn after_delay<T, F>(state: &AppState, step: SimulatedStep, apply: F) -> T
where
    F: FnOnce(&mut Store) -> T + Send,
    T: Send,
{
    let demo_mode = state.store.read().await.state().demo_mode;
    let delay = state.flows.config.delays.delay_for(step, demo_mode);
    debug!(step = ?step, delay_ms = delay.as_millis() as u64, "simulating step");

    tokio::time::sleep(delay).await;

    let mut store = state.store.write().await;
    apply(&mut *store)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use subpay::flows::{FlowContext, top_up};
    use subpay::io::config::DemoConfig;
    use subpay::state::NETFLIX_PLAN_ID;
    use subpay::test_support::FixedClock;

    use super::*;

    fn state() -> AppState {
        AppState::new(
            Store::seeded(),
            FlowContext::new(DemoConfig::default(), Arc::new(FixedClock::default())),
        )
    }

    /// Dropping the pending step before its delay elapses cancels the mutation.
    #[tokio::test(start_paused = true)]
    async fn aborted_step_leaves_store_unchanged() {
        let state = state();
        let before = state.store.read().await.clone();

        let task_state = state.clone();
        let handle = tokio::spawn(async move {
            let ctx = task_state.flows.clone();
            after_delay(&task_state, SimulatedStep::TopUp, |store| {
                top_up(store, &ctx, NETFLIX_PLAN_ID)
            })
            .await
        });

        tokio::time::advance(Duration::from_millis(500)).await;
        handle.abort();
        assert!(handle.await.is_err());
        tokio::time::advance(Duration::from_secs(10)).await;

        assert_eq!(*state.store.read().await, before);
    }

    #[tokio::test(start_paused = true)]
    async fn completed_step_applies_mutation() {
        let state = state();
        let ctx = state.flows.clone();

        let entry = after_delay(&state, SimulatedStep::TopUp, |store| {
            top_up(store, &ctx, NETFLIX_PLAN_ID)
        })
        .await
        .expect("top up");

        let store = state.store.read().await;
        assert_eq!(store.timeline()[0], entry);
    }

    /// Demo mode uses the shorter delay table.
    #[tokio::test(start_paused = true)]
    async fn live_mode_waits_longer() {
        let state = state();
        state.store.write().await.set_demo_mode(false);
        let started = tokio::time::Instant::now();

        after_delay(&state, SimulatedStep::TopUp, |_| ()).await;

        assert!(started.elapsed() >= Duration::from_millis(3_000));
    }
}
