// In crates/execution/src/retry.rs

use crate::gateway::Gateway;
use app_config::types::{ReconcileSettings, RetrySettings};
use core_types::{OrderOutcome, OrderRequest, OrderStatus};
use tracing::{debug, warn};

/// Submits `request`, retrying transient failures with a fixed delay.
///
/// Every attempt carries the same idempotency key. A lost answer does not
/// mean the order was lost: the venue only refuses a repeated client order id
/// while the first order is still open, so before each resubmission the venue
/// is asked what it did with the key. The order is sent again only when the
/// venue has no record of it.
///
/// Business refusals are returned as they are and never retried. A permanent
/// gateway failure means the order was not accepted and becomes `Rejected`.
/// Running out of attempts on transient failures becomes `Unknown`.
pub async fn submit_with_retry(
    gateway: &dyn Gateway,
    request: &OrderRequest,
    policy: &RetrySettings,
) -> OrderOutcome {
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        if attempt > 1 {
            match gateway
                .get_order_status(&request.symbol, &request.idempotency_key)
                .await
            {
                Ok(OrderStatus::Filled(fill)) => {
                    debug!(key = %request.idempotency_key, attempt, "Earlier attempt was filled.");
                    return OrderOutcome::Filled(fill);
                }
                Ok(OrderStatus::Rejected { reason }) => return OrderOutcome::Rejected { reason },
                Ok(OrderStatus::Pending) => {
                    debug!(key = %request.idempotency_key, attempt, "Earlier attempt is still open.");
                    return OrderOutcome::Unknown;
                }
                Ok(OrderStatus::NotFound) => {}
                Err(e) if e.is_transient() => {
                    if attempt == max_attempts {
                        warn!(
                            key = %request.idempotency_key,
                            error = %e,
                            attempts = max_attempts,
                            "Retries exhausted; order outcome is unknown."
                        );
                        break;
                    }
                    warn!(
                        key = %request.idempotency_key,
                        error = %e,
                        attempt,
                        "Status check before resubmission failed, retrying."
                    );
                    tokio::time::sleep(policy.delay()).await;
                    continue;
                }
                Err(e) => {
                    warn!(key = %request.idempotency_key, error = %e, "Status check before resubmission failed.");
                    return OrderOutcome::Unknown;
                }
            }
        }

        match gateway.submit_order(request).await {
            Ok(outcome) => {
                if attempt > 1 {
                    debug!(key = %request.idempotency_key, attempt, "Submission answered after retry.");
                }
                return outcome;
            }
            Err(e) if e.is_transient() => {
                if attempt == max_attempts {
                    warn!(
                        key = %request.idempotency_key,
                        error = %e,
                        attempts = max_attempts,
                        "Retries exhausted; order outcome is unknown."
                    );
                    break;
                }
                warn!(
                    key = %request.idempotency_key,
                    error = %e,
                    attempt,
                    max_attempts,
                    delay_ms = policy.delay_ms,
                    "Transient submission failure, retrying."
                );
                tokio::time::sleep(policy.delay()).await;
            }
            Err(e) => {
                warn!(key = %request.idempotency_key, error = %e, "Permanent submission failure.");
                return OrderOutcome::Rejected {
                    reason: e.to_string(),
                };
            }
        }
    }

    OrderOutcome::Unknown
}

/// Polls the venue for the fate of `request` until it resolves or the poll
/// budget runs out. Returns `Unknown` if it is still unresolved.
///
/// `NotFound` counts as resolved: the venue never took the order.
pub async fn reconcile(
    gateway: &dyn Gateway,
    request: &OrderRequest,
    policy: &ReconcileSettings,
) -> OrderOutcome {
    let max_polls = policy.max_polls.max(1);

    for poll in 1..=max_polls {
        // A timed-out submission may still be in flight; give it time to land.
        tokio::time::sleep(policy.poll_interval()).await;

        match gateway
            .get_order_status(&request.symbol, &request.idempotency_key)
            .await
        {
            Ok(OrderStatus::Filled(fill)) => return OrderOutcome::Filled(fill),
            Ok(OrderStatus::Rejected { reason }) => return OrderOutcome::Rejected { reason },
            Ok(OrderStatus::NotFound) => {
                return OrderOutcome::Rejected {
                    reason: "order not found on the venue".to_string(),
                };
            }
            Ok(OrderStatus::Pending) => {
                debug!(key = %request.idempotency_key, poll, "Order still pending.");
            }
            Err(e) => {
                warn!(key = %request.idempotency_key, error = %e, poll, "Order status query failed.");
            }
        }
    }

    OrderOutcome::Unknown
}
