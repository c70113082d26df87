//! Recurring background jobs.
//!
//! Call `spawn_all` once during startup. Each job is idempotent, so a
//! restart or an overlapping run never double-applies anything.

use crate::services::{LoyaltyService, PaymentService};
use std::time::Duration;

const HOURLY: Duration = Duration::from_secs(3600);

/// Spawn all background tasks. Tasks are detached; this does not block.
pub fn spawn_all(loyalty_service: LoyaltyService, payment_service: PaymentService) {
    // Redeemed rewards past their expiry date
    {
        let svc = loyalty_service.clone();
        tokio::spawn(async move {
            loop {
                match svc.expire_rewards().await {
                    Ok(n) if n > 0 => log::info!("Expired user rewards: {n}"),
                    Ok(_) => {}
                    Err(e) => log::error!("Failed to expire user rewards: {e:?}"),
                }
                tokio::time::sleep(HOURLY).await;
            }
        });
    }

    // Checkouts the customer never completed
    {
        let svc = payment_service.clone();
        tokio::spawn(async move {
            loop {
                match svc.abandon_stale_payments().await {
                    Ok(n) if n > 0 => log::info!("Abandoned stale payments: {n}"),
                    Ok(_) => {}
                    Err(e) => log::error!("Failed to abandon stale payments: {e:?}"),
                }
                tokio::time::sleep(HOURLY).await;
            }
        });
    }
}
