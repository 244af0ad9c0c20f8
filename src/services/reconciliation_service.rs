use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::checkout::{ReconciliationEntry, ReconciliationList, ReconciliationReport},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    response::{ApiResponse, Meta},
    services::checkout_service::finalize_order,
    state::AppState,
};

/// Queue an order whose payment status could not be confirmed with the
/// processor. Duplicate enqueues for the same order/session pair collapse
/// into one row.
pub(crate) async fn enqueue(pool: &DbPool, order_id: Uuid, session_id: &str) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO payment_reconciliations (id, order_id, session_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (order_id, session_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(order_id)
    .bind(session_id)
    .execute(pool)
    .await?;

    tracing::info!(%order_id, session_id, "queued order for payment reconciliation");
    Ok(())
}

pub async fn list_pending(
    pool: &DbPool,
    user: &AuthUser,
) -> AppResult<ApiResponse<ReconciliationList>> {
    ensure_admin(user)?;

    let items = sqlx::query_as::<_, (Uuid, Uuid, String, chrono::DateTime<chrono::Utc>)>(
        r#"
        SELECT id, order_id, session_id, created_at
        FROM payment_reconciliations
        WHERE resolved_at IS NULL
        ORDER BY created_at
        "#,
    )
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|(id, order_id, session_id, created_at)| ReconciliationEntry {
        id,
        order_id,
        session_id,
        created_at,
        resolved_at: None,
    })
    .collect::<Vec<_>>();

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Pending reconciliations",
        ReconciliationList { items },
        Some(Meta::new(1, total, total)),
    ))
}

/// Re-check every queued order against the processor. Paid sessions complete
/// the order and resolve the queue entry; the rest stay queued for the next
/// run.
pub async fn run(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<ReconciliationReport>> {
    ensure_admin(user)?;

    let pending = sqlx::query_as::<_, (Uuid, Uuid, String)>(
        r#"
        SELECT id, order_id, session_id
        FROM payment_reconciliations
        WHERE resolved_at IS NULL
        ORDER BY created_at
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    let mut report = ReconciliationReport {
        checked: 0,
        completed: 0,
        still_pending: 0,
    };

    for (entry_id, order_id, session_id) in pending {
        report.checked += 1;

        let status = match state.gateway.retrieve_session(&session_id).await {
            Ok(status) => status,
            Err(err) => {
                tracing::warn!(%order_id, error = %err, "reconciliation check failed");
                report.still_pending += 1;
                continue;
            }
        };

        if !status.is_paid() {
            report.still_pending += 1;
            continue;
        }

        finalize_order(&state.orm, order_id).await?;
        sqlx::query("UPDATE payment_reconciliations SET resolved_at = now() WHERE id = $1")
            .bind(entry_id)
            .execute(&state.pool)
            .await?;
        report.completed += 1;
        tracing::info!(%order_id, "order completed via reconciliation");
    }

    Ok(ApiResponse::success(
        "Reconciliation finished",
        report,
        Some(Meta::empty()),
    ))
}
