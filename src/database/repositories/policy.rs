use anyhow::Result;
use uuid::Uuid;

use crate::database::{pool, utils::sql};
use crate::services::policy::PolicyContext;

// Minimum hours layer requirement over call time over location over company;
// the other policy values only exist at location and company level.

pub async fn resolve_for_requirement(requirement_id: Uuid) -> Result<Option<PolicyContext>> {
    let context = sqlx::query_as::<_, PolicyContext>(&sql(r#"
            SELECT
                COALESCE(lr.minimum_hours, ct.minimum_hours, lp.minimum_hours, c.minimum_hours) AS minimum_hours,
                COALESCE(lp.meal_penalty_trigger_hours, c.meal_penalty_trigger_hours) AS meal_penalty_trigger_hours,
                COALESCE(lp.round_up_target, c.round_up_target) AS round_up_target,
                COALESCE(lp.hour_round_up, c.hour_round_up) AS hour_round_up
            FROM
                labor_requirements lr
                JOIN call_times ct ON ct.id = lr.call_time_id
                JOIN events e ON e.id = ct.event_id
                JOIN companies c ON c.id = e.company_id
                LEFT JOIN location_profiles lp ON lp.id = e.location_id
            WHERE
                lr.id = ?
        "#))
    .bind(requirement_id)
    .fetch_optional(pool())
    .await?;

    Ok(context)
}

pub async fn resolve_for_labor_request(labor_request_id: Uuid) -> Result<Option<PolicyContext>> {
    let context = sqlx::query_as::<_, PolicyContext>(&sql(r#"
            SELECT
                COALESCE(lr.minimum_hours, ct.minimum_hours, lp.minimum_hours, c.minimum_hours) AS minimum_hours,
                COALESCE(lp.meal_penalty_trigger_hours, c.meal_penalty_trigger_hours) AS meal_penalty_trigger_hours,
                COALESCE(lp.round_up_target, c.round_up_target) AS round_up_target,
                COALESCE(lp.hour_round_up, c.hour_round_up) AS hour_round_up
            FROM
                labor_requests req
                JOIN labor_requirements lr ON lr.id = req.requirement_id
                JOIN call_times ct ON ct.id = lr.call_time_id
                JOIN events e ON e.id = ct.event_id
                JOIN companies c ON c.id = e.company_id
                LEFT JOIN location_profiles lp ON lp.id = e.location_id
            WHERE
                req.id = ?
        "#))
    .bind(labor_request_id)
    .fetch_optional(pool())
    .await?;

    Ok(context)
}
