use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path as AxumPath, Query, State};

use crate::app_state::AppState;
use crate::errors::ServerError;
use crate::models::{
    CheckVisitsQuery, CheckVisitsResponse, CustomerResponse, RegisterVisitRequest,
    RegisterVisitResponse,
};

pub async fn check_visits(
    State(state): State<AppState>,
    query: Result<Query<CheckVisitsQuery>, QueryRejection>,
) -> Result<Json<CheckVisitsResponse>, ServerError> {
    let Query(query) = query?;
    let phone = query.phone.trim();
    let expose_lifetime = state.ledger.policy().expose_lifetime;

    let response = match state.ledger.lookup(phone).await? {
        Some(record) => CheckVisitsResponse {
            phone_registered: true,
            visits: Some(record.counters.monthly),
            total_visits: expose_lifetime.then_some(record.counters.lifetime),
        },
        None => CheckVisitsResponse {
            phone_registered: false,
            visits: None,
            total_visits: None,
        },
    };
    Ok(Json(response))
}

pub async fn register_visit(
    State(state): State<AppState>,
    payload: Result<Json<RegisterVisitRequest>, JsonRejection>,
) -> Result<Json<RegisterVisitResponse>, ServerError> {
    let Json(payload) = payload?;
    let phone = payload.phone.trim();
    let outcome = state
        .ledger
        .register_visit(phone, payload.name.as_deref())
        .await?;

    let counters = outcome.counters();
    Ok(Json(RegisterVisitResponse {
        message: outcome.message(state.ledger.policy().cycle_length),
        visits: counters.monthly,
        total_visits: counters.lifetime,
        reward: outcome.is_reward(),
    }))
}

pub async fn customer_visits(
    State(state): State<AppState>,
    phone: Result<AxumPath<String>, PathRejection>,
) -> Result<Json<CustomerResponse>, ServerError> {
    let AxumPath(phone) = phone?;
    let record = state.ledger.find(phone.trim()).await?;
    let expose_lifetime = state.ledger.policy().expose_lifetime;

    Ok(Json(CustomerResponse {
        phone: record.phone,
        visits: record.counters.monthly,
        total_visits: expose_lifetime.then_some(record.counters.lifetime),
        name: record.name,
    }))
}
