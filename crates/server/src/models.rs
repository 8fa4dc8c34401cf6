use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CheckVisitsQuery {
    pub phone: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckVisitsResponse {
    pub phone_registered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visits: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_visits: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterVisitRequest {
    pub phone: String,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterVisitResponse {
    pub message: String,
    pub visits: u32,
    pub total_visits: u64,
    pub reward: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub phone: String,
    pub visits: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_visits: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
