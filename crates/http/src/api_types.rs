use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UsageInfo {
    pub description: &'static str,
    pub example: &'static str,
    pub response_type: &'static str,
}

/// Body of `GET /`.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub status: &'static str,
    pub message: &'static str,
    pub endpoints: BTreeMap<&'static str, &'static str>,
    pub usage: UsageInfo,
    pub update_interval: String,
}
