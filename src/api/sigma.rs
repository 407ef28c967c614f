//! REST API endpoint for Sigma rule synthesis

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::error::ApiError;
use crate::service::RuleSynthesisService;

/// Request body for rule synthesis
#[derive(Debug, Deserialize, ToSchema)]
pub struct SigmaRuleRequest {
    /// Attack procedure description to build a rule for
    pub procedure: Option<String>,
}

/// Synthesized rule body
#[derive(Debug, Serialize, ToSchema)]
pub struct SigmaRuleResponse {
    pub sigma_rule: String,
}

/// Synthesize a Sigma rule for an attack procedure
#[utoipa::path(
    post,
    path = "/api/sigma_rule",
    request_body = SigmaRuleRequest,
    responses(
        (status = 200, description = "Rule synthesized", body = SigmaRuleResponse),
        (status = 400, description = "Missing procedure description"),
        (status = 500, description = "Retrieval or model failure")
    ),
    tag = "sigma"
)]
#[post("/api/sigma_rule")]
pub async fn create_sigma_rule(
    service: web::Data<RuleSynthesisService>,
    body: web::Json<SigmaRuleRequest>,
) -> Result<HttpResponse, ApiError> {
    let procedure = body
        .into_inner()
        .procedure
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Procedure description is required.".to_string()))?;

    let sigma_rule = service.create_rule(&procedure).await?;

    Ok(HttpResponse::Ok().json(SigmaRuleResponse { sigma_rule }))
}

/// Configure sigma rule routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_sigma_rule);
}
