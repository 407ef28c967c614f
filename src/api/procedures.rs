//! REST API endpoint for procedure extraction and evaluation

use std::sync::Arc;

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

use crate::api::error::ApiError;
use crate::model::EvaluatedProcedure;
use crate::retriever::{PageRetriever, is_url};
use crate::service::ProcedureAnalysisService;

/// Request body for procedure extraction
#[derive(Debug, Deserialize, ToSchema)]
pub struct ExtractProceduresRequest {
    /// Narrative text, or a URL whose page content will be analyzed
    pub procedures: Option<String>,
}

/// Scored procedures extracted from the narrative
#[derive(Debug, Serialize, ToSchema)]
pub struct ExtractProceduresResponse {
    pub procedures: Vec<EvaluatedProcedure>,
}

/// Extract and score attack procedures from text or a URL
#[utoipa::path(
    post,
    path = "/api/extract_procedures",
    request_body = ExtractProceduresRequest,
    responses(
        (status = 200, description = "Procedures extracted and scored", body = ExtractProceduresResponse),
        (status = 400, description = "Missing procedure description"),
        (status = 500, description = "Fetch or model failure")
    ),
    tag = "procedures"
)]
#[post("/api/extract_procedures")]
pub async fn extract_procedures(
    service: web::Data<ProcedureAnalysisService>,
    page_retriever: web::Data<Arc<dyn PageRetriever>>,
    body: web::Json<ExtractProceduresRequest>,
) -> Result<HttpResponse, ApiError> {
    let input = body
        .into_inner()
        .procedures
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Procedure description is required.".to_string()))?;

    let narrative = if is_url(&input) {
        let url = Url::parse(&input).map_err(|e| ApiError::UpstreamFetch(e.to_string()))?;
        tracing::info!(url = %url, "Fetching narrative content from URL");
        page_retriever.fetch_text(&url).await?
    } else {
        input
    };

    let procedures = service.analyze(&narrative).await?;

    Ok(HttpResponse::Ok().json(ExtractProceduresResponse { procedures }))
}

/// Configure procedure routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(extract_procedures);
}
