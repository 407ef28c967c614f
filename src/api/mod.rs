pub mod error;
pub mod health;
pub mod openapi;
pub mod procedures;
pub mod sigma;

use utoipa::OpenApi;

/// OpenAPI documentation for the service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sigma Agent API",
        description = "Attack procedure extraction and evaluation, plus Sigma rule synthesis"
    ),
    paths(
        procedures::extract_procedures,
        sigma::create_sigma_rule,
        health::liveness,
        health::readiness
    ),
    components(schemas(
        crate::model::EvaluatedProcedure,
        procedures::ExtractProceduresRequest,
        procedures::ExtractProceduresResponse,
        sigma::SigmaRuleRequest,
        sigma::SigmaRuleResponse
    )),
    tags(
        (name = "procedures", description = "Procedure extraction and evaluation"),
        (name = "sigma", description = "Sigma rule synthesis"),
        (name = "health", description = "Health probes")
    )
)]
pub struct ApiDoc;
