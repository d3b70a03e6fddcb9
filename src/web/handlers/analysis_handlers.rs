// src/web/handlers/analysis_handlers.rs
use crate::analysis::{is_malformed_reply, JobSearchRequest, SkillGapReport, SkillGapRequest};
use crate::web::types::*;
use rocket::http::Status;
use rocket::serde::json::{Json, Value};
use rocket::State;
use tracing::error;

pub async fn skill_gap_handler(
    request: Json<SkillGapRequest>,
    services: &State<ServiceState>,
) -> ApiResult<SkillGapReport> {
    let Some(analyzer) = services.analyzer.as_ref() else {
        return Err(api_error(
            Status::ServiceUnavailable,
            "Skill analysis is not configured",
            "ANALYSIS_UNAVAILABLE",
            &["Set GEMINI_API_KEY or GROQ_API_KEY on the server"],
        ));
    };

    if request.job_role.trim().is_empty() {
        return Err(api_error(
            Status::BadRequest,
            "Job role is required",
            "INVALID_ANALYSIS_REQUEST",
            &["Provide the role you want to be assessed against"],
        ));
    }

    match analyzer.analyze(&request).await {
        Ok(report) => Ok(Json(DataResponse::success("Skill gap analysis complete", report))),
        Err(e) if is_malformed_reply(&e) => {
            error!("Skill gap analysis reply was unusable: {:#}", e);
            Err(api_error(
                Status::BadGateway,
                "The analysis service returned an unusable answer",
                "ANALYSIS_PARSE_ERROR",
                &["Try again in a few moments"],
            ))
        }
        Err(e) => {
            error!("Skill gap analysis call failed: {:#}", e);
            Err(api_error(
                Status::BadGateway,
                "The analysis service could not be reached",
                "ANALYSIS_UPSTREAM_ERROR",
                &["Try again in a few moments", "Check the server's LLM provider key"],
            ))
        }
    }
}

pub async fn job_search_handler(
    request: Json<JobSearchRequest>,
    services: &State<ServiceState>,
) -> ApiResult<Value> {
    let Some(client) = services.job_search.as_ref() else {
        return Err(api_error(
            Status::ServiceUnavailable,
            "Job search is not configured",
            "JOB_SEARCH_UNAVAILABLE",
            &["Set JOOBLE_API_KEY on the server"],
        ));
    };

    match client.search(&request).await {
        Ok(jobs) => Ok(Json(DataResponse::success("Job search complete", jobs))),
        Err(e) => {
            error!("Job search failed: {:#}", e);
            Err(api_error(
                Status::BadGateway,
                "Job search service failed",
                "JOB_SEARCH_ERROR",
                &["Try again in a few moments"],
            ))
        }
    }
}
