// src/analysis/mod.rs
use serde::{Deserialize, Serialize};

pub mod job_search;
pub mod llm_client;
pub mod skill_analyzer;

pub use job_search::{JobSearchClient, JobSearchRequest};
pub use llm_client::LlmClient;
pub use skill_analyzer::{is_malformed_reply, SkillAnalyzer};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillGapRequest {
    pub user_skills: Vec<String>,
    pub job_role: String,
    #[serde(default)]
    pub job_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScore {
    pub category: String,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillGapReport {
    pub match_score: u8,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub category_breakdown: Vec<CategoryScore>,
    pub summary: String,
}
