// src/analysis/skill_analyzer.rs
use super::{CategoryScore, LlmClient, SkillGapReport, SkillGapRequest};
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

pub struct SkillAnalyzer {
    llm: LlmClient,
}

/// Context attached when the model answered but the answer was not a report
#[derive(Debug)]
pub struct MalformedReply;

impl std::fmt::Display for MalformedReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Model reply could not be read as a skill gap report")
    }
}

/// True when analysis failed on the model's answer rather than on the call itself
pub fn is_malformed_reply(err: &anyhow::Error) -> bool {
    err.downcast_ref::<MalformedReply>().is_some()
}

/// Loose shape of what the model is asked to return
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReport {
    match_score: f64,
    #[serde(default)]
    matched_skills: Vec<String>,
    #[serde(default)]
    missing_skills: Vec<String>,
    #[serde(default)]
    category_breakdown: Vec<RawCategory>,
    #[serde(default)]
    summary: String,
}

#[derive(Deserialize)]
struct RawCategory {
    category: String,
    score: f64,
}

impl SkillAnalyzer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    pub async fn analyze(&self, request: &SkillGapRequest) -> Result<SkillGapReport> {
        if request.job_role.trim().is_empty() {
            anyhow::bail!("Job role is required for skill gap analysis");
        }

        info!(
            "Analyzing skill gap for role '{}' with {} user skills",
            request.job_role,
            request.user_skills.len()
        );

        let prompt = build_prompt(request);
        let reply = self
            .llm
            .complete(&prompt)
            .await
            .context("Failed to get skill gap analysis")?;

        parse_report(&reply).context(MalformedReply)
    }
}

fn build_prompt(request: &SkillGapRequest) -> String {
    let skills = crate::utils::normalize_skills(&request.user_skills)
        .into_iter()
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You are a career advisor for local job seekers.

CANDIDATE SKILLS:
{}

TARGET ROLE:
{}

JOB DESCRIPTION:
{}

TASK: Compare the candidate's skills with what the role requires. Respond with a single JSON
object and nothing else, using exactly these keys:
{{
  "matchScore": <integer 0-100>,
  "matchedSkills": [<skills the candidate already has>],
  "missingSkills": [<skills the candidate should learn>],
  "categoryBreakdown": [{{"category": <e.g. "Technical", "Soft Skills", "Tools">, "score": <integer 0-100>}}],
  "summary": <two sentences of advice>
}}"#,
        if skills.is_empty() { "(none listed)" } else { skills.as_str() },
        request.job_role.trim(),
        request
            .job_description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or("(not provided)")
    )
}

fn clamp_score(score: f64) -> u8 {
    if score.is_nan() {
        return 0;
    }
    score.round().clamp(0.0, 100.0) as u8
}

/// Pull the first balanced JSON object out of a model reply
fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in reply[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&reply[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

pub(crate) fn parse_report(reply: &str) -> Result<SkillGapReport> {
    let json = extract_json_object(reply).ok_or_else(|| {
        warn!("Model reply contained no JSON object");
        anyhow::anyhow!("Analysis response did not contain a JSON object")
    })?;

    let raw: RawReport =
        serde_json::from_str(json).context("Analysis response had an unexpected shape")?;

    Ok(SkillGapReport {
        match_score: clamp_score(raw.match_score),
        matched_skills: raw.matched_skills,
        missing_skills: raw.missing_skills,
        category_breakdown: raw
            .category_breakdown
            .into_iter()
            .map(|c| CategoryScore {
                category: c.category,
                score: clamp_score(c.score),
            })
            .collect(),
        summary: raw.summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config_manager::LlmProvider;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn parses_fenced_reply() {
        let reply = r#"Here you go:
```json
{"matchScore": 72, "matchedSkills": ["react"], "missingSkills": ["typescript", "testing"],
 "categoryBreakdown": [{"category": "Technical", "score": 65}], "summary": "Solid {base}."}
```"#;
        let report = parse_report(reply).unwrap();
        assert_eq!(report.match_score, 72);
        assert_eq!(report.missing_skills, vec!["typescript", "testing"]);
        assert_eq!(report.category_breakdown[0].score, 65);
        assert_eq!(report.summary, "Solid {base}.");
    }

    #[test]
    fn scores_are_clamped() {
        let report = parse_report(
            r#"{"matchScore": 140, "categoryBreakdown": [{"category": "Tools", "score": -5}]}"#,
        )
        .unwrap();
        assert_eq!(report.match_score, 100);
        assert_eq!(report.category_breakdown[0].score, 0);
    }

    #[test]
    fn malformed_reply_is_an_error() {
        assert!(parse_report("I cannot help with that").is_err());
        assert!(parse_report(r#"{"score": "high"}"#).is_err());
        assert!(parse_report(r#"{"matchScore": 10"#).is_err());
    }

    #[test]
    fn prompt_mentions_role_and_normalized_skills() {
        let prompt = build_prompt(&SkillGapRequest {
            user_skills: vec!["React".to_string(), "react ".to_string(), "SQL".to_string()],
            job_role: " Frontend Developer ".to_string(),
            job_description: None,
        });
        assert!(prompt.contains("react, sql"));
        assert!(prompt.contains("Frontend Developer"));
        assert!(prompt.contains("(not provided)"));
    }

    #[tokio::test]
    async fn analyze_round_trips_through_llm() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content":
                    "{\"matchScore\": 55, \"missingSkills\": [\"excel\"], \"summary\": \"ok\"}" } }]
            })))
            .mount(&mock_server)
            .await;

        let llm = LlmClient::new(LlmProvider::Groq, "key".to_string(), 5)
            .unwrap()
            .with_base_url(mock_server.uri());
        let analyzer = SkillAnalyzer::new(llm);

        let report = analyzer
            .analyze(&SkillGapRequest {
                user_skills: vec!["typing".to_string()],
                job_role: "Office Assistant".to_string(),
                job_description: Some("Data entry".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(report.match_score, 55);
        assert_eq!(report.missing_skills, vec!["excel"]);
    }

    #[tokio::test]
    async fn parse_and_upstream_failures_are_distinguished() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "Sorry, I can't rate that." } }]
            })))
            .mount(&mock_server)
            .await;

        let request = SkillGapRequest {
            user_skills: vec!["driving".to_string()],
            job_role: "Courier".to_string(),
            job_description: None,
        };

        let llm = LlmClient::new(LlmProvider::Groq, "key".to_string(), 5)
            .unwrap()
            .with_base_url(mock_server.uri());
        let err = SkillAnalyzer::new(llm).analyze(&request).await.unwrap_err();
        assert!(is_malformed_reply(&err));

        let llm = LlmClient::new(LlmProvider::Groq, "key".to_string(), 2)
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        let err = SkillAnalyzer::new(llm).analyze(&request).await.unwrap_err();
        assert!(!is_malformed_reply(&err));
    }

    #[tokio::test]
    async fn blank_role_is_rejected_before_calling_llm() {
        let llm = LlmClient::new(LlmProvider::Groq, "key".to_string(), 5)
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        let analyzer = SkillAnalyzer::new(llm);

        let result = analyzer
            .analyze(&SkillGapRequest {
                user_skills: vec![],
                job_role: "   ".to_string(),
                job_description: None,
            })
            .await;
        assert!(result.is_err());
    }
}
