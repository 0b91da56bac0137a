//! Optional language-model fallback.
//!
//! The deterministic engine always wins: the oracle is consulted only
//! when no explicit time expression matched and the 18:00 default would
//! otherwise supply the start. Its reply is parsed and checked against
//! the same [`EventCandidate`] invariants before it is accepted — a
//! malformed or late reply fails the whole extraction atomically rather
//! than producing a partially-filled candidate.

use std::time::Duration;

use async_trait::async_trait;

use crate::candidate::{EventCandidate, UNTITLED_EVENT, format_datetime, parse_datetime_flex};
use crate::context::ReferenceContext;
use crate::engine;
use crate::error::ExtractError;

/// Single-shot deadline for one oracle request. No retries.
pub const ORACLE_TIMEOUT: Duration = Duration::from_secs(20);

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// A single-shot completion backend.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Run one completion with a system and a user message. Must be
    /// timeout-bounded by the implementation.
    async fn complete(&self, system: &str, user: &str) -> Result<String, ExtractError>;
}

/// Chat-completions client for an OpenAI-compatible endpoint.
pub struct OpenAiOracle {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl OpenAiOracle {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(api_key, DEFAULT_ENDPOINT, DEFAULT_MODEL)
    }

    pub fn with_endpoint(api_key: impl Into<String>, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder().timeout(ORACLE_TIMEOUT).build().unwrap_or_default();
        OpenAiOracle { client, endpoint: endpoint.into(), model: model.into(), api_key: api_key.into() }
    }
}

#[async_trait]
impl Oracle for OpenAiOracle {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ExtractError> {
        let body = serde_json::json!({
            "model": self.model,
            "temperature": 0,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ExtractError::OracleTimeout
                } else {
                    ExtractError::OracleUnavailable(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::OracleUnavailable(format!("endpoint answered {status}")));
        }

        let reply: serde_json::Value = response
            .json()
            .await
            .map_err(|err| ExtractError::OracleMalformedResponse(err.to_string()))?;
        reply["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ExtractError::OracleMalformedResponse("no completion content".to_string()))
    }
}

/// Extract with the deterministic engine, falling back to `oracle` when
/// the text carried no explicit time expression.
pub async fn extract_with_oracle(
    text: &str,
    ctx: &ReferenceContext,
    oracle: &dyn Oracle,
) -> Result<EventCandidate, ExtractError> {
    let local = engine::extract_inner(text, ctx)?;
    if local.explicit_time {
        return Ok(local.candidate);
    }

    tracing::debug!("no explicit time expression; consulting oracle");
    let user = format!("Extract event details from this text:\n\"{text}\"");
    let reply = oracle.complete(&system_prompt(ctx), &user).await?;

    let candidate = candidate_from_reply(&reply)?;
    candidate.validate().map_err(ExtractError::OracleMalformedResponse)?;
    Ok(candidate)
}

/// The rules the oracle must follow, anchored to the caller's context.
pub(crate) fn system_prompt(ctx: &ReferenceContext) -> String {
    format!(
        r#"CURRENT DATE AND TIME CONTEXT:
- Current datetime: {now}
- User timezone: {timezone}
- Today's date: {today}
- Tomorrow's date: {tomorrow}

You are an expert event parser that extracts structured calendar event data from natural language text.

Return ONLY a valid JSON object with these exact fields:
- "title": concise event title with date/time/location wording removed
- "startTime": ISO 8601 start datetime
- "endTime": ISO 8601 end datetime, or null when no duration is stated
- "location": physical or virtual location, empty string when none

RULES:
1. "in N minutes/hours" adds N to the exact current datetime above; "in an hour" adds 60 minutes; "soon" adds 30 minutes; "right now" is the current datetime.
2. "today" means {today} and "tomorrow" means {tomorrow}; never add days beyond what the text states.
3. Parse both ends of ranges like "2-3pm" or "from 2 to 4pm"; prefer the reading where the end is after the start.
4. Events with a date but no time start at 18:00. "all day" means 00:00 to 23:59.
5. If several time ranges appear, use the first one.

Return ONLY the JSON object, no explanations."#,
        now = format_datetime(&ctx.now),
        timezone = ctx.timezone,
        today = ctx.today,
        tomorrow = ctx.tomorrow,
    )
}

fn candidate_from_reply(reply: &str) -> Result<EventCandidate, ExtractError> {
    #[derive(serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Reply {
        title: Option<String>,
        start_time: Option<String>,
        end_time: Option<String>,
        location: Option<String>,
    }

    let json = strip_code_fences(reply);
    let reply: Reply =
        serde_json::from_str(json).map_err(|err| ExtractError::OracleMalformedResponse(err.to_string()))?;

    let start_raw = reply
        .start_time
        .ok_or_else(|| ExtractError::OracleMalformedResponse("missing startTime".to_string()))?;
    let start = parse_datetime_flex(&start_raw)
        .ok_or_else(|| ExtractError::OracleMalformedResponse(format!("unparseable startTime {start_raw:?}")))?;

    let end = match reply.end_time {
        Some(raw) if !raw.is_empty() && raw != "null" => Some(
            parse_datetime_flex(&raw)
                .ok_or_else(|| ExtractError::OracleMalformedResponse(format!("unparseable endTime {raw:?}")))?,
        ),
        _ => None,
    };

    let title = reply
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNTITLED_EVENT.to_string());

    Ok(EventCandidate { title, start, end, location: reply.location.unwrap_or_default() })
}

/// Models like to wrap JSON in markdown fences; strip them.
fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(inner) = trimmed.strip_prefix("```") else { return trimmed };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    struct CannedOracle(&'static str);

    #[async_trait]
    impl Oracle for CannedOracle {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, ExtractError> {
            Ok(self.0.to_string())
        }
    }

    struct UnreachableOracle;

    #[async_trait]
    impl Oracle for UnreachableOracle {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, ExtractError> {
            Err(ExtractError::OracleUnavailable("should not have been called".to_string()))
        }
    }

    struct TimeoutOracle;

    #[async_trait]
    impl Oracle for TimeoutOracle {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, ExtractError> {
            Err(ExtractError::OracleTimeout)
        }
    }

    fn ctx() -> ReferenceContext {
        let now = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap().and_hms_opt(9, 0, 0).unwrap();
        ReferenceContext::at(now, "UTC").unwrap()
    }

    #[tokio::test]
    async fn explicit_time_never_consults_the_oracle() {
        let event = extract_with_oracle("tomorrow 5pm standup", &ctx(), &UnreachableOracle).await.unwrap();
        assert_eq!(event.start, NaiveDate::from_ymd_opt(2025, 1, 7).unwrap().and_hms_opt(17, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn vague_text_uses_a_valid_oracle_reply() {
        let oracle = CannedOracle(
            r#"{"title": "coffee with dana", "startTime": "2025-01-06T10:30:00", "endTime": null, "location": "blue bottle"}"#,
        );
        let event = extract_with_oracle("grab coffee with dana sometime", &ctx(), &oracle).await.unwrap();
        assert_eq!(event.title, "coffee with dana");
        assert_eq!(event.location, "blue bottle");
        assert_eq!(event.end, None);
    }

    #[tokio::test]
    async fn fenced_reply_is_accepted() {
        let oracle = CannedOracle(
            "```json\n{\"title\": \"sync\", \"startTime\": \"2025-01-06T10:00:00\", \"endTime\": null, \"location\": \"\"}\n```",
        );
        let event = extract_with_oracle("catch up sometime", &ctx(), &oracle).await.unwrap();
        assert_eq!(event.title, "sync");
    }

    #[tokio::test]
    async fn backwards_range_from_oracle_is_rejected() {
        let oracle = CannedOracle(
            r#"{"title": "sync", "startTime": "2025-01-06T15:00:00", "endTime": "2025-01-06T14:00:00", "location": ""}"#,
        );
        let err = extract_with_oracle("catch up sometime", &ctx(), &oracle).await.unwrap_err();
        assert!(matches!(err, ExtractError::OracleMalformedResponse(_)));
    }

    #[tokio::test]
    async fn missing_start_time_is_rejected() {
        let oracle = CannedOracle(r#"{"title": "sync", "endTime": null, "location": ""}"#);
        let err = extract_with_oracle("catch up sometime", &ctx(), &oracle).await.unwrap_err();
        assert!(matches!(err, ExtractError::OracleMalformedResponse(_)));
    }

    #[tokio::test]
    async fn non_json_reply_is_rejected() {
        let oracle = CannedOracle("I could not find an event in that text.");
        let err = extract_with_oracle("catch up sometime", &ctx(), &oracle).await.unwrap_err();
        assert!(matches!(err, ExtractError::OracleMalformedResponse(_)));
    }

    #[tokio::test]
    async fn oracle_timeout_fails_the_extraction_atomically() {
        let err = extract_with_oracle("catch up sometime", &ctx(), &TimeoutOracle).await.unwrap_err();
        assert!(matches!(err, ExtractError::OracleTimeout));
    }

    #[tokio::test]
    async fn empty_input_fails_before_any_oracle_call() {
        let err = extract_with_oracle("", &ctx(), &UnreachableOracle).await.unwrap_err();
        assert!(matches!(err, ExtractError::EmptyInput));
    }

    #[test]
    fn prompt_carries_the_reference_dates() {
        let prompt = system_prompt(&ctx());
        assert!(prompt.contains("2025-01-06"));
        assert!(prompt.contains("2025-01-07"));
        assert!(prompt.contains("UTC"));
    }
}
