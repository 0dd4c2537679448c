//! The `status` envelope every tool reply is wrapped in

use chrono::NaiveDate;
use invest_metrics::{Gap, Metric, NOT_AVAILABLE};
use invest_tools::{Result, ToolError};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Error,
    /// The tool is not configured; nothing went wrong
    Info,
}

/// A tool reply
///
/// The body's fields are flattened next to `status` (and `message`, when
/// present), so a reply reads `{"status": "success", "ticker": "AAPL", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply<T> {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub body: Option<T>,
}

impl<T> Reply<T> {
    pub fn success(body: T) -> Self {
        Self {
            status: Status::Success,
            message: None,
            body: Some(body),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: Some(message.into()),
            body: None,
        }
    }

    /// Error reply that still carries a degraded body
    pub fn error_with(body: T) -> Self {
        Self {
            status: Status::Error,
            message: None,
            body: Some(body),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            status: Status::Info,
            message: Some(message.into()),
            body: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn body(&self) -> Option<&T> {
        self.body.as_ref()
    }
}

impl<T: Serialize> Reply<T> {
    /// Render as the JSON handed back to the agent runtime
    pub fn into_value(self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| ToolError::ExecutionFailed(e.to_string()))
    }
}

/// A figure taken as-is from a provider
pub fn reported(value: Option<f64>) -> Metric {
    value.map_or(Metric::NotAvailable(Gap::NoData), Metric::Available)
}

/// Provider text, or `"N/A"`
pub fn text(value: Option<&str>) -> String {
    value
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

pub fn date_text(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| NOT_AVAILABLE.to_string(), |d| d.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Body {
        ticker: &'static str,
        pe_ratio: Metric,
    }

    #[test]
    fn test_success_flattens_body() {
        let reply = Reply::success(Body {
            ticker: "AAPL",
            pe_ratio: Metric::Available(30.0),
        });
        assert_eq!(
            reply.into_value().unwrap(),
            json!({"status": "success", "ticker": "AAPL", "pe_ratio": 30.0})
        );
    }

    #[test]
    fn test_error_has_message_only() {
        let reply: Reply<Body> = Reply::error("rate limited");
        assert!(!reply.is_success());
        assert_eq!(
            reply.into_value().unwrap(),
            json!({"status": "error", "message": "rate limited"})
        );
    }

    #[test]
    fn test_info_status() {
        let value = Reply::<Body>::info("not configured").into_value().unwrap();
        assert_eq!(value["status"], "info");
    }

    #[test]
    fn test_error_with_body_keeps_sentinels() {
        let reply = Reply::error_with(Body {
            ticker: "AAPL",
            pe_ratio: reported(None),
        });
        let value = reply.into_value().unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["pe_ratio"], "N/A");
    }

    #[test]
    fn test_text_helpers() {
        assert_eq!(text(Some("Technology")), "Technology");
        assert_eq!(text(Some("  ")), "N/A");
        assert_eq!(text(None), "N/A");
        assert_eq!(date_text(NaiveDate::from_ymd_opt(2024, 9, 28)), "2024-09-28");
        assert_eq!(date_text(None), "N/A");
    }
}
