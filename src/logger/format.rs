//! Access log format module
//!
//! Formats one request/response record as:
//! - `combined` (Apache/Nginx combined format)
//! - `common` (Common Log Format)
//! - `json` (structured, one object per line)

use chrono::Local;

/// Access log format selected in the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLogFormat {
    Combined,
    Common,
    Json,
}

impl AccessLogFormat {
    /// Parse the configured format name; unknown names fall back to
    /// `combined` with a warning.
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "combined" => Self::Combined,
            "common" => Self::Common,
            "json" => Self::Json,
            other => {
                crate::logger::log_warning(&format!(
                    "Unknown access log format '{other}', using combined"
                ));
                Self::Combined
            }
        }
    }
}

/// One request/response record of the access log
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    /// Client IP address
    pub remote_addr: String,
    /// Request timestamp
    pub time: chrono::DateTime<Local>,
    /// HTTP method
    pub method: String,
    /// Request path
    pub path: String,
    /// Query string without the leading `?`
    pub query: Option<String>,
    /// HTTP version (1.0, 1.1, 2)
    pub http_version: String,
    /// Response status code
    pub status: u16,
    /// Response body size in bytes
    pub body_bytes: usize,
    /// Referer header
    pub referer: Option<String>,
    /// User-Agent header
    pub user_agent: Option<String>,
    /// Request processing time in microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Format the entry in the given format
    pub fn format(&self, format: AccessLogFormat) -> String {
        match format {
            AccessLogFormat::Combined => self.format_combined(),
            AccessLogFormat::Common => self.format_common(),
            AccessLogFormat::Json => self.format_json(),
        }
    }

    /// `$remote_addr - - [$time] "$request" $status $bytes "$referer" "$user_agent"`
    fn format_combined(&self) -> String {
        format!(
            "{} \"{}\" \"{}\"",
            self.format_common(),
            self.referer.as_deref().unwrap_or("-"),
            self.user_agent.as_deref().unwrap_or("-"),
        )
    }

    /// `$remote_addr - - [$time] "$request" $status $bytes`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{} {}{} HTTP/{}\" {} {}",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.path,
            self.query
                .as_ref()
                .map(|q| format!("?{q}"))
                .unwrap_or_default(),
            self.http_version,
            self.status,
            self.body_bytes,
        )
    }

    /// One JSON object per line
    fn format_json(&self) -> String {
        serde_json::json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "query": self.query,
            "http_version": self.http_version,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "referer": self.referer,
            "user_agent": self.user_agent,
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_entry() -> AccessLogEntry {
        AccessLogEntry {
            remote_addr: "192.168.1.1".to_string(),
            time: Local::now(),
            method: "GET".to_string(),
            path: "/about".to_string(),
            query: Some("lang=de".to_string()),
            http_version: "1.1".to_string(),
            status: 200,
            body_bytes: 1234,
            referer: Some("https://example.com".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
            request_time_us: 1500,
        }
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(AccessLogFormat::parse("combined"), AccessLogFormat::Combined);
        assert_eq!(AccessLogFormat::parse("COMMON"), AccessLogFormat::Common);
        assert_eq!(AccessLogFormat::parse("json"), AccessLogFormat::Json);
        // unknown names fall back rather than fail
        assert_eq!(AccessLogFormat::parse("xml"), AccessLogFormat::Combined);
    }

    #[test]
    fn test_format_combined() {
        let log = create_test_entry().format(AccessLogFormat::Combined);
        assert!(log.contains("192.168.1.1"));
        assert!(log.contains("GET /about?lang=de HTTP/1.1"));
        assert!(log.contains("200 1234"));
        assert!(log.contains("https://example.com"));
        assert!(log.contains("Mozilla/5.0"));
    }

    #[test]
    fn test_format_common() {
        let log = create_test_entry().format(AccessLogFormat::Common);
        assert!(log.contains("GET /about?lang=de HTTP/1.1"));
        assert!(log.contains("200 1234"));
        // common format carries no referer/user-agent
        assert!(!log.contains("https://example.com"));
    }

    #[test]
    fn test_format_json() {
        let log = create_test_entry().format(AccessLogFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&log).unwrap();
        assert_eq!(parsed["remote_addr"], "192.168.1.1");
        assert_eq!(parsed["status"], 200);
        assert_eq!(parsed["body_bytes"], 1234);
        assert_eq!(parsed["query"], "lang=de");
    }

    #[test]
    fn test_json_nulls_absent_headers() {
        let mut entry = create_test_entry();
        entry.query = None;
        entry.referer = None;
        let parsed: serde_json::Value =
            serde_json::from_str(&entry.format(AccessLogFormat::Json)).unwrap();
        assert!(parsed["query"].is_null());
        assert!(parsed["referer"].is_null());
    }
}
