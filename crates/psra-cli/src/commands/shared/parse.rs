use serde::de::DeserializeOwned;

/// Parse a `snake_case` enum value using serde-deserialization.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.replace('-', "_");
    let json = format!("\"{normalized}\"");
    serde_json::from_str(&json).map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

#[cfg(test)]
mod tests {
    use psra_core::enums::{IncidentStatus, SupportStatus};

    use super::parse_enum;

    #[test]
    fn parses_snake_case_enum() {
        let status: SupportStatus = parse_enum("approved", "status").expect("status should parse");
        assert_eq!(status, SupportStatus::Approved);
    }

    #[test]
    fn parses_hyphenated_alias() {
        let status: IncidentStatus =
            parse_enum("in-progress", "status").expect("status should parse");
        assert_eq!(status, IncidentStatus::InProgress);
    }

    #[test]
    fn errors_on_invalid_enum() {
        let err = parse_enum::<IncidentStatus>("done", "status").expect_err("should fail");
        assert!(err.to_string().contains("invalid status 'done'"));
    }
}
