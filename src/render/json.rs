//! JSON rendering of conversion results.

use crate::convert::ConvertResult;
use crate::error::{Error, Result};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize a conversion result (content, metadata, assets, stats).
pub fn to_json(result: &ConvertResult, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(result),
        JsonFormat::Compact => serde_json::to_string(result),
    };

    json.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert;

    #[test]
    fn test_to_json_pretty() {
        let result = convert("---\ntitle: Test\n---\n![[a.png]]").unwrap();
        let json = to_json(&result, JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"title\": \"Test\""));
        assert!(json.contains("\"a.png\""));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let result = convert("Body").unwrap();
        let json = to_json(&result, JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains("\"metadata\":{}"));
    }
}
