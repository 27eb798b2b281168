//! JSON bodies served by the mock server

use anyhow::anyhow;

/// Response bodies shipped with this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixture {
    /// `{"list": [...]}` with two elements
    GetFakesObjectResponse,
    /// Bare JSON array with two elements
    GetFakesListResponse,
    /// `{"code": "ERR-001", "message": "Error message"}`
    ErrorResponse,
    /// `{"code": "ERR-001", "data": {"message": "Error message", "stack": [...]}}`
    ErrorComplexResponse,
    /// Empty body
    EmptyFakeResponse,
    /// `{}`
    EmptyObjectFakeResponse,
}

impl Fixture {
    pub const ALL: [Fixture; 6] = [
        Fixture::GetFakesObjectResponse,
        Fixture::GetFakesListResponse,
        Fixture::ErrorResponse,
        Fixture::ErrorComplexResponse,
        Fixture::EmptyFakeResponse,
        Fixture::EmptyObjectFakeResponse,
    ];

    /// Path relative to the fixtures directory
    pub fn file_name(self) -> &'static str {
        match self {
            Fixture::GetFakesObjectResponse => "json/getFakesObjectResponse.json",
            Fixture::GetFakesListResponse => "json/getFakesListResponse.json",
            Fixture::ErrorResponse => "json/errorResponse.json",
            Fixture::ErrorComplexResponse => "json/errorComplexResponse.json",
            Fixture::EmptyFakeResponse => "json/emptyFakeResponse.json",
            Fixture::EmptyObjectFakeResponse => "json/emptyObjectFakeResponse.json",
        }
    }

    pub fn body(self) -> &'static str {
        match self {
            Fixture::GetFakesObjectResponse => {
                include_str!("../fixtures/json/getFakesObjectResponse.json")
            }
            Fixture::GetFakesListResponse => {
                include_str!("../fixtures/json/getFakesListResponse.json")
            }
            Fixture::ErrorResponse => include_str!("../fixtures/json/errorResponse.json"),
            Fixture::ErrorComplexResponse => {
                include_str!("../fixtures/json/errorComplexResponse.json")
            }
            Fixture::EmptyFakeResponse => include_str!("../fixtures/json/emptyFakeResponse.json"),
            Fixture::EmptyObjectFakeResponse => {
                include_str!("../fixtures/json/emptyObjectFakeResponse.json")
            }
        }
    }

    /// Look a fixture up by file name, e.g. `"json/errorResponse.json"`
    pub fn from_file_name(name: &str) -> anyhow::Result<Self> {
        Self::ALL
            .into_iter()
            .find(|fixture| fixture.file_name() == name)
            .ok_or_else(|| anyhow!("Unknown fixture '{}'", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_are_valid_json_or_empty() {
        for fixture in Fixture::ALL {
            let body = fixture.body();
            if fixture == Fixture::EmptyFakeResponse {
                assert!(body.trim().is_empty());
            } else {
                serde_json::from_str::<serde_json::Value>(body)
                    .unwrap_or_else(|e| panic!("{} is not valid JSON: {}", fixture.file_name(), e));
            }
        }
    }

    #[test]
    fn test_lookup_by_file_name() {
        assert_eq!(
            Fixture::from_file_name("json/errorResponse.json").unwrap(),
            Fixture::ErrorResponse
        );
        assert!(Fixture::from_file_name("json/missing.json").is_err());
    }
}
