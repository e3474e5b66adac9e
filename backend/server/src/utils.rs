use axum::{
    body::Bytes,
    http::{HeaderMap, HeaderValue, header::AUTHORIZATION},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{AppError, REQUIRED_FILE_FIELDS};

#[derive(Deserialize)]
pub struct FileRequest {
    pub login: Option<String>,
    pub password: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub metod: Option<String>,
    #[serde(alias = "Number", default, deserialize_with = "string_or_number")]
    pub number: Option<String>,
}

// Document numbers sometimes arrive as JSON numbers.
fn string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// All four fields present and non-empty, passed on exactly as given.
pub struct FileQuery {
    pub login: String,
    pub password: String,
    pub metod: String,
    pub number: String,
}

pub fn get_file_query(body: &Bytes) -> Result<FileQuery, AppError> {
    let request: FileRequest = serde_json::from_slice(body)
        .map_err(|_| AppError::BadRequest(REQUIRED_FILE_FIELDS.to_string()))?;

    let required = |field: Option<String>| {
        field
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::BadRequest(REQUIRED_FILE_FIELDS.to_string()))
    };

    Ok(FileQuery {
        login: required(request.login)?,
        password: required(request.password)?,
        metod: required(request.metod)?,
        number: required(request.number)?,
    })
}

/// The base64 part of an inbound `Authorization: Basic ...` header.
pub fn get_basic_credential(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let (scheme, credential) = value.trim().split_once(' ').ok_or(AppError::Unauthorized)?;
    let credential = credential.trim();

    if !scheme.eq_ignore_ascii_case("basic") || credential.is_empty() {
        return Err(AppError::Unauthorized);
    }

    Ok(credential)
}

/// Login half of a Basic credential, for logs only.
pub fn decode_login(credential: &str) -> Option<String> {
    let decoded = STANDARD.decode(credential).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;

    decoded.split_once(':').map(|(login, _)| login.to_string())
}

pub fn default_content_disposition(metod: &str, number: &str) -> HeaderValue {
    let value = format!("attachment; filename=\"{metod}_{number}.pdf\"");

    HeaderValue::from_bytes(value.as_bytes())
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(authorization: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(authorization).unwrap());
        headers
    }

    #[test]
    fn test_file_query_number_alias() {
        let body = Bytes::from_static(
            br#"{"login":"order@x.com","password":"p","metod":"ER","Number":"000107984"}"#,
        );

        let query = get_file_query(&body).unwrap();
        assert_eq!(query.number, "000107984");
        assert_eq!(query.metod, "ER");
    }

    #[test]
    fn test_file_query_missing_or_empty() {
        for body in [
            r#"{"login":"a","password":"p","metod":"ER"}"#,
            r#"{"login":"a","password":"","metod":"ER","number":"1"}"#,
            r#"{"login":"a","password":"p","metod":"ER","number":null}"#,
            "not json",
            "",
        ] {
            assert!(matches!(
                get_file_query(&Bytes::from(body)),
                Err(AppError::BadRequest(message)) if message == REQUIRED_FILE_FIELDS
            ));
        }
    }

    #[test]
    fn test_file_query_only_requires_non_empty() {
        let body = Bytes::from_static(
            br#"{"login":" ","password":"p","metod":"ER","number":107984}"#,
        );

        let query = get_file_query(&body).unwrap();
        assert_eq!(query.login, " ");
        assert_eq!(query.number, "107984");
    }

    #[test]
    fn test_basic_credential() {
        assert_eq!(get_basic_credential(&headers("Basic dTpw")).unwrap(), "dTpw");
        assert_eq!(get_basic_credential(&headers("basic  dTpw ")).unwrap(), "dTpw");

        assert!(get_basic_credential(&HeaderMap::new()).is_err());
        assert!(get_basic_credential(&headers("Bearer dTpw")).is_err());
        assert!(get_basic_credential(&headers("Basic")).is_err());
        assert!(get_basic_credential(&headers("Basic ")).is_err());
    }

    #[test]
    fn test_decode_login() {
        assert_eq!(decode_login("dXNlcjpwYXNz").as_deref(), Some("user"));
        assert_eq!(decode_login("%%%"), None);
    }

    #[test]
    fn test_default_content_disposition() {
        let value = default_content_disposition("ЭР", "000107984");
        assert_eq!(
            value.as_bytes(),
            "attachment; filename=\"ЭР_000107984.pdf\"".as_bytes()
        );
    }
}
