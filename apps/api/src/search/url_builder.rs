//! Job Search URL Builder — turns a user's stored filter selections into a
//! ready-to-use search URL for a platform.
//!
//! Pure transformation: the caller loads the user's URL-eligible selections
//! and the platform's default (non-fillable) filter keys; dispatch is a
//! closed match on `Platform`, so an unknown platform never reaches a builder
//! (it fails parsing with `UnsupportedPlatform`).

use crate::errors::AppError;
use crate::models::job::Platform;

pub const LINKEDIN_JOBS_BASE_URL: &str = "https://www.linkedin.com/jobs/search/?";

/// One user selection already joined with its filter definition:
/// the query parameter key plus the chosen scalar and/or list values.
#[derive(Debug, Clone)]
pub struct UrlFilterParam {
    pub query_param: String,
    pub value: Option<String>,
    pub values: Vec<String>,
}

pub fn build_search_url(
    platform: Platform,
    user_filters: &[UrlFilterParam],
    default_params: &[String],
) -> Result<String, AppError> {
    match platform {
        Platform::Linkedin => Ok(linkedin_search_url(user_filters, default_params)),
    }
}

/// Scalar values are serialized as-is, lists as a JSON-encoded string.
/// Platform defaults are overlaid last as fixed `true` values and override
/// any user-set value for the same key.
fn linkedin_search_url(user_filters: &[UrlFilterParam], default_params: &[String]) -> String {
    let mut params: Vec<(String, String)> = Vec::new();

    for filter in user_filters {
        let rendered = match &filter.value {
            Some(v) if !v.is_empty() => Some(v.clone()),
            _ if !filter.values.is_empty() => {
                Some(serde_json::to_string(&filter.values).unwrap_or_default())
            }
            _ => None,
        };
        if let Some(v) = rendered {
            upsert(&mut params, &filter.query_param, v);
        }
    }

    for key in default_params {
        upsert(&mut params, key, "true".to_string());
    }

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in &params {
        serializer.append_pair(key, value);
    }

    format!("{LINKEDIN_JOBS_BASE_URL}{}", serializer.finish())
}

/// Keeps insertion order; a repeated key replaces the earlier value in place.
fn upsert(params: &mut Vec<(String, String)>, key: &str, value: String) {
    match params.iter_mut().find(|(k, _)| k == key) {
        Some(entry) => entry.1 = value,
        None => params.push((key.to_string(), value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(key: &str, value: &str) -> UrlFilterParam {
        UrlFilterParam {
            query_param: key.to_string(),
            value: Some(value.to_string()),
            values: vec![],
        }
    }

    fn multi(key: &str, values: &[&str]) -> UrlFilterParam {
        UrlFilterParam {
            query_param: key.to_string(),
            value: None,
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    fn decode_query(built: &str) -> Vec<(String, String)> {
        let query = built
            .strip_prefix(LINKEDIN_JOBS_BASE_URL)
            .expect("URL must start with the LinkedIn base");
        url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    #[test]
    fn test_list_values_are_json_encoded() {
        let built = build_search_url(
            Platform::Linkedin,
            &[multi("keywords", &["Data Analyst", "Data Engineer"])],
            &["f_AL".to_string()],
        )
        .unwrap();

        let params = decode_query(&built);
        assert!(params.contains(&(
            "keywords".to_string(),
            r#"["Data Analyst","Data Engineer"]"#.to_string()
        )));
        assert!(params.contains(&("f_AL".to_string(), "true".to_string())));
    }

    #[test]
    fn test_scalar_wins_over_list() {
        let mut f = multi("distance", &["10", "25"]);
        f.value = Some("25".to_string());
        let built = build_search_url(Platform::Linkedin, &[f], &[]).unwrap();
        assert_eq!(decode_query(&built), vec![("distance".to_string(), "25".to_string())]);
    }

    #[test]
    fn test_empty_selections_are_skipped() {
        let empty = UrlFilterParam {
            query_param: "location".to_string(),
            value: None,
            values: vec![],
        };
        let built = build_search_url(
            Platform::Linkedin,
            &[empty, scalar("keywords", "Engineer")],
            &[],
        )
        .unwrap();
        let params = decode_query(&built);
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].0, "keywords");
    }

    #[test]
    fn test_default_overrides_user_value_for_same_key() {
        let built = build_search_url(
            Platform::Linkedin,
            &[scalar("f_AL", "false"), scalar("keywords", "Engineer")],
            &["f_AL".to_string()],
        )
        .unwrap();
        let params = decode_query(&built);
        // overridden in place, not duplicated
        assert_eq!(
            params.iter().filter(|(k, _)| k == "f_AL").count(),
            1
        );
        assert!(params.contains(&("f_AL".to_string(), "true".to_string())));
    }

    #[test]
    fn test_values_are_url_encoded() {
        let built = build_search_url(
            Platform::Linkedin,
            &[scalar("location", "San Francisco, CA")],
            &[],
        )
        .unwrap();
        assert!(!built.contains("San Francisco, CA"));
        assert_eq!(
            decode_query(&built),
            vec![("location".to_string(), "San Francisco, CA".to_string())]
        );
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let built = build_search_url(
            Platform::Linkedin,
            &[scalar("a", "1"), scalar("b", "2")],
            &["c".to_string()],
        )
        .unwrap();
        let keys: Vec<String> = decode_query(&built).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }
}
