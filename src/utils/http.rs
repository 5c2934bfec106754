use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

/// Query parameters in caller order; `None` and `""` values are dropped.
pub type QueryParams<'a> = [(&'a str, Option<String>)];

/// Best-effort `message` field of a JSON error body.
pub fn error_message(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    match parsed.get("message")? {
        Value::Null => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

pub fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(|reason| reason.to_string())
        .unwrap_or_else(|| status.as_u16().to_string())
}

pub fn append_query(url: &mut Url, params: &QueryParams<'_>) {
    let present: Vec<(&str, &str)> = params
        .iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .filter(|value| !value.is_empty())
                .map(|value| (*key, value))
        })
        .collect();
    if present.is_empty() {
        return;
    }
    let mut pairs = url.query_pairs_mut();
    for (key, value) in present {
        pairs.append_pair(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://public-api.kiwify.com/v1/products").expect("url")
    }

    #[test]
    fn query_drops_absent_and_empty_values() {
        let mut url = base();
        append_query(
            &mut url,
            &[
                ("a", Some("1".to_string())),
                ("b", Some(String::new())),
                ("c", None),
            ],
        );
        assert_eq!(url.query(), Some("a=1"));
    }

    #[test]
    fn query_keeps_insertion_order() {
        let mut url = base();
        append_query(
            &mut url,
            &[
                ("page_size", Some("10".to_string())),
                ("end_date", Some("2024-02-01".to_string())),
                ("start_date", Some("2024-01-01".to_string())),
            ],
        );
        assert_eq!(
            url.query(),
            Some("page_size=10&end_date=2024-02-01&start_date=2024-01-01")
        );
    }

    #[test]
    fn query_is_omitted_when_everything_is_filtered() {
        let mut url = base();
        append_query(&mut url, &[("b", Some(String::new())), ("c", None)]);
        assert_eq!(url.as_str(), "https://public-api.kiwify.com/v1/products");
    }

    #[test]
    fn query_values_are_form_encoded() {
        let mut url = base();
        append_query(&mut url, &[("search", Some("ana maria&co".to_string()))]);
        assert_eq!(url.query(), Some("search=ana+maria%26co"));
    }

    #[test]
    fn error_message_reads_message_field() {
        assert_eq!(
            error_message(r#"{"message":"invalid client"}"#),
            Some("invalid client".to_string())
        );
        assert_eq!(error_message(r#"{"error":"x"}"#), None);
        assert_eq!(error_message("<html>oops</html>"), None);
        assert_eq!(error_message(""), None);
    }

    #[test]
    fn status_text_uses_reason_phrase() {
        assert_eq!(
            status_text(StatusCode::INTERNAL_SERVER_ERROR),
            "Internal Server Error"
        );
    }
}
