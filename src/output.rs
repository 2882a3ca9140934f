use specs_browser::specs::Spec;

const TITLE_WIDTH: usize = 60;

/// Shorten `s` to at most `max` characters, marking the cut with "...".
pub fn truncate(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    return s.to_string();
  }
  if max <= 3 {
    return s.chars().take(max).collect();
  }
  let mut out: String = s.chars().take(max - 3).collect();
  out.push_str("...");
  out
}

pub fn format_spec_line(spec: &Spec) -> String {
  format!(
    "{:<10} {:<15} {:<14} {}  {}",
    spec.id,
    spec.status,
    truncate(&spec.team, 14),
    spec.google_doc_updated_at.format("%Y-%m-%d"),
    truncate(&spec.title, TITLE_WIDTH),
  )
}

/// Address of the current view, ready to paste into a browser.
pub fn shareable_url(web_url: &str, query: &str) -> String {
  if query.is_empty() {
    web_url.to_string()
  } else {
    format!("{}?{}", web_url, query)
  }
}

/// Footer naming the current view: a browser link when the catalog page
/// address is configured, otherwise just the query string.
pub fn view_footer(web_url: Option<&str>, query: &str) -> String {
  match web_url {
    Some(web_url) => format!("Link: {}", shareable_url(web_url, query)),
    None if query.is_empty() => "Query: (none)".to_string(),
    None => format!("Query: {}", query),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn test_truncate_counts_chars() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("abcdefghij", 8), "abcde...");
    assert_eq!(truncate("ÅÅÅÅÅÅ", 5), "ÅÅ...");
    assert_eq!(truncate("abcdef", 2), "ab");
  }

  #[test]
  fn test_format_spec_line() {
    let spec = Spec {
      id: "SV-0042".to_string(),
      title: "Single sign on".to_string(),
      authors: vec!["Ana".to_string()],
      team: "Server".to_string(),
      spec_type: "Implementation".to_string(),
      status: "Active".to_string(),
      google_doc_url: String::new(),
      google_doc_updated_at: chrono::Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap(),
      google_doc_id: None,
      google_doc_name: None,
      google_doc_created_at: None,
    };
    let line = format_spec_line(&spec);
    assert!(line.starts_with("SV-0042    Active "));
    assert!(line.ends_with("2024-03-09  Single sign on"));
  }

  #[test]
  fn test_shareable_url() {
    assert_eq!(shareable_url("https://s/", ""), "https://s/");
    assert_eq!(shareable_url("https://s/", "team=A"), "https://s/?team=A");
  }

  #[test]
  fn test_view_footer_uses_web_url_only_when_configured() {
    assert_eq!(
      view_footer(Some("https://intranet/specs"), "team=A"),
      "Link: https://intranet/specs?team=A"
    );
    assert_eq!(view_footer(None, "team=A"), "Query: team=A");
    assert_eq!(view_footer(None, ""), "Query: (none)");
  }
}
