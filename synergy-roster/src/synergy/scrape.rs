//! Where the portal's markup is known. Everything else asks these extractors
//! for tokens and never looks at the raw HTML/XML itself.

use regex::Regex;
use scraper::{Html, Selector};
use synergy_roster_utils::{regex, selector};

use super::schema::JobGuid;

/// Pulls a single token out of a response body.
pub trait TokenExtractor: Sync {
    fn extract(&self, body: &str) -> Option<String>;
}

/// The first capture group.
impl TokenExtractor for Regex {
    fn extract(&self, body: &str) -> Option<String> {
        Some(self.captures(body)?.get(1)?.as_str().to_owned())
    }
}

/// The `value` attribute of the first matching element.
impl TokenExtractor for Selector {
    fn extract(&self, body: &str) -> Option<String> {
        Html::parse_document(body)
            .select(self)
            .next()?
            .value()
            .attr("value")
            .map(ToOwned::to_owned)
    }
}

pub fn view_state() -> &'static dyn TokenExtractor {
    selector!("input#__VIEWSTATE")
}

pub fn view_state_generator() -> &'static dyn TokenExtractor {
    selector!("input#__VIEWSTATEGENERATOR")
}

pub fn focus_key() -> &'static dyn TokenExtractor {
    regex!(r"ST\.RevFocusKey = '([^']+)'")
}

/// The job row of a freshly queued STU415 report.
pub fn report_row_guid() -> &'static dyn TokenExtractor {
    regex!(r#"(?s)<ROW GUID="([0-9A-Fa-f-]{36})".*?STU415"#)
}

/// The job created by a query uploaded through `ST_UploadFile.aspx`.
pub fn uploaded_query_guid() -> &'static dyn TokenExtractor {
    regex!(r"<REV_ELEMENT>([0-9A-Fa-f-]{36})</REV_ELEMENT>")
}

/// State `4` is the only state treated as terminal.
pub const FINISHED_STATE: &str = "4";

pub fn job_finished(body: &str, guid: &JobGuid) -> bool {
    body.contains(&format!(r#"<ROW GUID="{guid}" State="{FINISHED_STATE}""#))
}
