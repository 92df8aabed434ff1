use derive_more::{AsRef, Display};
use serde::Serialize;

/// Session-scoped token the portal hands out after login.
/// Every job and status request has to carry it.
#[derive(Clone, PartialEq, Eq, Debug, AsRef, Display)]
#[as_ref(forward)]
pub struct FocusKey(String);
impl FocusKey {
    pub(crate) fn new(value: String) -> Option<Self> {
        (!value.is_empty()).then_some(Self(value))
    }
}

/// Identifier of a report job on the portal, in the canonical 36-character form.
#[derive(Clone, PartialEq, Eq, Hash, Debug, AsRef, Display, Serialize)]
#[as_ref(forward)]
pub struct JobGuid(String);
impl TryFrom<String> for JobGuid {
    type Error = String;

    fn try_from(value: String) -> Result<Self, String> {
        let well_formed = value.len() == 36
            && value.char_indices().all(|(i, c)| match i {
                8 | 13 | 18 | 23 => c == '-',
                _ => c.is_ascii_hexdigit(),
            });
        if well_formed {
            Ok(Self(value))
        } else {
            Err(value)
        }
    }
}

/// Extension of the generated artifact under `ReportOutput/`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ReportFormat {
    Csv,
    Txt,
}
