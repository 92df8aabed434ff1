use csv::{ByteRecord, ReaderBuilder};
use itertools::Itertools;
use log::{debug, warn};

use super::schema::{StaffDirectoryEntry, Stu415};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("There are no records to group")]
    EmptyInput,
    #[error("Malformed row at line {line}: found {found} columns, expected 11, 15 or 16")]
    MalformedRow { line: u64, found: usize },
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// The vendor export is not RFC 4180 clean: quotes inside unquoted fields are
/// taken literally and rows may differ in width.
fn reader(raw: &[u8]) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(raw.strip_prefix(BOM).unwrap_or(raw))
}

fn fields(record: &ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect_vec()
}

fn is_header(fields: &[String]) -> bool {
    fields.first().is_some_and(|first| {
        let first = first.trim().replace(' ', "").to_lowercase();
        first == "organizationname" || first == "studentname"
    })
}

/// Parses the STU415 report.
///
/// Columns are mapped by position. Both layouts the portal has produced are accepted:
/// - 15 columns, or 16 with a previously exported group id (dropped, it is recomputed),
/// - 11 columns without organization, school year, meeting days and pre-scheduled flag.
///
/// Permanent ids get `@{email_domain}` appended.
pub fn parse_stu415s(raw: &[u8], email_domain: &str) -> Result<Vec<Stu415>, ParseError> {
    let mut reader = reader(raw);
    let mut records = vec![];
    for (i, record) in reader.byte_records().enumerate() {
        let record = record?;
        let fields = fields(&record);
        if i == 0 && is_header(&fields) {
            debug!("Skipping the header row");
            continue;
        }
        let line = record.position().map_or(i as u64 + 1, |p| p.line());
        let stu415 = stu415_from_fields(&fields, email_domain).ok_or(ParseError::MalformedRow {
            line,
            found: fields.len(),
        })?;
        records.push(stu415);
    }
    Ok(records)
}

fn stu415_from_fields(fields: &[String], email_domain: &str) -> Option<Stu415> {
    let perm_id = |perm: &str| format!("{perm}@{email_domain}");
    let stu415 = match fields {
        [org, year, name, perm, gender, grade, term_name, per, term, section, course, meet_days, teacher, room, prescheduled]
        | [org, year, name, perm, gender, grade, term_name, per, term, section, course, meet_days, teacher, room, prescheduled, _] => {
            Stu415::builder()
                .organization_name(org)
                .school_year(year)
                .student_name(name)
                .perm_id(perm_id(perm))
                .gender(gender)
                .grade(grade)
                .term_name(term_name)
                .per(per)
                .term(term)
                .section_id(section)
                .course_id_and_title(course)
                .meet_days(meet_days)
                .teacher(teacher)
                .room(room)
                .prescheduled(prescheduled)
                .build()
        }
        [name, perm, gender, grade, term_name, per, term, section, course, teacher, room] => {
            Stu415::builder()
                .student_name(name)
                .perm_id(perm_id(perm))
                .gender(gender)
                .grade(grade)
                .term_name(term_name)
                .per(per)
                .term(term)
                .section_id(section)
                .course_id_and_title(course)
                .teacher(teacher)
                .room(room)
                .build()
        }
        _ => return None,
    };
    Some(stu415)
}

/// Parses the `staff_emails` query output: `email,name` per row.
///
/// Unreadable rows, rows with fewer than two columns and rows whose first
/// column is not an address (such as the header) are skipped.
pub fn parse_staff_directory(raw: &[u8]) -> Vec<StaffDirectoryEntry> {
    let mut reader = reader(raw);
    let mut entries = vec![];
    for record in reader.byte_records() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping an unreadable staff directory row: {e}");
                continue;
            }
        };
        match fields(&record).as_slice() {
            [email, name, ..] if email.contains('@') => entries.push(
                StaffDirectoryEntry::builder()
                    .email(email.trim())
                    .name(name.as_str())
                    .build(),
            ),
            _ => debug!("Skipping staff directory row {:?}", record.position()),
        }
    }
    entries
}
