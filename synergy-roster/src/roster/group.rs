use std::collections::{BTreeMap, HashMap};

use log::debug;

use super::{
    parser::ParseError,
    schema::{GroupId, Roster, StaffDirectoryEntry, Stu415},
};

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1 (multiply, then xor).
pub fn fnv1_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| {
        hash.wrapping_mul(FNV_PRIME) ^ u32::from(byte)
    })
}

impl GroupId {
    /// Hex digest of the plain concatenation of the four fields.
    /// Ids already stored by earlier runs depend on this exact format.
    pub fn of(per: &str, course_id_and_title: &str, section_id: &str, term: &str) -> Self {
        let key = [per, course_id_and_title, section_id, term].concat();
        format!("{:08x}", fnv1_32(key.as_bytes())).into()
    }
}

/// Assigns a freshly computed group id to every record.
pub fn compute_group_ids(records: &mut [Stu415]) -> Result<(), ParseError> {
    if records.is_empty() {
        return Err(ParseError::EmptyInput);
    }
    for record in records.iter_mut() {
        let id = GroupId::of(
            record.per(),
            record.course_id_and_title(),
            record.section_id(),
            record.term(),
        );
        record.set_group_id(id);
    }
    Ok(())
}

/// Replaces teacher display names with their lowercased email addresses.
/// Names missing from the directory are kept as they are.
pub fn reconcile_teacher_emails(records: &mut [Stu415], directory: &[StaffDirectoryEntry]) {
    let emails: HashMap<&str, String> = directory
        .iter()
        .map(|entry| (entry.name().as_str(), entry.email().to_lowercase()))
        .collect();
    let mut unmatched = 0;
    for record in records.iter_mut() {
        match emails.get(record.teacher().as_str()) {
            Some(email) => record.set_teacher(email.clone()),
            None => unmatched += 1,
        }
    }
    debug!("{unmatched} records kept a teacher name without a directory entry");
}

fn group_by<K: Ord>(records: &[Stu415], key: impl Fn(&Stu415) -> K) -> BTreeMap<K, Vec<Stu415>> {
    let mut groups = BTreeMap::<_, Vec<_>>::new();
    for record in records {
        groups.entry(key(record)).or_default().push(record.clone());
    }
    groups
}

/// One roster per period, ordered by period.
pub fn rosters_by_period(records: &[Stu415]) -> Vec<Roster> {
    group_by(records, |record| record.per().clone())
        .into_values()
        .filter_map(Roster::from_students)
        .collect()
}

/// One class per group id, ordered by id. Records without an id are left out.
pub fn classes_by_group_id(records: &[Stu415]) -> Vec<Roster> {
    group_by(records, |record| record.group_id().clone())
        .into_iter()
        .filter(|(id, _)| id.is_some())
        .filter_map(|(_, students)| Roster::from_students(students))
        .collect()
}

pub fn by_course(records: &[Stu415]) -> BTreeMap<String, Vec<Stu415>> {
    group_by(records, |record| record.course_id_and_title().clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, per: &str, course: &str, section: &str, term: &str, teacher: &str) -> Stu415 {
        Stu415::builder()
            .student_name(name)
            .perm_id(format!("{name}@aps.edu"))
            .per(per)
            .term(term)
            .section_id(section)
            .course_id_and_title(course)
            .teacher(teacher)
            .build()
    }

    #[test]
    fn fnv1_known_values() {
        assert_eq!(fnv1_32(b""), 0x811c9dc5);
        assert_eq!(fnv1_32(b"a"), 0x050c5d7e);
    }

    #[test]
    fn group_id_is_hex_of_concatenation() {
        assert_eq!(
            GroupId::of("3", "101-Algebra", "SEC1", "T1").to_string(),
            "06dddaf6"
        );
    }

    #[test]
    fn identical_tuples_share_an_id() {
        let mut records = vec![
            record("a", "3", "101-Algebra", "SEC1", "T1", "Smith"),
            record("b", "3", "101-Algebra", "SEC1", "T1", "Smith"),
            record("c", "4", "101-Algebra", "SEC1", "T1", "Smith"),
            record("d", "3", "102-Geometry", "SEC1", "T1", "Smith"),
            record("e", "3", "101-Algebra", "SEC2", "T1", "Smith"),
            record("f", "3", "101-Algebra", "SEC1", "T2", "Smith"),
        ];
        compute_group_ids(&mut records).unwrap();
        let ids = records
            .iter()
            .map(|record| record.group_id().clone().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(ids[0], ids[1]);
        for other in &ids[2..] {
            assert_ne!(&ids[0], other);
        }
    }

    #[test]
    fn ids_are_recomputed() {
        let mut records = vec![record("a", "3", "101-Algebra", "SEC1", "T1", "Smith")];
        records[0].set_group_id("stale".to_owned().into());
        compute_group_ids(&mut records).unwrap();
        assert_eq!(records[0].group_id().as_ref().unwrap().to_string(), "06dddaf6");
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(
            compute_group_ids(&mut []),
            Err(ParseError::EmptyInput)
        ));
    }

    #[test]
    fn teacher_names_become_emails() {
        let directory = [StaffDirectoryEntry::builder()
            .email("Alice@X.edu")
            .name("Alice Smith")
            .build()];
        let mut records = vec![
            record("a", "1", "c", "s", "t", "Alice Smith"),
            record("b", "1", "c", "s", "t", "Bob Jones"),
        ];
        reconcile_teacher_emails(&mut records, &directory);
        assert_eq!(records[0].teacher(), "alice@x.edu");
        assert_eq!(records[1].teacher(), "Bob Jones");
    }

    #[test]
    fn rosters_take_their_title_from_the_first_member() {
        let mut records = vec![
            record("a", "3", "101-Algebra", "SEC1", "T1", "smith@aps.edu"),
            record("b", "1", "201-Biology", "SEC4", "T1", "smith@aps.edu"),
            record("c", "3", "101-Algebra", "SEC1", "T1", "smith@aps.edu"),
        ];
        compute_group_ids(&mut records).unwrap();
        let rosters = rosters_by_period(&records);
        assert_eq!(rosters.len(), 2);
        assert_eq!(rosters[0].per(), "1");
        assert_eq!(rosters[0].title(), "201-Biology");
        assert_eq!(rosters[1].students().len(), 2);
        assert_eq!(
            rosters[1].id().as_ref().map(ToString::to_string).as_deref(),
            Some("06dddaf6")
        );

        let classes = classes_by_group_id(&records);
        assert_eq!(classes.len(), 2);
        assert!(classes.iter().all(|class| class.id().is_some()));

        let courses = by_course(&records);
        assert_eq!(courses["101-Algebra"].len(), 2);
        assert_eq!(courses["201-Biology"].len(), 1);
    }

    #[test]
    fn classes_skip_records_without_an_id() {
        let records = vec![record("a", "3", "101-Algebra", "SEC1", "T1", "Smith")];
        assert!(classes_by_group_id(&records).is_empty());
        assert_eq!(rosters_by_period(&records).len(), 1);
    }
}
