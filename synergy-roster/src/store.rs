//! Local SQLite copy of the latest rosters and of the classes synced to Classroom.

use std::path::Path;

use anyhow::Context;
use classroom_api::schema::CourseId;
use getset::{CopyGetters, Getters};
use log::info;
use rusqlite::{params, Connection, Row, Transaction};
use serde::Serialize;
use typed_builder::TypedBuilder;

use crate::roster::{GroupId, StaffDirectoryEntry, Stu415};

/// A roster group that has been turned into a Classroom course.
#[derive(Clone, PartialEq, Eq, Debug, TypedBuilder, Getters, CopyGetters, Serialize)]
pub struct SyncClass {
    #[getset(get = "pub")]
    course_id: CourseId,
    #[getset(get = "pub")]
    group_id: GroupId,
    #[builder(default, setter(into))]
    #[getset(get = "pub")]
    per: String,
    #[builder(default, setter(into))]
    #[getset(get = "pub")]
    term: String,
    #[builder(setter(into))]
    #[getset(get = "pub")]
    name: String,
    #[builder(default, setter(into))]
    #[getset(get = "pub")]
    course_id_and_title: String,
    #[builder(default, setter(into))]
    #[getset(get = "pub")]
    description: String,
    #[builder(setter(into))]
    #[getset(get = "pub")]
    teacher: String,
    #[builder(default = true)]
    #[getset(get_copy = "pub")]
    is_active: bool,
}

pub trait RosterStore {
    fn create_schema(&self) -> anyhow::Result<()>;

    /// Swaps the whole enrollment table for `records`.
    /// Either every record is stored or the previous contents stay untouched.
    fn replace_enrollment_records(&mut self, records: &[Stu415]) -> anyhow::Result<()>;
    fn insert_enrollment_records(&mut self, records: &[Stu415]) -> anyhow::Result<()>;
    /// Stores the directory of the current run in place of the previous one.
    fn insert_staff_directory(&mut self, entries: &[StaffDirectoryEntry]) -> anyhow::Result<()>;
    fn query_by_teacher(&self, email: &str) -> anyhow::Result<Vec<Stu415>>;
    fn query_by_teacher_period(&self, email: &str, per: &str) -> anyhow::Result<Vec<Stu415>>;
    fn query_by_group_id(&self, group_id: &GroupId) -> anyhow::Result<Vec<Stu415>>;

    fn insert_sync_class(&self, class: &SyncClass) -> anyhow::Result<()>;
    fn sync_classes_by_teacher(&self, email: &str) -> anyhow::Result<Vec<SyncClass>>;
    fn sync_class_by_course_id(&self, course_id: &CourseId) -> anyhow::Result<Option<SyncClass>>;
    fn inactivate_sync_class(&self, course_id: &CourseId) -> anyhow::Result<()>;
}

const CREATE_STU415: &str = "CREATE TABLE IF NOT EXISTS stu415 (
    organization_name TEXT NOT NULL,
    school_year TEXT NOT NULL,
    student_name TEXT NOT NULL,
    perm_id TEXT NOT NULL,
    gender TEXT NOT NULL,
    grade TEXT NOT NULL,
    term_name TEXT NOT NULL,
    per TEXT NOT NULL,
    term TEXT NOT NULL,
    section_id TEXT NOT NULL,
    course_id_and_title TEXT NOT NULL,
    meet_days TEXT NOT NULL,
    teacher TEXT NOT NULL,
    room TEXT NOT NULL,
    prescheduled TEXT NOT NULL,
    group_id TEXT
)";
const CREATE_STAFF: &str = "CREATE TABLE IF NOT EXISTS staff (
    name TEXT NOT NULL,
    email TEXT NOT NULL
)";
const CREATE_SYNC_CLASSES: &str = "CREATE TABLE IF NOT EXISTS sync_classes (
    course_id TEXT PRIMARY KEY,
    group_id TEXT NOT NULL,
    per TEXT NOT NULL,
    term TEXT NOT NULL,
    name TEXT NOT NULL,
    course_id_and_title TEXT NOT NULL,
    description TEXT NOT NULL,
    teacher TEXT NOT NULL,
    is_active BOOLEAN NOT NULL
)";

const STU415_COLUMNS: &str = "organization_name, school_year, student_name, perm_id, gender, grade, term_name, per, term, section_id, course_id_and_title, meet_days, teacher, room, prescheduled, group_id";
const SYNC_CLASS_COLUMNS: &str =
    "course_id, group_id, per, term, name, course_id_and_title, description, teacher, is_active";

fn row_to_stu415(row: &Row) -> rusqlite::Result<Stu415> {
    let group_id: Option<String> = row.get("group_id")?;
    Ok(Stu415::builder()
        .organization_name(row.get::<_, String>("organization_name")?)
        .school_year(row.get::<_, String>("school_year")?)
        .student_name(row.get::<_, String>("student_name")?)
        .perm_id(row.get::<_, String>("perm_id")?)
        .gender(row.get::<_, String>("gender")?)
        .grade(row.get::<_, String>("grade")?)
        .term_name(row.get::<_, String>("term_name")?)
        .per(row.get::<_, String>("per")?)
        .term(row.get::<_, String>("term")?)
        .section_id(row.get::<_, String>("section_id")?)
        .course_id_and_title(row.get::<_, String>("course_id_and_title")?)
        .meet_days(row.get::<_, String>("meet_days")?)
        .teacher(row.get::<_, String>("teacher")?)
        .room(row.get::<_, String>("room")?)
        .prescheduled(row.get::<_, String>("prescheduled")?)
        .group_id(group_id.map(GroupId::from))
        .build())
}

fn row_to_sync_class(row: &Row) -> rusqlite::Result<SyncClass> {
    Ok(SyncClass::builder()
        .course_id(CourseId::from(row.get::<_, String>("course_id")?))
        .group_id(GroupId::from(row.get::<_, String>("group_id")?))
        .per(row.get::<_, String>("per")?)
        .term(row.get::<_, String>("term")?)
        .name(row.get::<_, String>("name")?)
        .course_id_and_title(row.get::<_, String>("course_id_and_title")?)
        .description(row.get::<_, String>("description")?)
        .teacher(row.get::<_, String>("teacher")?)
        .is_active(row.get("is_active")?)
        .build())
}

fn insert_stu415s(tx: &Transaction, records: &[Stu415]) -> rusqlite::Result<()> {
    let mut stmt = tx.prepare(&format!(
        "INSERT INTO stu415 ({STU415_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
    ))?;
    for s in records {
        stmt.execute(params![
            s.organization_name(),
            s.school_year(),
            s.student_name(),
            s.perm_id(),
            s.gender(),
            s.grade(),
            s.term_name(),
            s.per(),
            s.term(),
            s.section_id(),
            s.course_id_and_title(),
            s.meet_days(),
            s.teacher(),
            s.room(),
            s.prescheduled(),
            s.group_id().as_ref().map(|id| id.to_string()),
        ])?;
    }
    Ok(())
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database file and makes sure the tables exist.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs_err::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open the database at {path:?}"))?;
        let store = Self { conn };
        store.create_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.create_schema()?;
        Ok(store)
    }

    fn query_stu415s(
        &self,
        condition: &str,
        params: impl rusqlite::Params,
    ) -> anyhow::Result<Vec<Stu415>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {STU415_COLUMNS} FROM stu415 WHERE {condition} ORDER BY per, student_name"
        ))?;
        let mut rows = stmt.query(params)?;
        let mut records = vec![];
        while let Some(row) = rows.next()? {
            records.push(row_to_stu415(row)?);
        }
        Ok(records)
    }
}

impl RosterStore for SqliteStore {
    fn create_schema(&self) -> anyhow::Result<()> {
        for sql in [CREATE_STU415, CREATE_STAFF, CREATE_SYNC_CLASSES] {
            self.conn.execute(sql, [])?;
        }
        Ok(())
    }

    fn replace_enrollment_records(&mut self, records: &[Stu415]) -> anyhow::Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DROP TABLE IF EXISTS stu415", [])?;
        tx.execute(CREATE_STU415, [])?;
        insert_stu415s(&tx, records)?;
        tx.commit()
            .context("Failed to commit the new enrollment records")?;
        info!("Replaced the enrollment table with {} records.", records.len());
        Ok(())
    }

    fn insert_enrollment_records(&mut self, records: &[Stu415]) -> anyhow::Result<()> {
        let tx = self.conn.transaction()?;
        insert_stu415s(&tx, records)?;
        tx.commit()?;
        Ok(())
    }

    fn insert_staff_directory(&mut self, entries: &[StaffDirectoryEntry]) -> anyhow::Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM staff", [])?;
        {
            let mut stmt = tx.prepare("INSERT INTO staff (name, email) VALUES (?1, ?2)")?;
            for entry in entries {
                stmt.execute(params![entry.name(), entry.email()])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn query_by_teacher(&self, email: &str) -> anyhow::Result<Vec<Stu415>> {
        self.query_stu415s("teacher = ?1", params![email])
    }

    fn query_by_teacher_period(&self, email: &str, per: &str) -> anyhow::Result<Vec<Stu415>> {
        self.query_stu415s("teacher = ?1 AND per = ?2", params![email, per])
    }

    fn query_by_group_id(&self, group_id: &GroupId) -> anyhow::Result<Vec<Stu415>> {
        self.query_stu415s("group_id = ?1", params![group_id.to_string()])
    }

    fn insert_sync_class(&self, class: &SyncClass) -> anyhow::Result<()> {
        self.conn
            .execute(
                &format!(
                    "INSERT INTO sync_classes ({SYNC_CLASS_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
                ),
                params![
                    class.course_id().to_string(),
                    class.group_id().to_string(),
                    class.per(),
                    class.term(),
                    class.name(),
                    class.course_id_and_title(),
                    class.description(),
                    class.teacher(),
                    class.is_active(),
                ],
            )
            .with_context(|| format!("Failed to record sync class {}", class.course_id()))?;
        Ok(())
    }

    fn sync_classes_by_teacher(&self, email: &str) -> anyhow::Result<Vec<SyncClass>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SYNC_CLASS_COLUMNS} FROM sync_classes WHERE teacher = ?1 ORDER BY per"
        ))?;
        let mut rows = stmt.query(params![email])?;
        let mut classes = vec![];
        while let Some(row) = rows.next()? {
            classes.push(row_to_sync_class(row)?);
        }
        Ok(classes)
    }

    fn sync_class_by_course_id(&self, course_id: &CourseId) -> anyhow::Result<Option<SyncClass>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SYNC_CLASS_COLUMNS} FROM sync_classes WHERE course_id = ?1"
        ))?;
        let mut rows = stmt.query(params![course_id.to_string()])?;
        let class = match rows.next()? {
            Some(row) => Some(row_to_sync_class(row)?),
            None => None,
        };
        Ok(class)
    }

    fn inactivate_sync_class(&self, course_id: &CourseId) -> anyhow::Result<()> {
        let updated = self.conn.execute(
            "UPDATE sync_classes SET is_active = 0 WHERE course_id = ?1",
            params![course_id.to_string()],
        )?;
        if updated == 0 {
            anyhow::bail!("No sync class for course {course_id}");
        }
        Ok(())
    }
}
