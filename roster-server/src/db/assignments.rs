//! Assignment store operations
//!
//! The table is replaced wholesale on every sync; reads serve dashboards and
//! the reminder job.

use chrono::NaiveDate;
use shared::AssignmentType;
use shared::roster::{Assignment, AssignmentRecord};
use sqlx::{PgConnection, PgPool};

const SELECT_COLUMNS: &str = "id, assignment_date, assignment_type, location, role, \
                              member_name, notes, updated_at";

/// Remove every assignment row, returning how many were removed
pub async fn delete_all(conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM assignments").execute(conn).await?;
    Ok(result.rows_affected())
}

pub async fn insert_assignment(
    conn: &mut PgConnection,
    assignment: &AssignmentRecord,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO assignments (
            assignment_date, assignment_type, location, role,
            member_name, notes, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(assignment.date)
    .bind(assignment.kind.as_str())
    .bind(&assignment.location)
    .bind(&assignment.role)
    .bind(&assignment.member_name)
    .bind(&assignment.notes)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

/// Assignments with `from <= date < until`, optionally of one type
pub async fn list_between(
    pool: &PgPool,
    from: NaiveDate,
    until: NaiveDate,
    kind: Option<AssignmentType>,
) -> Result<Vec<Assignment>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {SELECT_COLUMNS}
        FROM assignments
        WHERE assignment_date >= $1
          AND assignment_date < $2
          AND ($3::TEXT IS NULL OR assignment_type = $3)
        ORDER BY assignment_date, assignment_type, member_name, id
        "#
    );
    sqlx::query_as(&sql)
        .bind(from)
        .bind(until)
        .bind(kind.map(|k| k.as_str()))
        .fetch_all(pool)
        .await
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<Assignment>, sqlx::Error> {
    let sql = format!("SELECT {SELECT_COLUMNS} FROM assignments ORDER BY id");
    sqlx::query_as(&sql).fetch_all(pool).await
}

/// One reminder to send: an assignment joined to its member's email
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ReminderTarget {
    pub member_name: String,
    pub email: String,
    pub assignment_date: NaiveDate,
    #[sqlx(try_from = "String")]
    pub assignment_type: AssignmentType,
    pub location: String,
    pub role: String,
    pub notes: Option<String>,
}

/// Assignments on `date` whose member has an email on file
pub async fn reminder_targets(
    pool: &PgPool,
    date: NaiveDate,
) -> Result<Vec<ReminderTarget>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT a.member_name, m.email, a.assignment_date, a.assignment_type,
               a.location, a.role, a.notes
        FROM assignments a
        JOIN members m ON m.name = a.member_name
        WHERE a.assignment_date = $1
          AND m.email IS NOT NULL
        ORDER BY a.assignment_type, a.member_name, a.id
        "#,
    )
    .bind(date)
    .fetch_all(pool)
    .await
}
