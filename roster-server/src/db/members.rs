//! Member store operations (natural key: name)

use shared::ContactMergePolicy;
use shared::roster::{Member, MemberRecord};
use sqlx::{PgConnection, PgPool};

/// Insert a member or update the existing row with the same name.
///
/// `updated_at` is always refreshed, even when nothing else changed.
pub async fn upsert_member(
    conn: &mut PgConnection,
    member: &MemberRecord,
    policy: ContactMergePolicy,
    now: i64,
) -> Result<(), sqlx::Error> {
    let sql = match policy {
        ContactMergePolicy::Overwrite => {
            r#"
            INSERT INTO members (name, email, phone, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name)
            DO UPDATE SET email = EXCLUDED.email,
                          phone = EXCLUDED.phone,
                          updated_at = EXCLUDED.updated_at
            "#
        }
        ContactMergePolicy::KeepExisting => {
            r#"
            INSERT INTO members (name, email, phone, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name)
            DO UPDATE SET email = COALESCE(EXCLUDED.email, members.email),
                          phone = COALESCE(EXCLUDED.phone, members.phone),
                          updated_at = EXCLUDED.updated_at
            "#
        }
    };

    sqlx::query(sql)
        .bind(&member.name)
        .bind(&member.email)
        .bind(&member.phone)
        .bind(now)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn list_members(pool: &PgPool) -> Result<Vec<Member>, sqlx::Error> {
    sqlx::query_as("SELECT name, email, phone, updated_at FROM members ORDER BY name")
        .fetch_all(pool)
        .await
}
