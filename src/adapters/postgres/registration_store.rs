//! PostgreSQL implementation of RegistrationStore.
//!
//! The registration key is the table's primary key, which gives
//! `create_if_absent` its atomicity through `ON CONFLICT DO NOTHING`.
//! Group batches run inside one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    BookingId, GroupId, RegistrationKey, SubjectId, TicketId, Timestamp,
};
use crate::domain::registration::{
    Gender, MemberRole, PaymentStatus, Registration, RegistrationKind, SubjectProfile,
};
use crate::ports::{CreateOutcome, RegistrationStore, RegistrationUpdate, StoreError};

/// PostgreSQL implementation of the RegistrationStore port.
pub struct PostgresRegistrationStore {
    pool: PgPool,
}

impl PostgresRegistrationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a registration.
#[derive(Debug, sqlx::FromRow)]
struct RegistrationRow {
    key: String,
    subject_id: String,
    ticket_id: i64,
    kind: String,
    group_id: Option<Uuid>,
    member_role: Option<String>,
    booking_id: Option<String>,
    status: String,
    payment_url: String,
    name: String,
    email: String,
    phone: String,
    college: String,
    gender: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RegistrationRow> for Registration {
    type Error = StoreError;

    fn try_from(row: RegistrationRow) -> Result<Self, Self::Error> {
        let kind = match row.kind.as_str() {
            "solo" => RegistrationKind::Solo,
            "group_member" => {
                let group_id = row.group_id.ok_or_else(|| {
                    StoreError::Corrupted(format!("group member {} has no group_id", row.key))
                })?;
                let role = parse_role(row.member_role.as_deref().unwrap_or("member"))?;
                RegistrationKind::GroupMember {
                    group_id: GroupId::from_uuid(group_id),
                    role,
                }
            }
            other => {
                return Err(StoreError::Corrupted(format!(
                    "unknown registration kind '{}'",
                    other
                )))
            }
        };

        let ticket_id = u32::try_from(row.ticket_id)
            .map_err(|_| StoreError::Corrupted(format!("ticket_id {} out of range", row.ticket_id)))?;

        let booking_id = row
            .booking_id
            .map(BookingId::new)
            .transpose()
            .map_err(|e| StoreError::Corrupted(format!("invalid booking_id: {}", e)))?;

        Ok(Registration {
            key: RegistrationKey::from_raw(row.key),
            subject_id: SubjectId::new(row.subject_id)
                .map_err(|e| StoreError::Corrupted(format!("invalid subject_id: {}", e)))?,
            ticket_id: TicketId::new(ticket_id),
            kind,
            booking_id,
            status: parse_status(&row.status)?,
            payment_url: row.payment_url,
            profile: SubjectProfile {
                name: row.name,
                email: row.email,
                phone: row.phone,
                college: row.college,
                gender: parse_gender(&row.gender)?,
            },
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_status(s: &str) -> Result<PaymentStatus, StoreError> {
    s.parse()
        .map_err(|_| StoreError::Corrupted(format!("invalid status value: {}", s)))
}

fn parse_role(s: &str) -> Result<MemberRole, StoreError> {
    match s {
        "captain" => Ok(MemberRole::Captain),
        "vice-captain" => Ok(MemberRole::ViceCaptain),
        "member" => Ok(MemberRole::Member),
        other => Err(StoreError::Corrupted(format!(
            "invalid member role: {}",
            other
        ))),
    }
}

fn parse_gender(s: &str) -> Result<Gender, StoreError> {
    match s {
        "male" => Ok(Gender::Male),
        "female" => Ok(Gender::Female),
        "other" => Ok(Gender::Other),
        unknown => Err(StoreError::Corrupted(format!(
            "invalid gender value: {}",
            unknown
        ))),
    }
}

fn kind_to_string(kind: &RegistrationKind) -> &'static str {
    match kind {
        RegistrationKind::Solo => "solo",
        RegistrationKind::GroupMember { .. } => "group_member",
    }
}

fn role_of(kind: &RegistrationKind) -> Option<String> {
    match kind {
        RegistrationKind::Solo => None,
        RegistrationKind::GroupMember { role, .. } => Some(role.to_string()),
    }
}

fn db_error(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

const INSERT_SQL: &str = r#"
    INSERT INTO registrations (
        key, subject_id, ticket_id, kind, group_id, member_role, booking_id,
        status, payment_url, name, email, phone, college, gender,
        created_at, updated_at
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
"#;

fn bind_insert<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    registration: &'q Registration,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    query
        .bind(registration.key.as_str())
        .bind(registration.subject_id.as_str())
        .bind(registration.ticket_id.as_u32() as i64)
        .bind(kind_to_string(&registration.kind))
        .bind(registration.kind.group_id().map(|g| *g.as_uuid()))
        .bind(role_of(&registration.kind))
        .bind(registration.booking_id.as_ref().map(|b| b.as_str()))
        .bind(registration.status.as_str())
        .bind(&registration.payment_url)
        .bind(&registration.profile.name)
        .bind(&registration.profile.email)
        .bind(&registration.profile.phone)
        .bind(&registration.profile.college)
        .bind(registration.profile.gender.to_string())
        .bind(registration.created_at.as_datetime())
        .bind(registration.updated_at.as_datetime())
}

#[async_trait]
impl RegistrationStore for PostgresRegistrationStore {
    async fn create_if_absent(
        &self,
        registration: Registration,
    ) -> Result<CreateOutcome, StoreError> {
        let sql = format!("{} ON CONFLICT (key) DO NOTHING", INSERT_SQL);
        let result = bind_insert(sqlx::query(&sql), &registration)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 1 {
            return Ok(CreateOutcome::Created);
        }

        // Lost the conditional insert; surface the winner's record.
        let existing = self
            .find_by_key(&registration.key)
            .await?
            .ok_or_else(|| {
                StoreError::Database(format!(
                    "conflict on key {} but no row found",
                    registration.key
                ))
            })?;
        Ok(CreateOutcome::AlreadyExists(existing))
    }

    async fn batch_create(&self, registrations: Vec<Registration>) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        for registration in &registrations {
            bind_insert(sqlx::query(INSERT_SQL), registration)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)?;
        Ok(())
    }

    async fn update(
        &self,
        key: &RegistrationKey,
        update: &RegistrationUpdate,
    ) -> Result<Registration, StoreError> {
        let row: Option<RegistrationRow> = sqlx::query_as(
            r#"
            UPDATE registrations SET
                status = COALESCE($2, status),
                booking_id = COALESCE($3, booking_id),
                payment_url = COALESCE($4, payment_url),
                updated_at = NOW()
            WHERE key = $1
            RETURNING *
            "#,
        )
        .bind(key.as_str())
        .bind(update.status.map(|s| s.as_str()))
        .bind(update.booking_id.as_ref().map(|b| b.as_str()))
        .bind(update.payment_url.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        match row {
            Some(row) => row.try_into(),
            None => Err(StoreError::MissingRecord(key.clone())),
        }
    }

    async fn find_by_key(
        &self,
        key: &RegistrationKey,
    ) -> Result<Option<Registration>, StoreError> {
        let row: Option<RegistrationRow> =
            sqlx::query_as("SELECT * FROM registrations WHERE key = $1")
                .bind(key.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;

        row.map(Registration::try_from).transpose()
    }

    async fn find_by_booking_id(
        &self,
        booking_id: &BookingId,
    ) -> Result<Option<Registration>, StoreError> {
        let row: Option<RegistrationRow> =
            sqlx::query_as("SELECT * FROM registrations WHERE booking_id = $1")
                .bind(booking_id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;

        row.map(Registration::try_from).transpose()
    }

    async fn find_by_subject(
        &self,
        subject_id: &SubjectId,
    ) -> Result<Vec<Registration>, StoreError> {
        let rows: Vec<RegistrationRow> = sqlx::query_as(
            "SELECT * FROM registrations WHERE subject_id = $1 ORDER BY created_at DESC",
        )
        .bind(subject_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(Registration::try_from).collect()
    }

    async fn find_group_members(
        &self,
        group_id: GroupId,
    ) -> Result<Vec<Registration>, StoreError> {
        let rows: Vec<RegistrationRow> = sqlx::query_as(
            "SELECT * FROM registrations WHERE group_id = $1 ORDER BY created_at ASC, key ASC",
        )
        .bind(group_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(Registration::try_from).collect()
    }

    async fn delete(&self, key: &RegistrationKey) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM registrations WHERE key = $1")
            .bind(key.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }
}
