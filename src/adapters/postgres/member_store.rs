//! PostgreSQL implementation of MemberStore.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, ErrorCode, FamilyId, MemberId, MemberKey, Timestamp,
};
use crate::domain::member::{
    Biodata, FamilyLinks, Location, Member, MemberProfile, PersonName,
};
use crate::ports::{MemberCounts, MemberStore};

/// PostgreSQL implementation of MemberStore.
#[derive(Clone)]
pub struct PostgresMemberStore {
    pool: PgPool,
}

impl PostgresMemberStore {
    /// Creates a new PostgresMemberStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const MEMBER_COLUMNS: &str = r#"
    key, member_id, prefix, first_name, middle_name, last_name,
    gender, dob, marital_status, life_status,
    occupation, education, height, phone, email,
    state, district, taluka, village, address,
    photo_url, family_id, father, mother, spouse,
    is_primary, full_name, spouse_full_name, created_at, updated_at
"#;

#[async_trait]
impl MemberStore for PostgresMemberStore {
    async fn insert(&self, member: &Member) -> Result<(), DomainError> {
        let profile = member.profile();
        sqlx::query(&format!(
            r#"
            INSERT INTO members ({MEMBER_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18, $19, $20,
                    $21, $22, $23, $24, $25, $26, $27, $28, $29, $30)
            "#
        ))
        .bind(member.key().as_uuid())
        .bind(member.member_id().as_str())
        .bind(member.name().prefix())
        .bind(member.name().first())
        .bind(member.name().middle())
        .bind(member.name().last())
        .bind(member.gender().as_str())
        .bind(member.dob())
        .bind(member.marital_status().as_str())
        .bind(member.life_status().as_str())
        .bind(profile.biodata.occupation.as_deref())
        .bind(profile.biodata.education.as_deref())
        .bind(profile.biodata.height.as_deref())
        .bind(profile.biodata.phone.as_deref())
        .bind(profile.biodata.email.as_deref())
        .bind(profile.location.state.as_deref())
        .bind(profile.location.district.as_deref())
        .bind(profile.location.taluka.as_deref())
        .bind(profile.location.village.as_deref())
        .bind(profile.location.address.as_deref())
        .bind(profile.photo_url.as_deref())
        .bind(member.family_id().as_str())
        .bind(member.father().map(MemberKey::as_uuid))
        .bind(member.mother().map(MemberKey::as_uuid))
        .bind(member.spouse().map(MemberKey::as_uuid))
        .bind(member.is_primary())
        .bind(member.full_name())
        .bind(member.spouse_full_name())
        .bind(member.created_at().as_datetime())
        .bind(member.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(de)
                if de.kind() == sqlx::error::ErrorKind::UniqueViolation =>
            {
                DomainError::new(
                    ErrorCode::Conflict,
                    format!("Duplicate member id: {}", member.member_id()),
                )
            }
            _ => DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert member: {}", e),
            ),
        })?;

        Ok(())
    }

    async fn update(&self, member: &Member) -> Result<(), DomainError> {
        let profile = member.profile();
        let result = sqlx::query(
            r#"
            UPDATE members SET
                prefix = $2, first_name = $3, middle_name = $4, last_name = $5,
                gender = $6, dob = $7, marital_status = $8, life_status = $9,
                occupation = $10, education = $11, height = $12, phone = $13, email = $14,
                state = $15, district = $16, taluka = $17, village = $18, address = $19,
                photo_url = $20, family_id = $21, father = $22, mother = $23, spouse = $24,
                is_primary = $25, full_name = $26, spouse_full_name = $27, updated_at = $28
            WHERE key = $1
            "#,
        )
        .bind(member.key().as_uuid())
        .bind(member.name().prefix())
        .bind(member.name().first())
        .bind(member.name().middle())
        .bind(member.name().last())
        .bind(member.gender().as_str())
        .bind(member.dob())
        .bind(member.marital_status().as_str())
        .bind(member.life_status().as_str())
        .bind(profile.biodata.occupation.as_deref())
        .bind(profile.biodata.education.as_deref())
        .bind(profile.biodata.height.as_deref())
        .bind(profile.biodata.phone.as_deref())
        .bind(profile.biodata.email.as_deref())
        .bind(profile.location.state.as_deref())
        .bind(profile.location.district.as_deref())
        .bind(profile.location.taluka.as_deref())
        .bind(profile.location.village.as_deref())
        .bind(profile.location.address.as_deref())
        .bind(profile.photo_url.as_deref())
        .bind(member.family_id().as_str())
        .bind(member.father().map(MemberKey::as_uuid))
        .bind(member.mother().map(MemberKey::as_uuid))
        .bind(member.spouse().map(MemberKey::as_uuid))
        .bind(member.is_primary())
        .bind(member.full_name())
        .bind(member.spouse_full_name())
        .bind(member.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update member: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::MemberNotFound,
                format!("Member not found: {}", member.key()),
            ));
        }

        Ok(())
    }

    async fn delete(&self, key: &MemberKey) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM members WHERE key = $1")
            .bind(key.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to delete member: {}", e),
                )
            })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::MemberNotFound,
                format!("Member not found: {}", key),
            ));
        }

        Ok(())
    }

    async fn find_by_key(&self, key: &MemberKey) -> Result<Option<Member>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE key = $1"
        ))
        .bind(key.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(fetch_error)?;

        row.map(row_to_member).transpose()
    }

    async fn find_by_member_id(&self, id: &MemberId) -> Result<Option<Member>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE member_id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(fetch_error)?;

        row.map(row_to_member).transpose()
    }

    async fn find_by_keys(&self, keys: &[MemberKey]) -> Result<Vec<Member>, DomainError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<Uuid> = keys.iter().map(|k| *k.as_uuid()).collect();
        let rows = sqlx::query(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE key = ANY($1)"
        ))
        .bind(&uuids)
        .fetch_all(&self.pool)
        .await
        .map_err(fetch_error)?;

        rows.into_iter().map(row_to_member).collect()
    }

    async fn find_by_family(&self, family_id: &FamilyId) -> Result<Vec<Member>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE family_id = $1 ORDER BY created_at"
        ))
        .bind(family_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(fetch_error)?;

        rows.into_iter().map(row_to_member).collect()
    }

    async fn find_children_of(&self, parents: &[MemberKey]) -> Result<Vec<Member>, DomainError> {
        if parents.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<Uuid> = parents.iter().map(|k| *k.as_uuid()).collect();
        let rows = sqlx::query(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE father = ANY($1) OR mother = ANY($1)"
        ))
        .bind(&uuids)
        .fetch_all(&self.pool)
        .await
        .map_err(fetch_error)?;

        rows.into_iter().map(row_to_member).collect()
    }

    async fn find_child_named(
        &self,
        first: &str,
        last: &str,
        father: Option<&MemberKey>,
        mother: Option<&MemberKey>,
    ) -> Result<Option<Member>, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {MEMBER_COLUMNS} FROM members
            WHERE LOWER(first_name) = LOWER($1)
              AND LOWER(last_name) = LOWER($2)
              AND (($3::uuid IS NOT NULL AND father = $3)
                OR ($4::uuid IS NOT NULL AND mother = $4))
            LIMIT 1
            "#
        ))
        .bind(first)
        .bind(last)
        .bind(father.map(MemberKey::as_uuid))
        .bind(mother.map(MemberKey::as_uuid))
        .fetch_optional(&self.pool)
        .await
        .map_err(fetch_error)?;

        row.map(row_to_member).transpose()
    }

    async fn count_in_family(&self, family_id: &FamilyId) -> Result<u64, DomainError> {
        let result: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM members WHERE family_id = $1")
                .bind(family_id.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(fetch_error)?;

        Ok(result.0 as u64)
    }

    async fn max_member_sequence(&self) -> Result<Option<u32>, DomainError> {
        let result: (Option<i64>,) = sqlx::query_as(
            r#"
            SELECT MAX(CAST(SUBSTRING(member_id FROM 2) AS BIGINT))
            FROM members WHERE member_id ~ '^M[0-9]+$'
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(fetch_error)?;

        Ok(result.0.map(|n| n as u32))
    }

    async fn max_family_sequence(&self) -> Result<Option<u32>, DomainError> {
        let result: (Option<i64>,) = sqlx::query_as(
            r#"
            SELECT MAX(CAST(SUBSTRING(family_id FROM 2) AS BIGINT))
            FROM members WHERE family_id ~ '^F[0-9]+$'
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(fetch_error)?;

        Ok(result.0.map(|n| n as u32))
    }

    async fn member_counts(&self) -> Result<MemberCounts, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE gender = 'Male') AS male,
                COUNT(*) FILTER (WHERE gender = 'Female') AS female,
                COUNT(*) FILTER (WHERE marital_status = 'Married') AS married,
                COUNT(*) FILTER (WHERE gender = 'Male' AND marital_status = 'Single')
                    AS single_male,
                COUNT(*) FILTER (WHERE gender = 'Female' AND marital_status = 'Single')
                    AS single_female,
                COUNT(*) FILTER (WHERE is_primary) AS primary_members,
                COUNT(DISTINCT family_id) FILTER (WHERE family_id ~ '^F[0-9]+$') AS families
            FROM members
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(fetch_error)?;

        let get = |name: &str| -> Result<u64, DomainError> {
            let value: i64 = row.try_get(name).map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to get {}: {}", name, e),
                )
            })?;
            Ok(value as u64)
        };

        Ok(MemberCounts {
            total: get("total")?,
            male: get("male")?,
            female: get("female")?,
            married: get("married")?,
            single_male: get("single_male")?,
            single_female: get("single_female")?,
            primary: get("primary_members")?,
            families: get("families")?,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

fn fetch_error(e: sqlx::Error) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Failed to fetch member: {}", e),
    )
}

fn column_error(name: &str, e: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Failed to get {}: {}", name, e),
    )
}

fn row_to_member(row: sqlx::postgres::PgRow) -> Result<Member, DomainError> {
    let key: Uuid = row.try_get("key").map_err(|e| column_error("key", e))?;
    let member_id: String = row
        .try_get("member_id")
        .map_err(|e| column_error("member_id", e))?;
    let prefix: Option<String> = row.try_get("prefix").map_err(|e| column_error("prefix", e))?;
    let first_name: String = row
        .try_get("first_name")
        .map_err(|e| column_error("first_name", e))?;
    let middle_name: Option<String> = row
        .try_get("middle_name")
        .map_err(|e| column_error("middle_name", e))?;
    let last_name: String = row
        .try_get("last_name")
        .map_err(|e| column_error("last_name", e))?;
    let gender: String = row.try_get("gender").map_err(|e| column_error("gender", e))?;
    let dob: chrono::NaiveDate = row.try_get("dob").map_err(|e| column_error("dob", e))?;
    let marital_status: String = row
        .try_get("marital_status")
        .map_err(|e| column_error("marital_status", e))?;
    let life_status: String = row
        .try_get("life_status")
        .map_err(|e| column_error("life_status", e))?;
    let family_id: String = row
        .try_get("family_id")
        .map_err(|e| column_error("family_id", e))?;
    let father: Option<Uuid> = row.try_get("father").map_err(|e| column_error("father", e))?;
    let mother: Option<Uuid> = row.try_get("mother").map_err(|e| column_error("mother", e))?;
    let spouse: Option<Uuid> = row.try_get("spouse").map_err(|e| column_error("spouse", e))?;
    let is_primary: bool = row
        .try_get("is_primary")
        .map_err(|e| column_error("is_primary", e))?;
    let full_name: String = row
        .try_get("full_name")
        .map_err(|e| column_error("full_name", e))?;
    let spouse_full_name: Option<String> = row
        .try_get("spouse_full_name")
        .map_err(|e| column_error("spouse_full_name", e))?;
    let created_at: chrono::DateTime<chrono::Utc> = row
        .try_get("created_at")
        .map_err(|e| column_error("created_at", e))?;
    let updated_at: chrono::DateTime<chrono::Utc> = row
        .try_get("updated_at")
        .map_err(|e| column_error("updated_at", e))?;

    let text = |name: &str| -> Result<Option<String>, DomainError> {
        row.try_get(name).map_err(|e| column_error(name, e))
    };

    let profile = MemberProfile {
        name: PersonName::new(
            prefix.as_deref(),
            &first_name,
            middle_name.as_deref(),
            &last_name,
        )
        .map_err(|e| column_error("name", e))?,
        gender: gender.parse().map_err(|e| column_error("gender", e))?,
        dob,
        marital_status: marital_status
            .parse()
            .map_err(|e| column_error("marital_status", e))?,
        life_status: life_status
            .parse()
            .map_err(|e| column_error("life_status", e))?,
        biodata: Biodata {
            occupation: text("occupation")?,
            education: text("education")?,
            height: text("height")?,
            phone: text("phone")?,
            email: text("email")?,
        },
        location: Location {
            state: text("state")?,
            district: text("district")?,
            taluka: text("taluka")?,
            village: text("village")?,
            address: text("address")?,
        },
        photo_url: text("photo_url")?,
    };

    Ok(Member::reconstitute(
        MemberKey::from_uuid(key),
        MemberId::parse(&member_id).map_err(|e| column_error("member_id", e))?,
        FamilyId::parse(&family_id).map_err(|e| column_error("family_id", e))?,
        profile,
        FamilyLinks {
            father: father.map(MemberKey::from_uuid),
            mother: mother.map(MemberKey::from_uuid),
            spouse: spouse.map(MemberKey::from_uuid),
        },
        is_primary,
        full_name,
        spouse_full_name,
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
    ))
}
