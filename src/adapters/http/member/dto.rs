//! HTTP DTOs for member endpoints.
//!
//! The wire shape is the flat legacy payload: name parts, spouse fields, and
//! children all at the top level. Translation into the engine's draft happens
//! here so the application layer never sees wire concerns.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::application::handlers::member::MemberDraft;
use crate::application::handlers::provisioning::ProvisioningOutcome;
use crate::domain::foundation::{FamilyId, MemberKey};
use crate::domain::member::{Gender, LifeStatus, MaritalStatus, Member, MemberError};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Flat member payload, shared by create and update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemberRequest {
    pub prefix: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    pub dob: Option<NaiveDate>,
    pub marital_status: Option<MaritalStatus>,
    pub life_status: Option<LifeStatus>,
    pub occupation: Option<String>,
    pub education: Option<String>,
    pub height: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub taluka: Option<String>,
    pub village: Option<String>,
    pub address: Option<String>,
    pub photo_url: Option<String>,
    pub family_id: Option<String>,
    pub father_id: Option<String>,
    pub mother_id: Option<String>,
    /// Reference to an already-existing spouse member (internal key).
    pub spouse_id: Option<String>,
    // Flat spouse payload, auto-creating or updating the spouse record.
    pub spouse_name: Option<String>,
    pub spouse_middle_name: Option<String>,
    pub spouse_last_name: Option<String>,
    pub spouse_prefix: Option<String>,
    pub spouse_gender: Option<Gender>,
    pub spouse_dob: Option<NaiveDate>,
    pub spouse_photo_url: Option<String>,
    pub children: Vec<MemberRequest>,
}

impl MemberRequest {
    /// Translates the wire payload into an engine draft.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` on malformed reference or family fields
    pub fn into_draft(self) -> Result<MemberDraft, MemberError> {
        let family_id = self
            .family_id
            .as_deref()
            .map(FamilyId::parse)
            .transpose()?;
        let father = parse_key(self.father_id.as_deref(), "fatherId")?;
        let mother = parse_key(self.mother_id.as_deref(), "motherId")?;
        let spouse_key = parse_key(self.spouse_id.as_deref(), "spouseId")?;

        // Flat spouse fields bundle into a nested spouse draft.
        let spouse = if self.spouse_name.is_some() {
            Some(Box::new(MemberDraft {
                key: spouse_key,
                prefix: self.spouse_prefix,
                first_name: self.spouse_name,
                middle_name: self.spouse_middle_name,
                last_name: self.spouse_last_name,
                gender: self.spouse_gender,
                dob: self.spouse_dob,
                photo_url: self.spouse_photo_url,
                ..MemberDraft::default()
            }))
        } else {
            None
        };

        let children = self
            .children
            .into_iter()
            .map(MemberRequest::into_draft)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MemberDraft {
            key: None,
            prefix: self.prefix,
            first_name: self.first_name,
            middle_name: self.middle_name,
            last_name: self.last_name,
            gender: self.gender,
            dob: self.dob,
            marital_status: self.marital_status,
            life_status: self.life_status,
            occupation: self.occupation,
            education: self.education,
            height: self.height,
            phone: self.phone,
            email: self.email,
            state: self.state,
            district: self.district,
            taluka: self.taluka,
            village: self.village,
            address: self.address,
            photo_url: self.photo_url,
            family_id,
            father,
            mother,
            spouse_key: if spouse.is_some() { None } else { spouse_key },
            spouse,
            children,
        })
    }
}

fn parse_key(value: Option<&str>, field: &str) -> Result<Option<MemberKey>, MemberError> {
    value
        .map(|s| {
            s.parse::<MemberKey>().map_err(|_| {
                MemberError::validation(field, format!("'{}' is not a valid member key", s))
            })
        })
        .transpose()
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// A member record as served over HTTP.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub key: String,
    pub member_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub full_name: String,
    pub gender: Gender,
    pub dob: NaiveDate,
    pub marital_status: MaritalStatus,
    pub life_status: LifeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taluka: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub village: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub family_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub father_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mother_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spouse_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spouse_full_name: Option<String>,
    pub is_primary: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        let profile = member.profile().clone();
        Self {
            key: member.key().to_string(),
            member_id: member.member_id().to_string(),
            prefix: profile.name.prefix().map(str::to_string),
            first_name: profile.name.first().to_string(),
            middle_name: profile.name.middle().map(str::to_string),
            last_name: profile.name.last().to_string(),
            full_name: member.full_name().to_string(),
            gender: profile.gender,
            dob: profile.dob,
            marital_status: profile.marital_status,
            life_status: profile.life_status,
            occupation: profile.biodata.occupation,
            education: profile.biodata.education,
            height: profile.biodata.height,
            phone: profile.biodata.phone,
            email: profile.biodata.email,
            state: profile.location.state,
            district: profile.location.district,
            taluka: profile.location.taluka,
            village: profile.location.village,
            address: profile.location.address,
            photo_url: profile.photo_url,
            family_id: member.family_id().to_string(),
            father_id: member.father().map(|k| k.to_string()),
            mother_id: member.mother().map(|k| k.to_string()),
            spouse_id: member.spouse().map(|k| k.to_string()),
            spouse_full_name: member.spouse_full_name().map(str::to_string),
            is_primary: member.is_primary(),
            created_at: member.created_at().as_datetime().to_rfc3339(),
            updated_at: member.updated_at().as_datetime().to_rfc3339(),
        }
    }
}

/// Account provisioning summary attached to creation responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum ProvisioningBody {
    Provisioned { username: String, verified: bool },
    Failed { reason: String },
}

impl From<ProvisioningOutcome> for ProvisioningBody {
    fn from(outcome: ProvisioningOutcome) -> Self {
        match outcome {
            ProvisioningOutcome::Provisioned { username, verified } => {
                ProvisioningBody::Provisioned { username, verified }
            }
            ProvisioningOutcome::Failed { reason } => ProvisioningBody::Failed { reason },
        }
    }
}

/// Response for member create/update operations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertMemberResponse {
    pub member: MemberResponse,
    pub created: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning: Option<ProvisioningBody>,
    pub linked_caller: bool,
}

/// Response for the start-family operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartFamilyResponse {
    pub family_id: String,
    pub member: MemberResponse,
    pub moved_children: usize,
}

/// Dashboard statistics response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatsResponse {
    pub total: u64,
    pub male: u64,
    pub female: u64,
    pub married: u64,
    pub single_male: u64,
    pub single_female: u64,
    pub primary: u64,
    pub families: u64,
    pub generated_at: String,
}
