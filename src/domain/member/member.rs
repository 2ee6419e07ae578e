//! Member aggregate entity.
//!
//! A member is one person in the community graph. Households are grouped by
//! `family_id`; parent and spouse links are direct references to other member
//! keys. The spouse link is a derived cache of the marriage store and is only
//! ever written by the engine, never from client input.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    DomainError, ErrorCode, FamilyId, MemberId, MemberKey, Timestamp, ValidationError,
};

use super::name::PersonName;

/// Member gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// The other gender, used to default an auto-created spouse.
    pub fn opposite(&self) -> Gender {
        match self {
            Gender::Male => Gender::Female,
            Gender::Female => Gender::Male,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            other => Err(ValidationError::invalid_format(
                "gender",
                format!("unknown gender '{}'", other),
            )),
        }
    }
}

/// Marital status of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
    Widowed,
}

impl MaritalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaritalStatus::Single => "Single",
            MaritalStatus::Married => "Married",
            MaritalStatus::Divorced => "Divorced",
            MaritalStatus::Widowed => "Widowed",
        }
    }
}

impl fmt::Display for MaritalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MaritalStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Single" => Ok(MaritalStatus::Single),
            "Married" => Ok(MaritalStatus::Married),
            "Divorced" => Ok(MaritalStatus::Divorced),
            "Widowed" => Ok(MaritalStatus::Widowed),
            other => Err(ValidationError::invalid_format(
                "maritalStatus",
                format!("unknown marital status '{}'", other),
            )),
        }
    }
}

/// Life status of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifeStatus {
    Alive,
    Deceased,
}

impl LifeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifeStatus::Alive => "Alive",
            LifeStatus::Deceased => "Deceased",
        }
    }
}

impl fmt::Display for LifeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LifeStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Alive" => Ok(LifeStatus::Alive),
            "Deceased" => Ok(LifeStatus::Deceased),
            other => Err(ValidationError::invalid_format(
                "lifeStatus",
                format!("unknown life status '{}'", other),
            )),
        }
    }
}

/// Biographical details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Biodata {
    pub occupation: Option<String>,
    pub education: Option<String>,
    pub height: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Flat location fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub state: Option<String>,
    pub district: Option<String>,
    pub taluka: Option<String>,
    pub village: Option<String>,
    pub address: Option<String>,
}

/// The validated profile portion of a member: everything except identity,
/// household assignment, and relationship links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberProfile {
    pub name: PersonName,
    pub gender: Gender,
    pub dob: NaiveDate,
    pub marital_status: MaritalStatus,
    pub life_status: LifeStatus,
    pub biodata: Biodata,
    pub location: Location,
    pub photo_url: Option<String>,
}

/// Parent and spouse references of a member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyLinks {
    pub father: Option<MemberKey>,
    pub mother: Option<MemberKey>,
    pub spouse: Option<MemberKey>,
}

/// Member aggregate.
///
/// # Invariants
///
/// - `member_id` is unique across the store
/// - at most one member per assigned `family_id` is primary
/// - a member is never its own father, mother, or spouse
/// - `full_name` is always derived from the name components
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    key: MemberKey,
    member_id: MemberId,
    profile: MemberProfile,
    family_id: FamilyId,
    links: FamilyLinks,
    is_primary: bool,
    full_name: String,
    spouse_full_name: Option<String>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Member {
    /// Creates a new member.
    ///
    /// # Errors
    ///
    /// - `SelfReference` if a parent link points at the member itself
    pub fn create(
        key: MemberKey,
        member_id: MemberId,
        family_id: FamilyId,
        profile: MemberProfile,
        links: FamilyLinks,
    ) -> Result<Self, DomainError> {
        Self::guard_links(&key, &links)?;
        let now = Timestamp::now();
        let full_name = profile.name.full();
        Ok(Self {
            key,
            member_id,
            profile,
            family_id,
            links,
            is_primary: false,
            full_name,
            spouse_full_name: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstitutes a member from persistence (no validation, no recompute).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        key: MemberKey,
        member_id: MemberId,
        family_id: FamilyId,
        profile: MemberProfile,
        links: FamilyLinks,
        is_primary: bool,
        full_name: String,
        spouse_full_name: Option<String>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            key,
            member_id,
            profile,
            family_id,
            links,
            is_primary,
            full_name,
            spouse_full_name,
            created_at,
            updated_at,
        }
    }

    fn guard_links(key: &MemberKey, links: &FamilyLinks) -> Result<(), DomainError> {
        for (relation, link) in [
            ("father", links.father),
            ("mother", links.mother),
            ("spouse", links.spouse),
        ] {
            if link.as_ref() == Some(key) {
                return Err(DomainError::new(
                    ErrorCode::SelfReference,
                    format!("Member cannot be their own {}", relation),
                ));
            }
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn key(&self) -> &MemberKey {
        &self.key
    }

    pub fn member_id(&self) -> &MemberId {
        &self.member_id
    }

    pub fn profile(&self) -> &MemberProfile {
        &self.profile
    }

    pub fn name(&self) -> &PersonName {
        &self.profile.name
    }

    pub fn gender(&self) -> Gender {
        self.profile.gender
    }

    pub fn dob(&self) -> NaiveDate {
        self.profile.dob
    }

    pub fn marital_status(&self) -> MaritalStatus {
        self.profile.marital_status
    }

    pub fn life_status(&self) -> LifeStatus {
        self.profile.life_status
    }

    pub fn family_id(&self) -> &FamilyId {
        &self.family_id
    }

    pub fn father(&self) -> Option<&MemberKey> {
        self.links.father.as_ref()
    }

    pub fn mother(&self) -> Option<&MemberKey> {
        self.links.mother.as_ref()
    }

    pub fn spouse(&self) -> Option<&MemberKey> {
        self.links.spouse.as_ref()
    }

    pub fn links(&self) -> &FamilyLinks {
        &self.links
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    /// The server-computed display name.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn spouse_full_name(&self) -> Option<&str> {
        self.spouse_full_name.as_deref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    /// True when the member has no parent references at all.
    pub fn is_root(&self) -> bool {
        self.links.father.is_none() && self.links.mother.is_none()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Replaces the profile, recomputing the derived full name.
    pub fn apply_profile(&mut self, profile: MemberProfile) {
        self.full_name = profile.name.full();
        self.profile = profile;
        self.touch();
    }

    /// Moves the member into a household.
    pub fn assign_family(&mut self, family_id: FamilyId) {
        self.family_id = family_id;
        self.touch();
    }

    /// Marks or clears head-of-household status.
    pub fn set_primary(&mut self, primary: bool) {
        self.is_primary = primary;
        self.touch();
    }

    /// Sets parent references.
    ///
    /// # Errors
    ///
    /// - `SelfReference` if a parent is the member itself
    pub fn set_parents(
        &mut self,
        father: Option<MemberKey>,
        mother: Option<MemberKey>,
    ) -> Result<(), DomainError> {
        let links = FamilyLinks {
            father,
            mother,
            spouse: self.links.spouse,
        };
        Self::guard_links(&self.key, &links)?;
        self.links = links;
        self.touch();
        Ok(())
    }

    /// Writes the derived spouse cache, mirroring an Active marriage.
    ///
    /// # Errors
    ///
    /// - `SelfReference` if the spouse is the member itself
    pub fn link_spouse(
        &mut self,
        spouse: MemberKey,
        spouse_full_name: String,
    ) -> Result<(), DomainError> {
        if spouse == self.key {
            return Err(DomainError::new(
                ErrorCode::SelfReference,
                "Member cannot be their own spouse",
            ));
        }
        self.links.spouse = Some(spouse);
        self.spouse_full_name = Some(spouse_full_name);
        self.touch();
        Ok(())
    }

    /// Clears the derived spouse cache, e.g. after a dissolution.
    pub fn clear_spouse(&mut self) {
        self.links.spouse = None;
        self.spouse_full_name = None;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}
