//! Marriage aggregate entity.
//!
//! The marriage store is the canonical source of spousal links; the member
//! `spouse` field is a cache derived from it. Records are never hard-deleted:
//! a marriage leaves the Active state by status transition only.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    DomainError, ErrorCode, MarriageId, MemberKey, Timestamp, ValidationError,
};
use crate::domain::member::{Gender, Member};

/// Lifecycle state of a marriage.
///
/// At most one Active marriage may exist per member at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarriageStatus {
    Active,
    Divorced,
    Widowed,
}

impl MarriageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarriageStatus::Active => "Active",
            MarriageStatus::Divorced => "Divorced",
            MarriageStatus::Widowed => "Widowed",
        }
    }

    /// True for states a marriage cannot leave.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MarriageStatus::Active)
    }
}

impl fmt::Display for MarriageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MarriageStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(MarriageStatus::Active),
            "Divorced" => Ok(MarriageStatus::Divorced),
            "Widowed" => Ok(MarriageStatus::Widowed),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown marriage status '{}'", other),
            )),
        }
    }
}

/// Marriage aggregate - a relationship edge between exactly two members.
///
/// # Invariants
///
/// - husband and wife are distinct members
/// - the male-gendered party is always stored as husband
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marriage {
    id: MarriageId,
    husband: MemberKey,
    wife: MemberKey,
    status: MarriageStatus,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Marriage {
    /// Creates an Active marriage between two members, assigning husband and
    /// wife by gender.
    ///
    /// # Errors
    ///
    /// - `SelfReference` if both sides are the same member
    /// - `ValidationFailed` if the parties share a gender
    pub fn between(id: MarriageId, a: &Member, b: &Member) -> Result<Self, DomainError> {
        if a.key() == b.key() {
            return Err(DomainError::new(
                ErrorCode::SelfReference,
                "A member cannot marry themselves",
            ));
        }
        if a.gender() == b.gender() {
            return Err(DomainError::validation(
                "gender",
                "Husband and wife must have opposite genders",
            ));
        }
        let (husband, wife) = if a.gender() == Gender::Male {
            (*a.key(), *b.key())
        } else {
            (*b.key(), *a.key())
        };
        let now = Timestamp::now();
        Ok(Self {
            id,
            husband,
            wife,
            status: MarriageStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstitutes a marriage from persistence.
    pub fn reconstitute(
        id: MarriageId,
        husband: MemberKey,
        wife: MemberKey,
        status: MarriageStatus,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            husband,
            wife,
            status,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &MarriageId {
        &self.id
    }

    pub fn husband(&self) -> &MemberKey {
        &self.husband
    }

    pub fn wife(&self) -> &MemberKey {
        &self.wife
    }

    pub fn status(&self) -> MarriageStatus {
        self.status
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    pub fn is_active(&self) -> bool {
        self.status == MarriageStatus::Active
    }

    /// True when the member is one of the two parties.
    pub fn involves(&self, key: &MemberKey) -> bool {
        &self.husband == key || &self.wife == key
    }

    /// True when the marriage links exactly this unordered pair.
    pub fn links(&self, a: &MemberKey, b: &MemberKey) -> bool {
        (&self.husband == a && &self.wife == b) || (&self.husband == b && &self.wife == a)
    }

    /// The opposite party for a member, if the member is involved at all.
    pub fn partner_of(&self, key: &MemberKey) -> Option<MemberKey> {
        if &self.husband == key {
            Some(self.wife)
        } else if &self.wife == key {
            Some(self.husband)
        } else {
            None
        }
    }

    /// Returns the marriage to the Active state (re-linking an existing pair).
    pub fn reactivate(&mut self) {
        self.status = MarriageStatus::Active;
        self.updated_at = Timestamp::now();
    }

    /// Transitions an Active marriage into a terminal state.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` when the target state is not terminal
    pub fn dissolve(&mut self, status: MarriageStatus) -> Result<(), DomainError> {
        if !status.is_terminal() {
            return Err(DomainError::validation(
                "status",
                "Dissolution requires a terminal status",
            ));
        }
        self.status = status;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}
