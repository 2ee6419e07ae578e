//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Internal storage identity of a member record.
///
/// Opaque and store-assigned; never shown to end users. The human-readable
/// identity is [`MemberId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberKey(Uuid);

impl MemberKey {
    /// Creates a new random MemberKey.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a MemberKey from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MemberKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MemberKey {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Unique identifier for a marriage record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarriageId(Uuid);

impl MarriageId {
    /// Creates a new random MarriageId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a MarriageId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MarriageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MarriageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MarriageId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Human-readable, sequential member identifier (`M0001`, `M0002`, ...).
///
/// Sequences are zero-padded to four digits but keep growing past `M9999`;
/// comparisons always go through [`MemberId::sequence`], never the raw string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    /// Formats the identifier for a given sequence number.
    pub fn from_sequence(seq: u32) -> Self {
        Self(format!("M{:04}", seq))
    }

    /// Parses a `M<digits>` identifier.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let digits = s
            .strip_prefix('M')
            .ok_or_else(|| ValidationError::invalid_format("memberId", "must start with 'M'"))?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::invalid_format(
                "memberId",
                "expected digits after 'M'",
            ));
        }
        Ok(Self(s.to_string()))
    }

    /// Returns the numeric sequence of this identifier.
    pub fn sequence(&self) -> u32 {
        self.0[1..].parse().unwrap_or(0)
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the string looks like a member identifier.
    pub fn matches(s: &str) -> bool {
        Self::parse(s).is_ok()
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MemberId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Household grouping identifier (`F0001`, ...) with two sentinel states.
///
/// `FNew` requests allocation of a fresh family; `Unassigned` marks a member
/// without a household (e.g. an unmarried root member). Only assigned values
/// participate in household queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FamilyId(String);

impl FamilyId {
    const NEW: &'static str = "FNew";
    const UNASSIGNED: &'static str = "Unassigned";

    /// Formats the identifier for a given sequence number.
    pub fn from_sequence(seq: u32) -> Self {
        Self(format!("F{:04}", seq))
    }

    /// The sentinel requesting allocation of a new family.
    pub fn new_request() -> Self {
        Self(Self::NEW.to_string())
    }

    /// The sentinel for a member with no household.
    pub fn unassigned() -> Self {
        Self(Self::UNASSIGNED.to_string())
    }

    /// Parses any stored family value, sentinels included.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        if s == Self::NEW || s == Self::UNASSIGNED {
            return Ok(Self(s.to_string()));
        }
        let digits = s
            .strip_prefix('F')
            .ok_or_else(|| ValidationError::invalid_format("familyId", "must start with 'F'"))?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::invalid_format(
                "familyId",
                "expected digits after 'F'",
            ));
        }
        Ok(Self(s.to_string()))
    }

    /// Returns true when this is a real household assignment, not a sentinel.
    pub fn is_assigned(&self) -> bool {
        self.0 != Self::NEW && self.0 != Self::UNASSIGNED
    }

    /// Returns true for the `FNew` allocation request sentinel.
    pub fn is_new_request(&self) -> bool {
        self.0 == Self::NEW
    }

    /// Returns the numeric sequence, or None for sentinels.
    pub fn sequence(&self) -> Option<u32> {
        if !self.is_assigned() {
            return None;
        }
        self.0[1..].parse().ok()
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FamilyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FamilyId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Login account identifier (opaque, owned by the account directory).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Creates a new UserId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::empty_field("user_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A member reference as received from callers: either the internal key or
/// the public `M####` identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberRef {
    Key(MemberKey),
    Public(MemberId),
}

impl FromStr for MemberRef {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if MemberId::matches(s) {
            return Ok(MemberRef::Public(MemberId::parse(s)?));
        }
        s.parse::<MemberKey>()
            .map(MemberRef::Key)
            .map_err(|_| ValidationError::invalid_format("member", "expected UUID or M-id"))
    }
}

impl fmt::Display for MemberRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberRef::Key(key) => write!(f, "{}", key),
            MemberRef::Public(id) => write!(f, "{}", id),
        }
    }
}
