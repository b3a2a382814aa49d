//! Roster sync protocol types
//!
//! Used by the back-office SPA to push a full roster snapshot,
//! and by roster-server to validate and store it.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorCode};

/// Upper bound on members accepted in one snapshot
pub const MAX_SYNC_MEMBERS: usize = 5_000;

/// Upper bound on assignments accepted in one snapshot
pub const MAX_SYNC_ASSIGNMENTS: usize = 10_000;

// ── Enumerations ──

/// Recurring event an assignment belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentType {
    Santa,
    Knights,
}

impl AssignmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Santa => "santa",
            Self::Knights => "knights",
        }
    }

    /// Title used in reminder emails
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Santa => "Santa visit",
            Self::Knights => "Knights meeting",
        }
    }
}

impl fmt::Display for AssignmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown assignment type string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown assignment type '{0}'")]
pub struct UnknownAssignmentType(pub String);

impl FromStr for AssignmentType {
    type Err = UnknownAssignmentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "santa" => Ok(Self::Santa),
            "knights" => Ok(Self::Knights),
            other => Err(UnknownAssignmentType(other.to_string())),
        }
    }
}

impl TryFrom<String> for AssignmentType {
    type Error = UnknownAssignmentType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// How an upsert treats contact fields that are missing from the incoming row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactMergePolicy {
    /// Incoming email/phone always replace stored values, null included
    #[default]
    Overwrite,
    /// A null incoming email/phone keeps whatever is stored
    KeepExisting,
}

impl FromStr for ContactMergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "keep_existing" | "keep-existing" => Ok(Self::KeepExisting),
            other => Err(format!("unknown contact merge policy '{other}'")),
        }
    }
}

// ── Wire: request ──

/// Full snapshot sent by the back office
///
/// `members` and `assignments` keep the absent / empty distinction:
/// an absent member list means "no member changes", while assignments are
/// wiped on every sync regardless.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncRequest {
    #[serde(default)]
    pub members: Option<Vec<MemberInput>>,
    #[serde(default)]
    pub assignments: Option<Vec<AssignmentInput>>,
}

/// A member row as submitted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// An assignment row as submitted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentInput {
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub member_name: String,
    #[serde(default)]
    pub notes: Option<String>,
}

// ── Validated snapshot ──

/// Member ready to upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRecord {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Assignment ready to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRecord {
    pub date: NaiveDate,
    pub kind: AssignmentType,
    pub location: String,
    pub role: String,
    pub member_name: String,
    pub notes: Option<String>,
}

/// A snapshot that passed validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterSnapshot {
    pub members: Option<Vec<MemberRecord>>,
    pub assignments: Option<Vec<AssignmentRecord>>,
}

impl RosterSnapshot {
    pub fn member_count(&self) -> usize {
        self.members.as_ref().map_or(0, Vec::len)
    }

    pub fn assignment_count(&self) -> usize {
        self.assignments.as_ref().map_or(0, Vec::len)
    }
}

/// Blank or whitespace-only contact fields are stored as null
fn normalize_optional(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl MemberInput {
    fn validate(&self, index: usize) -> Result<MemberRecord, AppError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::MemberNameRequired,
                format!("members[{index}].name: member name is required"),
            ));
        }
        Ok(MemberRecord {
            name: name.to_string(),
            email: normalize_optional(self.email.as_ref()),
            phone: normalize_optional(self.phone.as_ref()),
        })
    }
}

impl AssignmentInput {
    fn validate(&self, index: usize) -> Result<AssignmentRecord, AppError> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").map_err(|_| {
            AppError::with_message(
                ErrorCode::InvalidAssignmentDate,
                format!(
                    "assignments[{index}].date: expected YYYY-MM-DD, got '{}'",
                    self.date
                ),
            )
        })?;

        let kind: AssignmentType = self.kind.trim().parse().map_err(|e: UnknownAssignmentType| {
            AppError::with_message(
                ErrorCode::InvalidAssignmentType,
                format!("assignments[{index}].type: {e}"),
            )
        })?;

        let member_name = self.member_name.trim();
        if member_name.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::AssignmentMemberRequired,
                format!("assignments[{index}].memberName: member name is required"),
            ));
        }

        Ok(AssignmentRecord {
            date,
            kind,
            location: self.location.clone(),
            role: self.role.clone(),
            member_name: member_name.to_string(),
            notes: normalize_optional(self.notes.as_ref()),
        })
    }
}

impl SyncRequest {
    /// Check every row and produce a typed snapshot.
    ///
    /// Fails on the first offending row; nothing is partially accepted.
    pub fn validate(&self) -> Result<RosterSnapshot, AppError> {
        if let Some(members) = &self.members
            && members.len() > MAX_SYNC_MEMBERS
        {
            return Err(AppError::with_message(
                ErrorCode::PayloadTooLarge,
                format!(
                    "Too many members: {} (max {MAX_SYNC_MEMBERS})",
                    members.len()
                ),
            ));
        }
        if let Some(assignments) = &self.assignments
            && assignments.len() > MAX_SYNC_ASSIGNMENTS
        {
            return Err(AppError::with_message(
                ErrorCode::PayloadTooLarge,
                format!(
                    "Too many assignments: {} (max {MAX_SYNC_ASSIGNMENTS})",
                    assignments.len()
                ),
            ));
        }

        let members = self
            .members
            .as_ref()
            .map(|list| {
                list.iter()
                    .enumerate()
                    .map(|(i, m)| m.validate(i))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        let assignments = self
            .assignments
            .as_ref()
            .map(|list| {
                list.iter()
                    .enumerate()
                    .map(|(i, a)| a.validate(i))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        Ok(RosterSnapshot {
            members,
            assignments,
        })
    }
}

// ── Wire: response ──

/// Counts reported after a committed sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCounts {
    pub members: usize,
    pub assignments: usize,
}

/// `{ "success": true, "synced": { "members": n, "assignments": m } }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResponse {
    pub success: bool,
    pub synced: SyncCounts,
}

impl SyncResponse {
    pub fn committed(members: usize, assignments: usize) -> Self {
        Self {
            success: true,
            synced: SyncCounts {
                members,
                assignments,
            },
        }
    }
}

// ── Stored rows ──

/// Member row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Unix millis
    pub updated_at: i64,
}

/// Assignment row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: i64,
    #[serde(rename = "date")]
    pub assignment_date: NaiveDate,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub assignment_type: AssignmentType,
    pub location: String,
    pub role: String,
    pub member_name: String,
    pub notes: Option<String>,
    /// Unix millis
    pub updated_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(date: &str, kind: &str, member: &str) -> AssignmentInput {
        AssignmentInput {
            date: date.to_string(),
            kind: kind.to_string(),
            location: "Main hall".to_string(),
            role: "helper".to_string(),
            member_name: member.to_string(),
            notes: None,
        }
    }

    #[test]
    fn test_request_deserialize_camel_case() {
        let json = serde_json::json!({
            "members": [{ "name": "Ann", "email": "ann@example.com" }],
            "assignments": [{
                "date": "2026-12-05",
                "type": "santa",
                "location": "Mall",
                "role": "Santa",
                "memberName": "Ann",
                "notes": "bring suit"
            }]
        });
        let req: SyncRequest = serde_json::from_value(json).unwrap();
        let members = req.members.as_ref().unwrap();
        assert_eq!(members[0].name, "Ann");
        assert!(members[0].phone.is_none());
        let a = &req.assignments.as_ref().unwrap()[0];
        assert_eq!(a.kind, "santa");
        assert_eq!(a.member_name, "Ann");
        assert_eq!(a.notes.as_deref(), Some("bring suit"));
    }

    #[test]
    fn test_absent_and_empty_lists_are_distinct() {
        let absent: SyncRequest = serde_json::from_str("{}").unwrap();
        assert!(absent.members.is_none());
        assert!(absent.assignments.is_none());

        let empty: SyncRequest =
            serde_json::from_str(r#"{"members": [], "assignments": []}"#).unwrap();
        assert_eq!(empty.members.as_ref().map(Vec::len), Some(0));
        assert_eq!(empty.assignments.as_ref().map(Vec::len), Some(0));

        let snap = empty.validate().unwrap();
        assert_eq!(snap.members, Some(vec![]));
        assert_eq!(snap.assignments, Some(vec![]));
    }

    #[test]
    fn test_validate_member_name_required() {
        let req = SyncRequest {
            members: Some(vec![
                MemberInput {
                    name: "Ann".into(),
                    ..Default::default()
                },
                MemberInput {
                    name: "   ".into(),
                    ..Default::default()
                },
            ]),
            assignments: None,
        };
        let err = req.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::MemberNameRequired);
        assert!(err.message.starts_with("members[1].name"));
    }

    #[test]
    fn test_validate_normalizes_blank_contacts() {
        let req = SyncRequest {
            members: Some(vec![MemberInput {
                name: "  Bob ".into(),
                email: Some("  ".into()),
                phone: Some(" 555-0100 ".into()),
            }]),
            assignments: None,
        };
        let snap = req.validate().unwrap();
        let bob = &snap.members.unwrap()[0];
        assert_eq!(bob.name, "Bob");
        assert_eq!(bob.email, None);
        assert_eq!(bob.phone.as_deref(), Some("555-0100"));
    }

    #[test]
    fn test_validate_rejects_unknown_type() {
        let req = SyncRequest {
            members: None,
            assignments: Some(vec![
                assignment("2026-12-05", "santa", "Ann"),
                assignment("2026-12-06", "elves", "Ann"),
            ]),
        };
        let err = req.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidAssignmentType);
        assert_eq!(
            err.message,
            "assignments[1].type: unknown assignment type 'elves'"
        );
    }

    #[test]
    fn test_validate_rejects_bad_date() {
        let req = SyncRequest {
            members: None,
            assignments: Some(vec![assignment("12/05/2026", "knights", "Ann")]),
        };
        let err = req.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidAssignmentDate);
    }

    #[test]
    fn test_validate_requires_assignment_member() {
        let req = SyncRequest {
            members: None,
            assignments: Some(vec![assignment("2026-12-05", "knights", "")]),
        };
        let err = req.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::AssignmentMemberRequired);
    }

    #[test]
    fn test_validate_rejects_oversized_snapshot() {
        let req = SyncRequest {
            members: Some(vec![MemberInput::default(); MAX_SYNC_MEMBERS + 1]),
            assignments: None,
        };
        let err = req.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::PayloadTooLarge);
    }

    #[test]
    fn test_validate_keeps_order_and_duplicates() {
        let req = SyncRequest {
            members: Some(vec![
                MemberInput {
                    name: "A".into(),
                    email: Some("x@x.com".into()),
                    phone: None,
                },
                MemberInput {
                    name: "A".into(),
                    email: Some("y@y.com".into()),
                    phone: None,
                },
            ]),
            assignments: None,
        };
        let snap = req.validate().unwrap();
        let members = snap.members.as_ref().unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[1].email.as_deref(), Some("y@y.com"));
        assert_eq!(snap.member_count(), 2);
        assert_eq!(snap.assignment_count(), 0);
    }

    #[test]
    fn test_sync_response_shape() {
        let json = serde_json::to_value(SyncResponse::committed(2, 5)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "success": true, "synced": { "members": 2, "assignments": 5 } })
        );
    }

    #[test]
    fn test_assignment_type_parse() {
        assert_eq!("santa".parse::<AssignmentType>(), Ok(AssignmentType::Santa));
        assert_eq!(
            AssignmentType::try_from("knights".to_string()),
            Ok(AssignmentType::Knights)
        );
        assert!("Santa".parse::<AssignmentType>().is_err());
    }

    #[test]
    fn test_merge_policy_parse() {
        assert_eq!(
            "overwrite".parse::<ContactMergePolicy>(),
            Ok(ContactMergePolicy::Overwrite)
        );
        assert_eq!(
            "KEEP_EXISTING".parse::<ContactMergePolicy>(),
            Ok(ContactMergePolicy::KeepExisting)
        );
        assert!("merge".parse::<ContactMergePolicy>().is_err());
        assert_eq!(ContactMergePolicy::default(), ContactMergePolicy::Overwrite);
    }

    #[test]
    fn test_assignment_row_serializes_wire_names() {
        let row = Assignment {
            id: 7,
            assignment_date: NaiveDate::from_ymd_opt(2026, 12, 5).unwrap(),
            assignment_type: AssignmentType::Santa,
            location: "Mall".into(),
            role: "Santa".into(),
            member_name: "Ann".into(),
            notes: None,
            updated_at: 1,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["date"], "2026-12-05");
        assert_eq!(json["type"], "santa");
        assert_eq!(json["memberName"], "Ann");
        assert_eq!(json["updatedAt"], 1);
    }
}
