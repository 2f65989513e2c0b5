use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Owner,
    Admin,
    Member,
    Child,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Owner => "owner",
            MemberRole::Admin => "admin",
            MemberRole::Member => "member",
            MemberRole::Child => "child",
        }
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, MemberRole::Owner)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, MemberRole::Owner | MemberRole::Admin)
    }

    pub fn is_adult(&self) -> bool {
        !matches!(self, MemberRole::Child)
    }

    /// Finance screens (expenses, budgets) are adults only.
    pub fn can_manage_finance(&self) -> bool {
        self.is_adult()
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(MemberRole::Owner),
            "admin" => Ok(MemberRole::Admin),
            "member" => Ok(MemberRole::Member),
            "child" => Ok(MemberRole::Child),
            other => Err(format!("unknown member role: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Expired,
    Cancelled,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Expired => "expired",
            InvitationStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvitationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvitationStatus::Pending),
            "accepted" => Ok(InvitationStatus::Accepted),
            "expired" => Ok(InvitationStatus::Expired),
            "cancelled" => Ok(InvitationStatus::Cancelled),
            other => Err(format!("unknown invitation status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Family {
    pub family_id: String,
    pub name: String,
    pub color: String,
    pub owner: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Family {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let created_at: Option<NaiveDateTime> = row.get("created_at")?;
        Ok(Self {
            family_id: row.get("family_id")?,
            name: row.get("name")?,
            color: row.get("color")?,
            owner: row.get("owner")?,
            created_at: created_at.map(|dt| Utc.from_utc_datetime(&dt)),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub member_id: String,
    pub family_id: String,
    pub user_email: String,
    pub display_name: Option<String>,
    pub role: MemberRole,
    pub is_active: bool,
    pub joined_at: Option<DateTime<Utc>>,
}

impl Member {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let joined_at: Option<NaiveDateTime> = row.get("joined_at")?;
        Ok(Self {
            member_id: row.get("member_id")?,
            family_id: row.get("family_id")?,
            user_email: row.get("user_email")?,
            display_name: row.get("display_name")?,
            role: row
                .get::<_, String>("role")?
                .parse()
                .unwrap_or(MemberRole::Member),
            is_active: row.get::<_, i64>("is_active")? != 0,
            joined_at: joined_at.map(|dt| Utc.from_utc_datetime(&dt)),
        })
    }

    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.user_email)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invitation {
    pub invitation_id: String,
    pub family_id: String,
    pub email: String,
    pub token: String,
    pub status: InvitationStatus,
    pub role: MemberRole,
    pub invited_by: String,
    pub created_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

impl Invitation {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let created_at: Option<NaiveDateTime> = row.get("created_at")?;
        let expires_at: NaiveDateTime = row.get("expires_at")?;
        let accepted_at: Option<NaiveDateTime> = row.get("accepted_at")?;
        Ok(Self {
            invitation_id: row.get("invitation_id")?,
            family_id: row.get("family_id")?,
            email: row.get("email")?,
            token: row.get("token")?,
            status: row
                .get::<_, String>("status")?
                .parse()
                .unwrap_or(InvitationStatus::Pending),
            role: row
                .get::<_, String>("role")?
                .parse()
                .unwrap_or(MemberRole::Member),
            invited_by: row.get("invited_by")?,
            created_at: created_at.map(|dt| Utc.from_utc_datetime(&dt)),
            expires_at: Utc.from_utc_datetime(&expires_at),
            accepted_at: accepted_at.map(|dt| Utc.from_utc_datetime(&dt)),
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn can_be_accepted(&self, now: DateTime<Utc>) -> bool {
        self.status == InvitationStatus::Pending && !self.is_expired(now)
    }
}
