use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{info, warn};

use super::models::{Family, Invitation, InvitationStatus, Member, MemberRole};
use crate::store::{new_id, Database, StoreError, StoreResult};
use crate::{expenses, lists};

pub const INVITATION_TTL_DAYS: i64 = 7;
const INVITATION_TOKEN_LEN: usize = 64;

#[derive(Debug, Clone)]
pub struct FamilyStore {
    db: Database,
}

impl FamilyStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Creates the family, its owner membership, and the default grocery and
    /// expense categories in one transaction.
    pub fn create_family(
        &self,
        name: &str,
        owner_email: &str,
        owner_display_name: Option<&str>,
    ) -> StoreResult<(Family, Member)> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::invalid("name", "family name must not be empty"));
        }
        let mut conn = self.db.open()?;
        let tx = conn.transaction()?;
        let family_id = new_id("fam");
        tx.execute(
            "INSERT INTO families(family_id, name, owner) VALUES (?1, ?2, ?3)",
            params![family_id, name, owner_email],
        )?;
        let member_id = insert_member(
            &tx,
            &family_id,
            owner_email,
            owner_display_name,
            MemberRole::Owner,
        )?;
        lists::categorize::seed_default_categories(&tx, &family_id)?;
        expenses::defaults::seed_default_categories(&tx, &family_id)?;
        tx.commit()?;

        info!(target: "family", %family_id, "family created");
        let family = self
            .fetch_family(&family_id)?
            .ok_or_else(|| StoreError::not_found("family", &family_id))?;
        let member = self
            .fetch_member(&member_id)?
            .ok_or_else(|| StoreError::not_found("member", &member_id))?;
        Ok((family, member))
    }

    pub fn fetch_family(&self, family_id: &str) -> StoreResult<Option<Family>> {
        let conn = self.db.open()?;
        let family = conn
            .query_row(
                "SELECT * FROM families WHERE family_id = ?1",
                [family_id],
                |row| Family::from_row(row),
            )
            .optional()?;
        Ok(family)
    }

    /// Families the given user belongs to, by name.
    pub fn families_for(&self, user_email: &str) -> StoreResult<Vec<Family>> {
        let conn = self.db.open()?;
        let mut stmt = conn.prepare(
            "SELECT f.* FROM families f
             JOIN members m ON m.family_id = f.family_id
             WHERE m.user_email = ?1 AND m.is_active = 1
             ORDER BY f.name",
        )?;
        let rows = stmt
            .query_map([user_email], |row| Family::from_row(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn delete_family(&self, family_id: &str) -> StoreResult<()> {
        let conn = self.db.open()?;
        let affected = conn.execute("DELETE FROM families WHERE family_id = ?1", [family_id])?;
        if affected == 0 {
            return Err(StoreError::not_found("family", family_id));
        }
        Ok(())
    }

    pub fn add_member(
        &self,
        family_id: &str,
        user_email: &str,
        display_name: Option<&str>,
        role: MemberRole,
    ) -> StoreResult<Member> {
        if role.is_owner() {
            return Err(StoreError::invalid("role", "a family has exactly one owner"));
        }
        let conn = self.db.open()?;
        if member_id_for(&conn, family_id, user_email)?.is_some() {
            return Err(StoreError::Conflict(format!(
                "{user_email} is already a member of {family_id}"
            )));
        }
        let member_id = insert_member(&conn, family_id, user_email, display_name, role)?;
        self.fetch_member(&member_id)?
            .ok_or_else(|| StoreError::not_found("member", member_id))
    }

    pub fn fetch_member(&self, member_id: &str) -> StoreResult<Option<Member>> {
        let conn = self.db.open()?;
        let member = conn
            .query_row(
                "SELECT * FROM members WHERE member_id = ?1",
                [member_id],
                |row| Member::from_row(row),
            )
            .optional()?;
        Ok(member)
    }

    pub fn member_for(&self, family_id: &str, user_email: &str) -> StoreResult<Option<Member>> {
        let conn = self.db.open()?;
        let member = conn
            .query_row(
                "SELECT * FROM members WHERE family_id = ?1 AND user_email = ?2",
                [family_id, user_email],
                |row| Member::from_row(row),
            )
            .optional()?;
        Ok(member)
    }

    pub fn list_members(&self, family_id: &str) -> StoreResult<Vec<Member>> {
        let conn = self.db.open()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM members WHERE family_id = ?1 AND is_active = 1 ORDER BY joined_at DESC",
        )?;
        let rows = stmt
            .query_map([family_id], |row| Member::from_row(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Issues a new invitation, cancelling any pending one for the same address.
    pub fn create_invitation(
        &self,
        family_id: &str,
        email: &str,
        role: MemberRole,
        invited_by: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Invitation> {
        if role.is_owner() {
            return Err(StoreError::invalid("role", "owners cannot be invited"));
        }
        let mut conn = self.db.open()?;
        if member_id_for(&conn, family_id, email)?.is_some() {
            return Err(StoreError::Conflict(format!(
                "{email} is already a member of {family_id}"
            )));
        }
        let tx = conn.transaction()?;
        tx.execute(
            "UPDATE invitations SET status = 'cancelled'
             WHERE family_id = ?1 AND email = ?2 AND status = 'pending'",
            params![family_id, email],
        )?;
        let invitation_id = new_id("inv");
        let expires_at = now + Duration::days(INVITATION_TTL_DAYS);
        tx.execute(
            "INSERT INTO invitations(invitation_id, family_id, email, token, status, role, invited_by, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, 'pending', ?5, ?6, ?7, ?8)",
            params![
                invitation_id,
                family_id,
                email,
                generate_token(),
                role.as_str(),
                invited_by,
                now.naive_utc(),
                expires_at.naive_utc(),
            ],
        )?;
        tx.commit()?;
        info!(target: "family", %family_id, %invitation_id, "invitation issued");
        self.fetch_invitation(&invitation_id)?
            .ok_or_else(|| StoreError::not_found("invitation", invitation_id))
    }

    pub fn fetch_invitation(&self, invitation_id: &str) -> StoreResult<Option<Invitation>> {
        let conn = self.db.open()?;
        let invitation = conn
            .query_row(
                "SELECT * FROM invitations WHERE invitation_id = ?1",
                [invitation_id],
                |row| Invitation::from_row(row),
            )
            .optional()?;
        Ok(invitation)
    }

    pub fn list_invitations(&self, family_id: &str) -> StoreResult<Vec<Invitation>> {
        let conn = self.db.open()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM invitations WHERE family_id = ?1 ORDER BY created_at DESC",
        )?;
        let rows = stmt
            .query_map([family_id], |row| Invitation::from_row(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Accepts a pending, unexpired invitation and creates the membership.
    pub fn accept_invitation(
        &self,
        token: &str,
        display_name: Option<&str>,
        now: DateTime<Utc>,
    ) -> StoreResult<Member> {
        let mut conn = self.db.open()?;
        let invitation = conn
            .query_row(
                "SELECT * FROM invitations WHERE token = ?1",
                [token],
                |row| Invitation::from_row(row),
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found("invitation", "<token>"))?;

        if invitation.status != InvitationStatus::Pending {
            return Err(StoreError::Conflict(format!(
                "invitation {} is {}",
                invitation.invitation_id, invitation.status
            )));
        }
        if invitation.is_expired(now) {
            conn.execute(
                "UPDATE invitations SET status = 'expired' WHERE invitation_id = ?1",
                [invitation.invitation_id.as_str()],
            )?;
            warn!(target: "family", invitation_id = %invitation.invitation_id, "invitation expired");
            return Err(StoreError::Conflict(format!(
                "invitation {} has expired",
                invitation.invitation_id
            )));
        }

        let tx = conn.transaction()?;
        let member_id = match member_id_for(&tx, &invitation.family_id, &invitation.email)? {
            Some(existing) => existing,
            None => insert_member(
                &tx,
                &invitation.family_id,
                &invitation.email,
                display_name,
                invitation.role,
            )?,
        };
        tx.execute(
            "UPDATE invitations SET status = 'accepted', accepted_at = ?2 WHERE invitation_id = ?1",
            params![invitation.invitation_id, now.naive_utc()],
        )?;
        tx.commit()?;
        self.fetch_member(&member_id)?
            .ok_or_else(|| StoreError::not_found("member", member_id))
    }

    pub fn cancel_invitation(&self, invitation_id: &str) -> StoreResult<()> {
        let conn = self.db.open()?;
        let affected = conn.execute(
            "UPDATE invitations SET status = 'cancelled'
             WHERE invitation_id = ?1 AND status = 'pending'",
            [invitation_id],
        )?;
        if affected == 0 {
            return Err(StoreError::not_found("pending invitation", invitation_id));
        }
        Ok(())
    }
}

fn insert_member(
    conn: &Connection,
    family_id: &str,
    user_email: &str,
    display_name: Option<&str>,
    role: MemberRole,
) -> StoreResult<String> {
    let member_id = new_id("mem");
    conn.execute(
        "INSERT INTO members(member_id, family_id, user_email, display_name, role)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![member_id, family_id, user_email, display_name, role.as_str()],
    )?;
    Ok(member_id)
}

fn member_id_for(conn: &Connection, family_id: &str, user_email: &str) -> StoreResult<Option<String>> {
    let id = conn
        .query_row(
            "SELECT member_id FROM members WHERE family_id = ?1 AND user_email = ?2",
            [family_id, user_email],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(id)
}

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(INVITATION_TOKEN_LEN)
        .map(char::from)
        .collect()
}
