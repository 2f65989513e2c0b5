use chrono::Utc;
use clap::{Args, Subcommand};
use hearth_core::family::{FamilyStore, MemberRole};

use crate::report::{ActionResult, FamilyCreated};
use crate::{render, CtlContext, OutputFormat, Result};

#[derive(Subcommand, Debug)]
pub enum FamilyCommands {
    /// Creates a family with its owner and default categories
    Create(FamilyCreateArgs),
    /// Families a user belongs to
    List(FamilyListArgs),
    /// Active members of the selected family
    Members,
    /// Adds a member without an invitation
    AddMember(AddMemberArgs),
    /// Invites an email address into the selected family
    Invite(InviteArgs),
    /// Invitations of the selected family
    Invitations,
    /// Accepts an invitation by token
    Accept(AcceptArgs),
    /// Cancels a pending invitation
    Cancel(CancelArgs),
}

#[derive(Args, Debug)]
pub struct FamilyCreateArgs {
    pub name: String,
    /// Email of the owning user
    #[arg(long)]
    pub owner: String,
    #[arg(long)]
    pub display_name: Option<String>,
}

#[derive(Args, Debug)]
pub struct FamilyListArgs {
    /// Member email to look up
    #[arg(long)]
    pub user: String,
}

#[derive(Args, Debug)]
pub struct AddMemberArgs {
    pub email: String,
    #[arg(long)]
    pub display_name: Option<String>,
    /// admin, member or child
    #[arg(long, default_value_t = MemberRole::Member)]
    pub role: MemberRole,
}

#[derive(Args, Debug)]
pub struct InviteArgs {
    pub email: String,
    /// admin, member or child
    #[arg(long, default_value_t = MemberRole::Member)]
    pub role: MemberRole,
    /// Email of the inviting member
    #[arg(long)]
    pub invited_by: String,
}

#[derive(Args, Debug)]
pub struct AcceptArgs {
    pub token: String,
    #[arg(long)]
    pub display_name: Option<String>,
}

#[derive(Args, Debug)]
pub struct CancelArgs {
    pub invitation_id: String,
}

pub(crate) fn execute(
    context: &CtlContext,
    command: &FamilyCommands,
    format: OutputFormat,
) -> Result<()> {
    let store = FamilyStore::new(context.database()?);
    match command {
        FamilyCommands::Create(args) => {
            let (family, owner) =
                store.create_family(&args.name, &args.owner, args.display_name.as_deref())?;
            render(&FamilyCreated { family, owner }, format)
        }
        FamilyCommands::List(args) => render(&store.families_for(&args.user)?, format),
        FamilyCommands::Members => render(&store.list_members(&context.family_id()?)?, format),
        FamilyCommands::AddMember(args) => {
            let member = store.add_member(
                &context.family_id()?,
                &args.email,
                args.display_name.as_deref(),
                args.role,
            )?;
            render(&member, format)
        }
        FamilyCommands::Invite(args) => {
            let invitation = store.create_invitation(
                &context.family_id()?,
                &args.email,
                args.role,
                &args.invited_by,
                Utc::now(),
            )?;
            render(&invitation, format)
        }
        FamilyCommands::Invitations => {
            render(&store.list_invitations(&context.family_id()?)?, format)
        }
        FamilyCommands::Accept(args) => {
            let member =
                store.accept_invitation(&args.token, args.display_name.as_deref(), Utc::now())?;
            render(&member, format)
        }
        FamilyCommands::Cancel(args) => {
            store.cancel_invitation(&args.invitation_id)?;
            render(
                &ActionResult::ok(format!("invitation {} cancelled", args.invitation_id)),
                format,
            )
        }
    }
}
