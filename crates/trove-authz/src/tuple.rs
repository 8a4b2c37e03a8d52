//! Relation tuple vocabulary.
//!
//! A tuple is the atomic fact of the permission graph:
//! `(subject, relation, object)`. Subjects are either a single user
//! (`user:<uuid>`), the member set of a group (`group:<uuid>#member`),
//! or a folder acting as the subject of a `parent` edge
//! (`folder:<uuid>`). Refs round-trip through their wire form via
//! `Display`/`FromStr`; malformed refs surface as validation errors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use trove_core::error::AppError;

/// Types an object reference may point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    /// A user account.
    User,
    /// A sharing group.
    Group,
    /// A folder in the workspace tree.
    Folder,
    /// A file.
    File,
}

impl ObjectType {
    /// The wire name of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Group => "group",
            Self::Folder => "folder",
            Self::File => "file",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "group" => Ok(Self::Group),
            "folder" => Ok(Self::Folder),
            "file" => Ok(Self::File),
            _ => Err(AppError::validation(format!("Unknown object type: '{s}'"))),
        }
    }
}

/// The canonical relation vocabulary.
///
/// Stored relations (`owner`, `viewer`, `writer`, `parent`, `member`,
/// `admin`) are the only ones ever written as tuples. The `can_*`
/// relations are computed by the authorization model and only appear in
/// checks and reverse queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Creator of the object; full control.
    Owner,
    /// Read-level grant.
    Viewer,
    /// Write-level grant.
    Writer,
    /// Tree edge: subject folder is the container of the object.
    Parent,
    /// Group membership.
    Member,
    /// Group administration.
    Admin,
    /// Computed: may read content / see listings.
    CanRead,
    /// Computed: may modify content.
    CanWrite,
    /// Computed: may re-share the object.
    CanShare,
    /// Computed: may create files/folders inside.
    CanCreateFile,
    /// Computed: may invite members to the group.
    CanInvite,
    /// Computed: may view the group roster.
    CanView,
}

impl Relation {
    /// The wire name of this relation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Viewer => "viewer",
            Self::Writer => "writer",
            Self::Parent => "parent",
            Self::Member => "member",
            Self::Admin => "admin",
            Self::CanRead => "can_read",
            Self::CanWrite => "can_write",
            Self::CanShare => "can_share",
            Self::CanCreateFile => "can_create_file",
            Self::CanInvite => "can_invite",
            Self::CanView => "can_view",
        }
    }

    /// Whether this relation may be written as a stored tuple.
    pub fn is_stored(&self) -> bool {
        matches!(
            self,
            Self::Owner | Self::Viewer | Self::Writer | Self::Parent | Self::Member | Self::Admin
        )
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Relation {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "viewer" => Ok(Self::Viewer),
            "writer" => Ok(Self::Writer),
            "parent" => Ok(Self::Parent),
            "member" => Ok(Self::Member),
            "admin" => Ok(Self::Admin),
            "can_read" => Ok(Self::CanRead),
            "can_write" => Ok(Self::CanWrite),
            "can_share" => Ok(Self::CanShare),
            "can_create_file" => Ok(Self::CanCreateFile),
            "can_invite" => Ok(Self::CanInvite),
            "can_view" => Ok(Self::CanView),
            _ => Err(AppError::validation(format!("Unknown relation: '{s}'"))),
        }
    }
}

/// The subject side of a tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectRef {
    /// A single user.
    User(Uuid),
    /// The member set of a group: every current and future member.
    GroupMembers(Uuid),
    /// A folder, as the subject of a `parent` edge.
    Folder(Uuid),
}

impl SubjectRef {
    /// Subject ref for a user uuid.
    pub fn user(uuid: Uuid) -> Self {
        Self::User(uuid)
    }

    /// Subject ref for a group's member set.
    pub fn group_members(uuid: Uuid) -> Self {
        Self::GroupMembers(uuid)
    }
}

impl fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{id}"),
            Self::GroupMembers(id) => write!(f, "group:{id}#member"),
            Self::Folder(id) => write!(f, "folder:{id}"),
        }
    }
}

impl FromStr for SubjectRef {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::validation(format!("Malformed subject ref: '{s}'"));

        if let Some(rest) = s.strip_prefix("user:") {
            let id = Uuid::parse_str(rest).map_err(|_| invalid())?;
            return Ok(Self::User(id));
        }
        if let Some(rest) = s.strip_prefix("group:") {
            let rest = rest.strip_suffix("#member").ok_or_else(invalid)?;
            let id = Uuid::parse_str(rest).map_err(|_| invalid())?;
            return Ok(Self::GroupMembers(id));
        }
        if let Some(rest) = s.strip_prefix("folder:") {
            let id = Uuid::parse_str(rest).map_err(|_| invalid())?;
            return Ok(Self::Folder(id));
        }
        Err(invalid())
    }
}

/// The object side of a tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    /// The object's type.
    pub object_type: ObjectType,
    /// The object's public uuid.
    pub id: Uuid,
}

impl ObjectRef {
    /// Build an object ref.
    pub fn new(object_type: ObjectType, id: Uuid) -> Self {
        Self { object_type, id }
    }

    /// Object ref for a folder.
    pub fn folder(id: Uuid) -> Self {
        Self::new(ObjectType::Folder, id)
    }

    /// Object ref for a file.
    pub fn file(id: Uuid) -> Self {
        Self::new(ObjectType::File, id)
    }

    /// Object ref for a group.
    pub fn group(id: Uuid) -> Self {
        Self::new(ObjectType::Group, id)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.object_type, self.id)
    }
}

impl FromStr for ObjectRef {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ty, id) = s
            .split_once(':')
            .ok_or_else(|| AppError::validation(format!("Malformed object ref: '{s}'")))?;
        let object_type = ty.parse::<ObjectType>()?;
        let id = Uuid::parse_str(id)
            .map_err(|_| AppError::validation(format!("Malformed object ref: '{s}'")))?;
        Ok(Self { object_type, id })
    }
}

/// A complete relationship fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationTuple {
    /// Who holds the relation.
    pub subject: SubjectRef,
    /// The relation held.
    pub relation: Relation,
    /// What it is held on.
    pub object: ObjectRef,
}

impl RelationTuple {
    /// Build a tuple.
    pub fn new(subject: SubjectRef, relation: Relation, object: ObjectRef) -> Self {
        Self {
            subject,
            relation,
            object,
        }
    }
}

impl fmt::Display for RelationTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.relation, self.object)
    }
}
