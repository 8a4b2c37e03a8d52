//! Embedded in-memory tuple store with model evaluation.
//!
//! Implements the same authorization model the external service is
//! configured with, so development and tests observe identical
//! decisions:
//!
//! - folder: `viewer ⊇ owner ∪ writer ∪ viewer(parent)`,
//!   `writer ⊇ owner ∪ writer(parent)`, `can_read = viewer`,
//!   `can_write = writer`, `can_create_file = writer`,
//!   `can_share = owner`
//! - file: as folder, inheriting from its parent folder
//! - group: `member`/`admin`/`owner` direct, `can_invite = owner ∪ admin`,
//!   `can_view = member ∪ admin ∪ owner`
//! - a `group:<uuid>#member` subject matches any user currently holding
//!   `member` on that group

use std::collections::HashSet;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::GatewayError;
use crate::tuple::{ObjectRef, ObjectType, Relation, RelationTuple, SubjectRef};

use super::TupleBackend;

/// In-memory tuple set indexed by object.
#[derive(Debug, Default)]
pub struct MemoryTupleBackend {
    tuples: DashMap<ObjectRef, HashSet<(SubjectRef, Relation)>>,
}

impl MemoryTupleBackend {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored (subject, relation) pairs on an object, copied out so no
    /// map guard is held across recursive evaluation.
    fn entries(&self, object: &ObjectRef) -> Vec<(SubjectRef, Relation)> {
        self.tuples
            .get(object)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Whether a stored tuple grants `relation` on `object` to `user`,
    /// either directly or through a group member set.
    fn has_direct(&self, user: &SubjectRef, relation: Relation, object: &ObjectRef) -> bool {
        let mut expanded = HashSet::new();
        self.has_direct_inner(user, relation, object, &mut expanded)
    }

    /// `expanded` holds the groups whose member sets have already been
    /// opened, so mutually-referencing member tuples terminate.
    fn has_direct_inner(
        &self,
        user: &SubjectRef,
        relation: Relation,
        object: &ObjectRef,
        expanded: &mut HashSet<ObjectRef>,
    ) -> bool {
        for (subject, rel) in self.entries(object) {
            if rel != relation {
                continue;
            }
            if subject == *user {
                return true;
            }
            if let SubjectRef::GroupMembers(group_id) = subject {
                let group = ObjectRef::group(group_id);
                if expanded.insert(group)
                    && self.has_direct_inner(user, Relation::Member, &group, expanded)
                {
                    return true;
                }
            }
        }
        false
    }

    /// The parent container of an object, if a `parent` edge exists.
    fn parent_of(&self, object: &ObjectRef) -> Option<ObjectRef> {
        self.entries(object)
            .into_iter()
            .find_map(|(subject, rel)| match (subject, rel) {
                (SubjectRef::Folder(id), Relation::Parent) => Some(ObjectRef::folder(id)),
                _ => None,
            })
    }

    /// Recursive model evaluation with a visited set so even a
    /// malformed (cyclic) parent graph terminates.
    fn eval(
        &self,
        user: &SubjectRef,
        relation: Relation,
        object: &ObjectRef,
        visited: &mut HashSet<(Relation, ObjectRef)>,
    ) -> bool {
        if !visited.insert((relation, *object)) {
            return false;
        }

        use ObjectType::{File, Folder, Group};
        use Relation::*;

        match (object.object_type, relation) {
            (_, CanRead) => self.eval(user, Viewer, object, visited),
            (_, CanWrite) => self.eval(user, Writer, object, visited),
            (Folder | File, CanShare) => self.eval(user, Owner, object, visited),
            (Folder, CanCreateFile) => self.eval(user, Writer, object, visited),
            (Group, CanInvite) => {
                self.eval(user, Owner, object, visited) || self.eval(user, Admin, object, visited)
            }
            (Group, CanView) => {
                self.eval(user, Member, object, visited)
                    || self.eval(user, Admin, object, visited)
                    || self.eval(user, Owner, object, visited)
            }
            (Folder | File, Viewer) => {
                self.has_direct(user, Viewer, object)
                    || self.eval(user, Owner, object, visited)
                    || self.eval(user, Writer, object, visited)
                    || self
                        .parent_of(object)
                        .is_some_and(|parent| self.eval(user, Viewer, &parent, visited))
            }
            (Folder | File, Writer) => {
                self.has_direct(user, Writer, object)
                    || self.eval(user, Owner, object, visited)
                    || self
                        .parent_of(object)
                        .is_some_and(|parent| self.eval(user, Writer, &parent, visited))
            }
            _ => self.has_direct(user, relation, object),
        }
    }
}

#[async_trait]
impl TupleBackend for MemoryTupleBackend {
    async fn ready(&self) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn write(&self, tuple: &RelationTuple) -> Result<(), GatewayError> {
        // HashSet insert makes duplicate writes a no-op.
        self.tuples
            .entry(tuple.object)
            .or_default()
            .insert((tuple.subject, tuple.relation));
        Ok(())
    }

    async fn delete(&self, tuple: &RelationTuple) -> Result<(), GatewayError> {
        let removed = self
            .tuples
            .get_mut(&tuple.object)
            .map(|mut set| set.remove(&(tuple.subject, tuple.relation)))
            .unwrap_or(false);

        if removed {
            Ok(())
        } else {
            Err(GatewayError::NotFound)
        }
    }

    async fn check(
        &self,
        subject: &SubjectRef,
        relation: Relation,
        object: &ObjectRef,
    ) -> Result<bool, GatewayError> {
        let mut visited = HashSet::new();
        Ok(self.eval(subject, relation, object, &mut visited))
    }

    async fn list_objects(
        &self,
        subject: &SubjectRef,
        relation: Relation,
        object_type: ObjectType,
    ) -> Result<Vec<ObjectRef>, GatewayError> {
        let candidates: Vec<ObjectRef> = self
            .tuples
            .iter()
            .map(|entry| *entry.key())
            .filter(|object| object.object_type == object_type)
            .collect();

        let mut accessible = Vec::new();
        for object in candidates {
            let mut visited = HashSet::new();
            if self.eval(subject, relation, &object, &mut visited) {
                accessible.push(object);
            }
        }
        Ok(accessible)
    }
}
