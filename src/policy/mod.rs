//! Role-based access control.
//!
//! Every permission decision in the API is made by [`authorize`], a pure
//! function over the caller's [`Principal`] and the owner context of the
//! target resource. Handlers and services never re-implement policy; they
//! build a [`Resource`] from plain data and require an allow before touching
//! protected fields.
//!
//! List endpoints go through [`visibility`] instead: they return the subset
//! of a collection the principal may see rather than an all-or-nothing
//! decision.

pub mod visibility;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::utils::errors::AppError;

/// The three roles a user account can hold.
///
/// The set is closed at every boundary: the database column is a PostgreSQL
/// enum, request bodies deserialize through serde, and [`Role::from_str`]
/// rejects anything else. An unrecognized role can therefore never reach a
/// policy decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Parent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Parent => "parent",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "parent" => Ok(Role::Parent),
            other => Err(anyhow::anyhow!("Invalid role: {}", other)),
        }
    }
}

/// The authenticated caller for the current request.
///
/// Constructed once per request by the session extractor and passed
/// explicitly through every service call; there is no ambient request state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
    pub email: String,
}

/// CRUD verb being attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    List,
}

/// Ownership context of a student record, the pivot of all health-domain
/// visibility: a parent owns a student through `parent_email`, a teacher
/// through membership in the student's class group.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StudentAccess {
    pub parent_email: String,
    pub teacher_ids: Vec<Uuid>,
}

impl StudentAccess {
    pub fn visible_to(&self, principal: &Principal) -> bool {
        match principal.role {
            Role::Admin => true,
            Role::Teacher => self.teacher_ids.contains(&principal.id),
            Role::Parent => self.parent_email == principal.email,
        }
    }

    /// Whether the principal is a teacher assigned to this student's class
    /// group. Used for health-record mutation, which is stricter than read
    /// visibility.
    pub fn taught_by(&self, principal: &Principal) -> bool {
        principal.role == Role::Teacher && self.teacher_ids.contains(&principal.id)
    }
}

/// The target of an authorization check, carrying only the owner context the
/// decision needs. `None` instance context means the action has no existing
/// target (Create).
#[derive(Debug, Clone)]
pub enum Resource<'a> {
    Student(Option<&'a StudentAccess>),
    /// A class group, identified by its member teacher ids.
    ClassGroup(Option<&'a [Uuid]>),
    /// A user account, identified by the target user's id.
    User(Option<Uuid>),
    /// A health-domain record (health data, medical history, test result).
    /// The owner context is always the parent student.
    HealthRecord(&'a StudentAccess),
    /// Reference data (allergy catalog, test catalog): readable by any
    /// authenticated user, managed by admins.
    Catalog,
}

/// Outcome of an authorization check. Deny is an ordinary value, not an
/// error; [`Decision::require`] converts it at the facade boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(&'static str),
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Map a deny to the uniform Forbidden response. The reason never names
    /// the target, so a denied caller learns nothing about whether it exists.
    pub fn require(self) -> Result<(), AppError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(AppError::forbidden(anyhow::anyhow!("{}", reason))),
        }
    }
}

/// Error for a target row that does not exist. Admins, whose authorization
/// already passed, learn it is missing; everyone else gets the same uniform
/// Forbidden an existing-but-invisible row produces, so a denied caller
/// cannot probe for existence.
pub fn not_found_for(principal: &Principal, noun: &str) -> AppError {
    if principal.role == Role::Admin {
        AppError::not_found(anyhow::anyhow!("{} not found", noun))
    } else {
        AppError::forbidden(anyhow::anyhow!("Not accessible"))
    }
}

/// Decide whether `principal` may perform `action` on `resource`.
///
/// Deterministic and side-effect free. Rules are evaluated in precedence
/// order; the first match wins. Anonymous callers never reach this function:
/// the session extractor rejects them before any handler runs.
pub fn authorize(principal: &Principal, action: Action, resource: Resource<'_>) -> Decision {
    use Action::*;

    // Admins may do everything.
    if principal.role == Role::Admin {
        return Decision::Allow;
    }

    match (resource, action) {
        // Users are self-service: a caller may read, update, or delete their
        // own account. Creating or listing accounts is admin business.
        (Resource::User(Some(target_id)), Read | Update | Delete)
            if target_id == principal.id =>
        {
            Decision::Allow
        }
        (Resource::User(_), _) => Decision::Deny("Not the account owner and not an admin"),

        // Class groups are managed by admins; assigned teachers may read
        // their own groups.
        (Resource::ClassGroup(Some(teachers)), Read | List)
            if principal.role == Role::Teacher && teachers.contains(&principal.id) =>
        {
            Decision::Allow
        }
        (Resource::ClassGroup(_), Create | Update | Delete) => {
            Decision::Deny("Only admins manage class groups")
        }
        (Resource::ClassGroup(_), _) => Decision::Deny("Not accessible"),

        // Any authenticated role may register a student.
        (Resource::Student(_), Create) => Decision::Allow,
        (Resource::Student(Some(access)), Read | List) if access.visible_to(principal) => {
            Decision::Allow
        }
        (Resource::Student(Some(_)), Read | List) => Decision::Deny("Not accessible"),
        (Resource::Student(_), _) => Decision::Deny("Only admins modify students"),

        // Health-domain records inherit the student's visibility for reads;
        // writes additionally require a teacher assigned to the student.
        (Resource::HealthRecord(access), Read | List) if access.visible_to(principal) => {
            Decision::Allow
        }
        (Resource::HealthRecord(access), Create | Update | Delete)
            if access.taught_by(principal) =>
        {
            Decision::Allow
        }
        (Resource::HealthRecord(_), _) => Decision::Deny("Not accessible"),

        (Resource::Catalog, Read | List) => Decision::Allow,
        (Resource::Catalog, _) => Decision::Deny("Only admins manage reference data"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> Principal {
        Principal {
            id: Uuid::new_v4(),
            role,
            email: format!("{}@test.com", role),
        }
    }

    fn access_for(parent_email: &str, teacher_ids: Vec<Uuid>) -> StudentAccess {
        StudentAccess {
            parent_email: parent_email.to_string(),
            teacher_ids,
        }
    }

    const ALL_ACTIONS: [Action; 5] = [
        Action::Create,
        Action::Read,
        Action::Update,
        Action::Delete,
        Action::List,
    ];

    #[test]
    fn admin_is_allowed_everything() {
        let admin = principal(Role::Admin);
        let access = access_for("p@x.com", vec![]);
        let teachers: [Uuid; 0] = [];

        for action in ALL_ACTIONS {
            for resource in [
                Resource::Student(Some(&access)),
                Resource::ClassGroup(Some(&teachers)),
                Resource::User(Some(Uuid::new_v4())),
                Resource::HealthRecord(&access),
                Resource::Catalog,
            ] {
                assert!(
                    authorize(&admin, action, resource).is_allow(),
                    "admin denied {:?}",
                    action
                );
            }
        }
    }

    #[test]
    fn user_self_service() {
        let parent = principal(Role::Parent);

        for action in [Action::Read, Action::Update, Action::Delete] {
            assert!(authorize(&parent, action, Resource::User(Some(parent.id))).is_allow());
            assert!(!authorize(&parent, action, Resource::User(Some(Uuid::new_v4()))).is_allow());
        }
        assert!(!authorize(&parent, Action::Create, Resource::User(None)).is_allow());
        assert!(!authorize(&parent, Action::List, Resource::User(None)).is_allow());
    }

    #[test]
    fn teacher_reads_only_member_class_groups() {
        let teacher = principal(Role::Teacher);
        let own = [teacher.id];
        let other = [Uuid::new_v4()];

        assert!(authorize(&teacher, Action::Read, Resource::ClassGroup(Some(&own))).is_allow());
        assert!(!authorize(&teacher, Action::Read, Resource::ClassGroup(Some(&other))).is_allow());
        assert!(!authorize(&teacher, Action::Update, Resource::ClassGroup(Some(&own))).is_allow());
        assert!(!authorize(&teacher, Action::Delete, Resource::ClassGroup(Some(&own))).is_allow());
        assert!(!authorize(&teacher, Action::Create, Resource::ClassGroup(None)).is_allow());
    }

    #[test]
    fn parent_never_reads_class_groups() {
        let parent = principal(Role::Parent);
        let teachers = [Uuid::new_v4()];
        assert!(!authorize(&parent, Action::Read, Resource::ClassGroup(Some(&teachers))).is_allow());
    }

    #[test]
    fn any_authenticated_role_creates_students() {
        for role in [Role::Admin, Role::Teacher, Role::Parent] {
            assert!(authorize(&principal(role), Action::Create, Resource::Student(None)).is_allow());
        }
    }

    #[test]
    fn parent_reads_but_never_updates_own_child() {
        let parent = principal(Role::Parent);
        let access = access_for(&parent.email, vec![]);

        assert!(authorize(&parent, Action::Read, Resource::Student(Some(&access))).is_allow());
        assert!(!authorize(&parent, Action::Update, Resource::Student(Some(&access))).is_allow());
        assert!(!authorize(&parent, Action::Delete, Resource::Student(Some(&access))).is_allow());
    }

    #[test]
    fn teacher_reads_students_of_own_class_only() {
        let teacher = principal(Role::Teacher);
        let own = access_for("p@x.com", vec![teacher.id]);
        let other = access_for("p@x.com", vec![Uuid::new_v4()]);

        assert!(authorize(&teacher, Action::Read, Resource::Student(Some(&own))).is_allow());
        assert!(!authorize(&teacher, Action::Read, Resource::Student(Some(&other))).is_allow());
        assert!(!authorize(&teacher, Action::Update, Resource::Student(Some(&own))).is_allow());
    }

    #[test]
    fn health_records_follow_student_visibility_for_reads() {
        let parent = principal(Role::Parent);
        let own = access_for(&parent.email, vec![]);
        let other = access_for("someone-else@x.com", vec![]);

        assert!(authorize(&parent, Action::Read, Resource::HealthRecord(&own)).is_allow());
        assert!(!authorize(&parent, Action::Read, Resource::HealthRecord(&other)).is_allow());
    }

    #[test]
    fn health_record_mutation_requires_assigned_teacher() {
        let teacher = principal(Role::Teacher);
        let parent = principal(Role::Parent);
        let assigned = access_for(&parent.email, vec![teacher.id]);
        let unassigned = access_for(&parent.email, vec![Uuid::new_v4()]);

        for action in [Action::Create, Action::Update, Action::Delete] {
            assert!(authorize(&teacher, action, Resource::HealthRecord(&assigned)).is_allow());
            assert!(!authorize(&teacher, action, Resource::HealthRecord(&unassigned)).is_allow());
            // A parent can read their child's records but never writes them.
            assert!(!authorize(&parent, action, Resource::HealthRecord(&assigned)).is_allow());
        }
    }

    #[test]
    fn catalogs_readable_by_all_managed_by_admin() {
        for role in [Role::Teacher, Role::Parent] {
            let p = principal(role);
            assert!(authorize(&p, Action::List, Resource::Catalog).is_allow());
            assert!(authorize(&p, Action::Read, Resource::Catalog).is_allow());
            assert!(!authorize(&p, Action::Create, Resource::Catalog).is_allow());
            assert!(!authorize(&p, Action::Delete, Resource::Catalog).is_allow());
        }
    }

    #[test]
    fn deny_maps_to_forbidden() {
        let err = Decision::Deny("nope").require().unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Admin, Role::Teacher, Role::Parent] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("student".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }
}
