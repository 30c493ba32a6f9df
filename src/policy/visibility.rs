//! Role-scoped collection filtering for list endpoints.
//!
//! Filters are pure functions of the principal and the input collection and
//! preserve input order. A role with no access to a collection gets an empty
//! result, never an error.

use uuid::Uuid;

use super::{Principal, Role};

/// A row whose visibility is derived from its (owning) student: the student
/// rows themselves and every health-domain row joined with its student's
/// owner context.
pub trait StudentScoped {
    fn parent_email(&self) -> &str;
    fn teacher_ids(&self) -> &[Uuid];
}

/// A row carrying a class group's member teacher set.
pub trait TeacherSet {
    fn teacher_ids(&self) -> &[Uuid];
}

/// Students (and student-scoped records) visible to the principal: all for
/// admins, class-group members for teachers, own children for parents.
pub fn filter_students<T: StudentScoped>(principal: &Principal, all: Vec<T>) -> Vec<T> {
    match principal.role {
        Role::Admin => all,
        Role::Teacher => all
            .into_iter()
            .filter(|row| row.teacher_ids().contains(&principal.id))
            .collect(),
        Role::Parent => all
            .into_iter()
            .filter(|row| row.parent_email() == principal.email)
            .collect(),
    }
}

/// Class groups visible to the principal. Parents have no class-group view.
pub fn filter_class_groups<T: TeacherSet>(principal: &Principal, all: Vec<T>) -> Vec<T> {
    match principal.role {
        Role::Admin => all,
        Role::Teacher => all
            .into_iter()
            .filter(|row| row.teacher_ids().contains(&principal.id))
            .collect(),
        Role::Parent => Vec::new(),
    }
}

/// User accounts are only listable by admins.
pub fn filter_users<T>(principal: &Principal, all: Vec<T>) -> Vec<T> {
    match principal.role {
        Role::Admin => all,
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Row {
        name: &'static str,
        parent_email: &'static str,
        teacher_ids: Vec<Uuid>,
    }

    impl StudentScoped for Row {
        fn parent_email(&self) -> &str {
            self.parent_email
        }
        fn teacher_ids(&self) -> &[Uuid] {
            &self.teacher_ids
        }
    }

    impl TeacherSet for Row {
        fn teacher_ids(&self) -> &[Uuid] {
            &self.teacher_ids
        }
    }

    fn principal(role: Role, email: &str) -> Principal {
        Principal {
            id: Uuid::new_v4(),
            role,
            email: email.to_string(),
        }
    }

    #[test]
    fn admin_sees_everything() {
        let admin = principal(Role::Admin, "a@x.com");
        let rows = vec![
            Row {
                name: "s1",
                parent_email: "p1@x.com",
                teacher_ids: vec![],
            },
            Row {
                name: "s2",
                parent_email: "p2@x.com",
                teacher_ids: vec![],
            },
        ];
        let visible = filter_students(&admin, rows);
        assert_eq!(visible.len(), 2);
    }

    #[test]
    fn parent_sees_exactly_own_children() {
        let parent = principal(Role::Parent, "a@x.com");
        let rows = vec![
            Row {
                name: "mine",
                parent_email: "a@x.com",
                teacher_ids: vec![],
            },
            Row {
                name: "other",
                parent_email: "b@x.com",
                teacher_ids: vec![],
            },
            Row {
                name: "mine-too",
                parent_email: "a@x.com",
                teacher_ids: vec![],
            },
        ];
        let visible = filter_students(&parent, rows);
        assert_eq!(
            visible.iter().map(|r| r.name).collect::<Vec<_>>(),
            vec!["mine", "mine-too"]
        );
    }

    #[test]
    fn teacher_sees_students_of_assigned_groups_only() {
        let teacher = principal(Role::Teacher, "t@x.com");
        let rows = vec![
            Row {
                name: "s1",
                parent_email: "p@x.com",
                teacher_ids: vec![teacher.id],
            },
            Row {
                name: "s2",
                parent_email: "p@x.com",
                teacher_ids: vec![Uuid::new_v4()],
            },
        ];
        let visible = filter_students(&teacher, rows);
        assert_eq!(visible.iter().map(|r| r.name).collect::<Vec<_>>(), vec!["s1"]);
    }

    #[test]
    fn filter_preserves_input_order() {
        let teacher = principal(Role::Teacher, "t@x.com");
        let rows = vec![
            Row {
                name: "c",
                parent_email: "p@x.com",
                teacher_ids: vec![teacher.id],
            },
            Row {
                name: "a",
                parent_email: "p@x.com",
                teacher_ids: vec![teacher.id],
            },
            Row {
                name: "b",
                parent_email: "p@x.com",
                teacher_ids: vec![teacher.id],
            },
        ];
        let visible = filter_students(&teacher, rows);
        assert_eq!(
            visible.iter().map(|r| r.name).collect::<Vec<_>>(),
            vec!["c", "a", "b"]
        );
    }

    #[test]
    fn parents_have_no_class_group_view() {
        let parent = principal(Role::Parent, "a@x.com");
        let rows = vec![Row {
            name: "g1",
            parent_email: "",
            teacher_ids: vec![],
        }];
        assert!(filter_class_groups(&parent, rows).is_empty());
    }

    #[test]
    fn teacher_lists_only_member_groups() {
        let teacher = principal(Role::Teacher, "t@x.com");
        let rows = vec![
            Row {
                name: "g1",
                parent_email: "",
                teacher_ids: vec![teacher.id],
            },
            Row {
                name: "g2",
                parent_email: "",
                teacher_ids: vec![Uuid::new_v4()],
            },
        ];
        let visible = filter_class_groups(&teacher, rows);
        assert_eq!(visible.iter().map(|r| r.name).collect::<Vec<_>>(), vec!["g1"]);
    }

    #[test]
    fn only_admins_list_users() {
        let rows = || vec![1, 2, 3];
        assert_eq!(
            filter_users(&principal(Role::Admin, "a@x.com"), rows()).len(),
            3
        );
        assert!(filter_users(&principal(Role::Teacher, "t@x.com"), rows()).is_empty());
        assert!(filter_users(&principal(Role::Parent, "p@x.com"), rows()).is_empty());
    }
}
