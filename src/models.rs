/// Soft-delete state. A row is either live or in the trash; when trashed,
/// the timestamp is always present and the deleting account may be recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum Trash {
    Active,
    Trashed { at: String, by: Option<i64> },
}

impl Trash {
    pub fn from_row(trashed: bool, at: Option<String>, by: Option<i64>) -> Self {
        if trashed {
            Trash::Trashed {
                at: at.unwrap_or_default(),
                by,
            }
        } else {
            Trash::Active
        }
    }

    pub fn is_trashed(&self) -> bool {
        matches!(self, Trash::Trashed { .. })
    }
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub role: String,
}

impl User {
    /// Label shown on reports: the full name when set, else the username.
    /// Quickly-provisioned accounts often have no full name.
    pub fn display_name(&self) -> &str {
        display_name(&self.full_name, &self.username)
    }
}

pub fn display_name<'a>(full_name: &'a str, username: &'a str) -> &'a str {
    if full_name.trim().is_empty() {
        username
    } else {
        full_name
    }
}

/// A row in either the part catalog or the operator-name roster; the two
/// tables share the same shape.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub id: i64,
    pub name: String,
    pub sort_order: i64,
    pub is_active: bool,
    pub trash: Trash,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Sheet {
    pub id: i64,
    pub operator_id: i64,
    pub work_date: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
    pub trash: Trash,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_prefers_full_name() {
        assert_eq!(display_name("Ana Souza", "ana"), "Ana Souza");
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        assert_eq!(display_name("", "ana"), "ana");
        assert_eq!(display_name("   ", "ana"), "ana");
    }

    #[test]
    fn test_trash_from_row() {
        assert_eq!(Trash::from_row(false, None, None), Trash::Active);
        let t = Trash::from_row(true, Some("2026-01-05 10:00:00".into()), Some(2));
        assert!(t.is_trashed());
        assert_eq!(
            t,
            Trash::Trashed { at: "2026-01-05 10:00:00".into(), by: Some(2) }
        );
    }
}
