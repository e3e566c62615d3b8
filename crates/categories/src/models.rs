use common::{EntryKind, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Category {
    pub id: i64,
    pub user_id: UserId,
    pub name: String,
    pub kind: EntryKind,
    pub color: String,
    pub icon: Option<String>,
    pub description: Option<String>,
}

// Raw input struct for deserialization (CreateCategoryRequest has private fields)
#[derive(Deserialize)]
pub struct RawCreateCategoryRequest {
    pub name: String,
    pub kind: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateCategoryRequest {
    user_id: UserId,
    name: String,
    kind: EntryKind,
    color: String,
    icon: Option<String>,
    description: Option<String>,
}

impl CreateCategoryRequest {
    pub fn new(
        user_id: UserId,
        name: String,
        kind: &str,
        color: String,
        icon: Option<String>,
        description: Option<String>,
    ) -> Result<Self, String> {
        if name.trim().is_empty() {
            return Err("Category name cannot be empty".to_string());
        }
        let kind = kind.parse::<EntryKind>()?;

        Ok(Self {
            user_id,
            name: name.trim().to_string(),
            kind,
            color,
            icon: icon.filter(|s| !s.trim().is_empty()),
            description: description.filter(|s| !s.trim().is_empty()),
        })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Categories every new account starts with: (name, kind, color, icon).
pub const DEFAULT_CATEGORIES: &[(&str, EntryKind, &str, &str)] = &[
    ("Salary", EntryKind::Income, "#10B981", "💰"),
    ("Other income", EntryKind::Income, "#3B82F6", "💵"),
    ("Food & drinks", EntryKind::Expense, "#EF4444", "🍔"),
    ("Transport", EntryKind::Expense, "#F59E0B", "🚗"),
    ("Education", EntryKind::Expense, "#8B5CF6", "📚"),
    ("Entertainment", EntryKind::Expense, "#EC4899", "🎮"),
    ("Shopping", EntryKind::Expense, "#06B6D4", "🛍️"),
    ("Health", EntryKind::Expense, "#84CC16", "🏥"),
    ("Bills", EntryKind::Expense, "#F97316", "📄"),
    ("Other", EntryKind::Expense, "#6B7280", "📦"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_category_request_valid() {
        let req = CreateCategoryRequest::new(1, " Groceries ".to_string(), "EXPENSE", "#ffffff".to_string(), None, None).unwrap();
        assert_eq!(req.name(), "Groceries");
        assert_eq!(req.color(), "#ffffff");
        assert_eq!(req.kind(), EntryKind::Expense);
    }

    #[test]
    fn test_create_category_request_empty() {
        assert!(CreateCategoryRequest::new(1, "   ".to_string(), "EXPENSE", "#ffffff".to_string(), None, None).is_err());
    }

    #[test]
    fn test_create_category_request_bad_kind() {
        assert!(CreateCategoryRequest::new(1, "Rent".to_string(), "SPENDING", "#ffffff".to_string(), None, None).is_err());
    }

    #[test]
    fn test_blank_optional_fields_are_dropped() {
        let req = CreateCategoryRequest::new(1, "Rent".to_string(), "EXPENSE", "#000".to_string(), Some("  ".into()), Some("".into())).unwrap();
        assert_eq!(req.icon(), None);
        assert_eq!(req.description(), None);
    }
}
