use crate::models::{Category, CreateCategoryRequest, RawCreateCategoryRequest, DEFAULT_CATEGORIES};
use crate::repository::CategoryRepository;
use common::UserId;
use database::{RepositoryError, Database};
use tracing::instrument;
use rand::seq::SliceRandom;

#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Database error: {0}")]
    Infrastructure(String),
    #[error("Category already exists: {0}")]
    Conflict(String),
    #[error("Category not found")]
    NotFound,
}

impl From<RepositoryError> for CategoryError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => CategoryError::NotFound,
            RepositoryError::UniqueViolation(msg) => CategoryError::Conflict(msg),
            RepositoryError::Infrastructure(e) => CategoryError::Infrastructure(e.to_string()),
            _ => CategoryError::Infrastructure(err.to_string()),
        }
    }
}

const PASTEL_COLORS: &[&str] = &[
    "#FFB3BA", "#FFDFBA", "#FFFFBA", "#BAFFC9", "#BAE1FF",
    "#E2F0CB", "#FDFD96", "#FFC3A0", "#FFD1DC", "#D4F0F0",
    "#CCE2CB", "#B6CFB6", "#97C1A9", "#FCB7AF", "#FFDAC1",
    "#E7FFAC", "#FFABAB", "#D5AAFF", "#85E3FF", "#B9F6CA",
];

pub struct CategoryService;

impl CategoryService {
    fn get_random_pastel_color() -> String {
        let mut rng = rand::thread_rng();
        PASTEL_COLORS.choose(&mut rng).unwrap_or(&"#FFFFFF").to_string()
    }

    #[instrument(skip(db, raw), fields(name = %raw.name))]
    pub async fn create_category(
        db: &Database,
        user_id: UserId,
        raw: RawCreateCategoryRequest,
    ) -> Result<Category, CategoryError> {
        let color = raw
            .color
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(Self::get_random_pastel_color);
        let req = CreateCategoryRequest::new(user_id, raw.name, &raw.kind, color, raw.icon, raw.description)
            .map_err(CategoryError::InvalidInput)?;

        let mut uow = db.begin().await?;
        let mut repo = CategoryRepository::new(uow.connection());

        let id = repo.create(&req).await?;
        let category = repo.find_for_user(user_id, id).await?
            .ok_or(CategoryError::NotFound)?;

        uow.commit().await?;

        Ok(category)
    }

    #[instrument(skip(db))]
    pub async fn list_categories(db: &Database, user_id: UserId) -> Result<Vec<Category>, CategoryError> {
        let mut uow = db.begin().await?;
        let mut repo = CategoryRepository::new(uow.connection());

        let categories = repo.list_for_user(user_id).await?;

        Ok(categories)
    }

    /// Looks up a category the user owns. A category belonging to someone
    /// else is reported as `NotFound`.
    #[instrument(skip(db))]
    pub async fn get_owned_category(db: &Database, user_id: UserId, id: i64) -> Result<Category, CategoryError> {
        let mut uow = db.begin().await?;
        let mut repo = CategoryRepository::new(uow.connection());

        let category = repo.find_for_user(user_id, id).await?
            .ok_or(CategoryError::NotFound)?;

        Ok(category)
    }

    /// Inserts [`DEFAULT_CATEGORIES`] for a freshly registered user inside the
    /// caller's unit of work.
    #[instrument(skip(conn))]
    pub async fn seed_default_categories(
        conn: &mut database::Connection,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        let mut repo = CategoryRepository::new(conn);
        for (name, kind, color, icon) in DEFAULT_CATEGORIES {
            let req = CreateCategoryRequest::new(
                user_id,
                name.to_string(),
                kind.as_str(),
                color.to_string(),
                Some(icon.to_string()),
                None,
            )
            .map_err(RepositoryError::Decode)?;
            repo.create(&req).await?;
        }
        Ok(())
    }
}
