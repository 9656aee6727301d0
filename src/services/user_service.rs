use sea_orm::{ActiveValue::NotSet, Set};
use validator::Validate;

use crate::error::PortfolioError;
use crate::models::dto::{UserCreate, UserUpdate};
use crate::models::users;

pub struct UserService;

impl UserService {
    pub fn new_user(request: UserCreate) -> Result<users::ActiveModel, PortfolioError> {
        request.validate()?;

        Ok(users::ActiveModel {
            id: NotSet,
            username: Set(request.username),
            email: Set(request.email),
            full_name: Set(request.full_name),
            is_active: Set(true),
            ..Default::default()
        })
    }

    /// Seuls les champs fournis sont modifiés
    pub fn apply_update(user: users::Model, request: UserUpdate) -> Result<users::ActiveModel, PortfolioError> {
        request.validate()?;

        let mut active: users::ActiveModel = user.into();
        if let Some(username) = request.username {
            active.username = Set(username);
        }
        if let Some(email) = request.email {
            active.email = Set(email);
        }
        if let Some(full_name) = request.full_name {
            active.full_name = Set(full_name);
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }
        Ok(active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sea_orm::ActiveValue::Unchanged;

    fn user() -> users::Model {
        let at = Utc.with_ymd_and_hms(2025, 11, 20, 9, 0, 0).unwrap();
        users::Model {
            id: 1,
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            full_name: "Jane Doe".to_string(),
            is_active: true,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_new_user() {
        let active = UserService::new_user(UserCreate {
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            full_name: "Jane Doe".to_string(),
        })
        .unwrap();
        assert_eq!(active.is_active, Set(true));
        assert_eq!(active.created_at, NotSet);

        let err = UserService::new_user(UserCreate {
            username: "jdoe".to_string(),
            email: "jdoe-at-example.com".to_string(),
            full_name: "Jane Doe".to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, PortfolioError::Validation(_)));
    }

    #[test]
    fn test_partial_update() {
        let active = UserService::apply_update(
            user(),
            UserUpdate {
                full_name: Some("Jane Q. Doe".to_string()),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(active.full_name, Set("Jane Q. Doe".to_string()));
        assert_eq!(active.is_active, Set(false));
        assert_eq!(active.username, Unchanged("jdoe".to_string()));
        assert_eq!(active.email, Unchanged("jdoe@example.com".to_string()));
    }
}
