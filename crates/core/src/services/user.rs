//! User service: registration, login and profile edits.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use paws_common::{AppError, AppResult, GeoPoint, IdGenerator, geo::DEFAULT_LOCATION};
use paws_db::{
    entities::user::{self, UserRole, VetAvailability},
    repositories::UserRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use super::token::TokenService;

/// Specialization recorded for vets who do not name one.
const DEFAULT_SPECIALIZATION: &str = "General";

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    tokens: TokenService,
    id_gen: IdGenerator,
}

/// Input for registering a new account.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 6, max = 128))]
    pub password: String,

    /// Defaults to `public`.
    pub role: Option<UserRole>,

    #[validate(length(max = 32))]
    pub phone: Option<String>,

    pub lat: Option<f64>,
    pub lng: Option<f64>,

    #[validate(length(max = 256))]
    pub clinic_name: Option<String>,

    #[validate(length(max = 128))]
    pub specialization: Option<String>,
}

/// Input for logging in.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(length(min = 1))]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Self-service profile edit. The role is not editable.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 256))]
    pub name: Option<String>,

    #[validate(length(max = 32))]
    pub phone: Option<String>,

    pub lat: Option<f64>,
    pub lng: Option<f64>,

    pub is_available: Option<bool>,

    // Vet profile; ignored for other roles.
    #[validate(length(max = 256))]
    pub clinic_name: Option<String>,

    #[validate(length(max = 128))]
    pub specialization: Option<String>,

    #[validate(range(min = 0, max = 80))]
    pub experience: Option<i32>,

    pub vet_availability: Option<VetAvailability>,

    #[validate(length(max = 64))]
    pub emergency_contact: Option<String>,

    #[validate(url)]
    pub website: Option<String>,
}

/// A signed-in user and their session token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user: user::Model,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, tokens: TokenService) -> Self {
        Self {
            user_repo,
            tokens,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new account and sign it in.
    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthSession> {
        input.validate()?;

        let role = input.role.unwrap_or(UserRole::Public);
        if role == UserRole::Admin {
            return Err(AppError::Forbidden(
                "Admin accounts cannot be self-registered".to_string(),
            ));
        }

        let email = input.email.trim().to_lowercase();
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::BadRequest("Email already registered".to_string()));
        }

        let location = resolve_location(input.lat, input.lng)?.unwrap_or(DEFAULT_LOCATION);
        let password_hash = hash_password(&input.password)?;
        let is_vet = role == UserRole::Vet;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name.trim().to_string()),
            email: Set(email),
            password_hash: Set(password_hash),
            role: Set(role),
            lat: Set(location.lat),
            lng: Set(location.lng),
            phone: Set(non_empty(input.phone)),
            is_available: Set(true),
            points: Set(0),
            rescue_count: Set(0),
            clinic_name: Set(if is_vet { non_empty(input.clinic_name) } else { None }),
            specialization: Set(is_vet.then(|| {
                non_empty(input.specialization)
                    .unwrap_or_else(|| DEFAULT_SPECIALIZATION.to_string())
            })),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, role = %user.role.as_str(), "Registered user");

        let token = self.tokens.issue(&user)?;
        Ok(AuthSession { token, user })
    }

    /// Check credentials and sign the user in.
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthSession> {
        input.validate()?;

        let user = self
            .user_repo
            .find_by_email(&input.email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        let token = self.tokens.issue(&user)?;
        Ok(AuthSession { token, user })
    }

    /// Resolve a session token to the current user row.
    pub async fn authenticate(&self, token: &str) -> AppResult<user::Model> {
        let claims = self.tokens.verify(token)?;
        self.user_repo
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Apply a self-service profile edit.
    pub async fn update_profile(
        &self,
        user: &user::Model,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let location = resolve_location(input.lat, input.lng)?;
        let mut active: user::ActiveModel = user.clone().into();

        if let Some(name) = non_empty(input.name) {
            active.name = Set(name);
        }
        if let Some(phone) = input.phone {
            active.phone = Set(non_empty(Some(phone)));
        }
        if let Some(point) = location {
            active.lat = Set(point.lat);
            active.lng = Set(point.lng);
        }
        if let Some(is_available) = input.is_available {
            active.is_available = Set(is_available);
        }

        if user.role == UserRole::Vet {
            if let Some(clinic_name) = non_empty(input.clinic_name) {
                active.clinic_name = Set(Some(clinic_name));
            }
            if let Some(specialization) = non_empty(input.specialization) {
                active.specialization = Set(Some(specialization));
            }
            if let Some(experience) = input.experience {
                active.experience = Set(Some(experience));
            }
            if let Some(availability) = input.vet_availability {
                active.vet_availability = Set(Some(availability));
            }
            if let Some(contact) = non_empty(input.emergency_contact) {
                active.emergency_contact = Set(Some(contact));
            }
            if let Some(website) = non_empty(input.website) {
                active.website = Set(Some(website));
            }
        }

        active.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(active).await
    }
}

/// Both coordinates or neither; a lone coordinate is rejected.
fn resolve_location(lat: Option<f64>, lng: Option<f64>) -> AppResult<Option<GeoPoint>> {
    match (lat, lng) {
        (None, None) => Ok(None),
        (Some(lat), Some(lng)) => GeoPoint::new(lat, lng)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest("Coordinates out of range".to_string())),
        _ => Err(AppError::BadRequest(
            "Latitude and longitude must be given together".to_string(),
        )),
    }
}

/// Trim and drop empty strings.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
