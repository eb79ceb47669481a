//! Controlador de autenticación
//!
//! Registro y login de usuarios con bcrypt y emisión de JWT.

use validator::Validate;

use crate::config::environment::EnvironmentConfig;
use crate::dto::auth_dto::{LoginRequest, RegisterRequest, TokenResponse};
use crate::middleware::auth::generate_jwt_token;
use crate::repositories::user_repository::UserRepository;
use crate::state::AppState;
use crate::utils::errors::{conflict_error, AppError};

pub struct AuthController {
    repository: UserRepository,
    config: EnvironmentConfig,
}

impl AuthController {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            repository: UserRepository::new(state.pool.clone()),
            config: state.config.clone(),
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<TokenResponse, AppError> {
        request.validate()?;

        if self.repository.find_by_email(&request.email).await?.is_some() {
            return Err(conflict_error("User", "email", &request.email));
        }

        let password_hash = bcrypt::hash(&request.password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::Hash(e.to_string()))?;

        let user = self
            .repository
            .create(request.name, request.email, password_hash)
            .await?;

        log::info!("✅ Usuario {} registrado", user.id);
        let token = generate_jwt_token(user.id, &self.config)?;
        Ok(TokenResponse { token })
    }

    pub async fn login(&self, request: LoginRequest) -> Result<TokenResponse, AppError> {
        request.validate()?;

        let user = self
            .repository
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Credenciales inválidas".to_string()))?;

        let valid = bcrypt::verify(&request.password, &user.password_hash)
            .map_err(|e| AppError::Hash(e.to_string()))?;
        if !valid {
            return Err(AppError::Unauthorized("Credenciales inválidas".to_string()));
        }

        let token = generate_jwt_token(user.id, &self.config)?;
        Ok(TokenResponse { token })
    }
}
