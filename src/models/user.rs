// src/models/user.rs
use serde::{Deserialize, Serialize};
use validator::Validate;

// Utilizador autenticado no serviço de auth do backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

// Sessão devolvida pelo login (token bearer para as chamadas seguintes)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: AuthUser,
}

// Linha da tabela 'user_roles' (só "admin" é modelado)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRole {
    pub user_id: String,
    pub role: String,
}

pub const ADMIN_ROLE: &str = "admin";

/// Entrar ou criar conta no formulário de login.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginMode {
    #[default]
    Signin,
    Signup,
}

// Struct para dados do formulário de login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Informe um e-mail válido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter pelo menos 6 caracteres."))]
    pub password: String,
    #[serde(default)]
    pub mode: LoginMode,
}

// Formulário "Adicionar Administrador"
#[derive(Debug, Deserialize, Validate)]
pub struct AddAdminForm {
    #[validate(email(message = "Informe um e-mail válido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter pelo menos 6 caracteres."))]
    pub password: String,
}
