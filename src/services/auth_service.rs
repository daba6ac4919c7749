// src/services/auth_service.rs
//! Estado de autenticação guardado na sessão do servidor.
//!
//! `handle_event` é o único ponto que escreve o estado; `current_status` só lê
//! (e volta a tentar a verificação de admin enquanto ela estiver pendente).

use super::validate_form;
use crate::{
    backend::Query,
    error::{AppError, AppResult},
    models::user::{AddAdminForm, AuthSession, AuthUser, LoginForm, UserRole, ADMIN_ROLE},
    state::Store,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

const SESSION_KEY: &str = "auth";
const ROLES_TABLE: &str = "user_roles";

/// O que fica guardado na sessão após o login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSnapshot {
    pub access_token: String,
    pub user: AuthUser,
    // None: a verificação de admin ainda não teve resposta
    pub is_admin: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthStatus {
    Loading,
    Unauthenticated,
    Authenticated { user: AuthUser },
    Admin { user: AuthUser },
}

impl AuthStatus {
    fn from_snapshot(snapshot: Option<&AuthSnapshot>) -> Self {
        match snapshot {
            None => AuthStatus::Unauthenticated,
            Some(s) => match s.is_admin {
                None => AuthStatus::Loading,
                Some(false) => AuthStatus::Authenticated { user: s.user.clone() },
                Some(true) => AuthStatus::Admin { user: s.user.clone() },
            },
        }
    }

    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            AuthStatus::Authenticated { user } | AuthStatus::Admin { user } => Some(user),
            _ => None,
        }
    }
}

pub enum AuthEvent {
    SignedIn(AuthSession),
    SignedOut,
}

fn session_error(e: tower_sessions::session::Error) -> AppError {
    tracing::error!("Erro na sessão: {:?}", e);
    AppError::SessionError(e.to_string())
}

pub async fn snapshot(session: &Session) -> AppResult<Option<AuthSnapshot>> {
    session
        .get::<AuthSnapshot>(SESSION_KEY)
        .await
        .map_err(session_error)
}

/// Token do utilizador com sessão aberta (para chamadas autenticadas ao backend).
pub async fn access_token(session: &Session) -> AppResult<Option<String>> {
    Ok(snapshot(session).await?.map(|s| s.access_token))
}

/// Existe uma linha "admin" em `user_roles` para este utilizador?
pub async fn check_admin(store: &Store, user_id: &str, token: &str) -> AppResult<bool> {
    let query = Query::new().eq("user_id", user_id).eq("role", ADMIN_ROLE);
    let total = store.backend.count(ROLES_TABLE, &query, Some(token)).await?;
    tracing::debug!("Verificação de admin para {}: {}", user_id, total > 0);
    Ok(total > 0)
}

/// O backend ainda aceita o token guardado na sessão?
pub async fn token_is_valid(store: &Store, session: &Session) -> AppResult<bool> {
    let Some(token) = access_token(session).await? else {
        return Ok(false);
    };
    match store.backend.get_user(&token).await {
        Ok(user) => Ok(user.is_some()),
        Err(e) => {
            tracing::warn!("Não foi possível validar o token: {}", e);
            Ok(false)
        }
    }
}

/// Único ponto de escrita do estado de autenticação.
pub async fn handle_event(store: &Store, session: &Session, event: AuthEvent) -> AppResult<AuthStatus> {
    match event {
        AuthEvent::SignedIn(auth) => {
            // Novo ID de sessão a cada login
            session.cycle_id().await.map_err(session_error)?;
            let is_admin = match check_admin(store, &auth.user.id, &auth.access_token).await {
                Ok(flag) => Some(flag),
                Err(e) => {
                    tracing::warn!("Verificação de admin falhou, estado fica pendente: {}", e);
                    None
                }
            };
            let snapshot = AuthSnapshot {
                access_token: auth.access_token,
                user: auth.user,
                is_admin,
            };
            session
                .insert(SESSION_KEY, &snapshot)
                .await
                .map_err(session_error)?;
            Ok(AuthStatus::from_snapshot(Some(&snapshot)))
        }
        AuthEvent::SignedOut => {
            session.flush().await.map_err(session_error)?;
            Ok(AuthStatus::Unauthenticated)
        }
    }
}

/// Estado atual. Com a verificação de admin pendente tenta-a de novo uma vez.
pub async fn current_status(store: &Store, session: &Session) -> AppResult<AuthStatus> {
    let Some(mut snap) = snapshot(session).await? else {
        return Ok(AuthStatus::Unauthenticated);
    };
    if snap.is_admin.is_none() {
        match check_admin(store, &snap.user.id, &snap.access_token).await {
            Ok(flag) => {
                snap.is_admin = Some(flag);
                session
                    .insert(SESSION_KEY, &snap)
                    .await
                    .map_err(session_error)?;
            }
            Err(AppError::SessionExpired) => {
                tracing::info!("Token expirado para {}, encerrando sessão", snap.user.id);
                return handle_event(store, session, AuthEvent::SignedOut).await;
            }
            Err(e) => tracing::warn!("Verificação de admin ainda sem resposta: {}", e),
        }
    }
    Ok(AuthStatus::from_snapshot(Some(&snap)))
}

pub async fn sign_in(store: &Store, session: &Session, form: &LoginForm) -> AppResult<AuthStatus> {
    validate_form(form)?;
    let auth = store.backend.sign_in(form.email.trim(), &form.password).await?;
    tracing::info!("Login realizado: {}", auth.user.id);
    handle_event(store, session, AuthEvent::SignedIn(auth)).await
}

pub async fn sign_up(store: &Store, form: &LoginForm) -> AppResult<AuthUser> {
    validate_form(form)?;
    let user = store.backend.sign_up(form.email.trim(), &form.password).await?;
    tracing::info!("Conta criada: {}", user.id);
    Ok(user)
}

pub async fn sign_out(store: &Store, session: &Session) -> AppResult<()> {
    if let Some(token) = access_token(session).await? {
        // Mesmo que o backend falhe, a sessão local termina
        if let Err(e) = store.backend.sign_out(&token).await {
            tracing::warn!("Falha ao terminar a sessão no backend: {}", e);
        }
    }
    handle_event(store, session, AuthEvent::SignedOut).await?;
    tracing::info!("Sessão encerrada");
    Ok(())
}

/// Cria uma conta e dá-lhe o papel de administrador.
pub async fn add_admin(store: &Store, form: &AddAdminForm, auth: &str) -> AppResult<AuthUser> {
    validate_form(form)?;
    let user = store.backend.sign_up(form.email.trim(), &form.password).await?;
    let role = UserRole {
        user_id: user.id.clone(),
        role: ADMIN_ROLE.to_string(),
    };
    store
        .backend
        .insert(ROLES_TABLE, serde_json::to_value(&role)?, Some(auth))
        .await?;
    tracing::info!("Administrador adicionado: {}", user.id);
    Ok(user)
}
