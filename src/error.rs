// src/error.rs
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // Erro devolvido pelo backend (mensagem original preservada)
    #[error("{message}")]
    Backend { status: u16, message: String },

    #[error("Falha de comunicação com o backend: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Resposta inesperada do backend: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Erro de variável de ambiente: {0}")]
    EnvVarError(#[from] std::env::VarError),

    #[error("Configuração inválida: {0}")]
    Config(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Erro na sessão: {0}")]
    SessionError(String),

    #[error("Sessão expirada")]
    SessionExpired,

    #[error("Erro ao renderizar página: {0}")]
    Render(#[from] askama::Error),

    #[error("Dados inválidos: {0}")]
    Validation(String),

    #[error("Falha no envio do arquivo: {0}")]
    Upload(String),

    #[error("Não encontrado")]
    NotFound,

    #[error("Erro interno inesperado")]
    InternalServerError,

    #[error("Não autorizado")]
    Unauthorized,

    #[error("Acesso negado")]
    Forbidden,
}

impl AppError {
    /// Mensagem mostrada ao utilizador numa notificação.
    /// Erros do backend passam a mensagem tal como veio.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Backend { message, .. } => message.clone(),
            AppError::Validation(msg) | AppError::Upload(msg) => msg.clone(),
            AppError::InvalidCredentials => "E-mail ou senha inválidos.".to_string(),
            AppError::SessionExpired => "Sua sessão expirou. Faça login novamente.".to_string(),
            AppError::Http(_) => "Não foi possível contactar o servidor.".to_string(),
            AppError::NotFound => "Registro não encontrado.".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!("Erro processado: {:?}", self);

        let (status, user_message) = match &self {
            AppError::SessionExpired | AppError::Unauthorized => {
                return Redirect::to("/admin/login").into_response();
            }
            AppError::Backend { status, .. } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                "Erro ao aceder aos dados.",
            ),
            AppError::Http(_) | AppError::Decode(_) => {
                (StatusCode::BAD_GATEWAY, "Erro ao aceder aos dados.")
            }
            AppError::EnvVarError(_) | AppError::Config(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Erro de configuração.")
            }
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos."),
            AppError::SessionError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Erro na gestão da sua sessão.")
            }
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "Dados inválidos."),
            AppError::Upload(_) => (StatusCode::BAD_REQUEST, "Falha no envio do arquivo."),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Página não encontrada."),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Acesso restrito."),
            AppError::Render(_) | AppError::InternalServerError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        (status, Html(format!(r#"
            <!DOCTYPE html><html lang="pt-BR"><head><meta charset="utf-8"><title>Erro</title><style>body{{font-family:sans-serif;}}</style></head>
            <body><h1>Erro {status_code}</h1><p>{message}</p><a href="/">Voltar ao site</a></body></html>
         "#, status_code = status.as_u16(), message = user_message))).into_response()
    }
}

// Tipo Result padrão para a aplicação
pub type AppResult<T = ()> = Result<T, AppError>;
