// src/web/admin_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        site_config::{ConfigSection, SiteConfig},
        user::AddAdminForm,
    },
    services::{
        auth_service, config_service, culto_service, estudo_service, page_service, photo_service,
    },
    state::AppState,
    templates::{AdminChrome, AdminConfigPage, ConfigSectionView, DashboardPage},
    web::{admin_chrome, flash::Flash, mw_auth::SignedInUser, notify, render, upload},
};
use axum::{
    extract::{Extension, Form, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use futures_util::future::join4;
use std::collections::HashMap;
use tower_cookies::Cookies;

const CONFIG_PATH: &str = "/admin/configuracoes";

fn count_label(result: AppResult<u64>, what: &str) -> String {
    match result {
        Ok(total) => total.to_string(),
        Err(e) => {
            tracing::error!("Erro ao contar {}: {}", what, e);
            "-".to_string()
        }
    }
}

// GET /admin
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
) -> AppResult<impl IntoResponse> {
    let store = &state.store;
    let (cultos, estudos, paginas, fotos) = join4(
        culto_service::count_all(store, &user.token),
        estudo_service::count_all(store, &user.token),
        page_service::count_all(store, &user.token),
        photo_service::count_all(store, &user.token),
    )
    .await;

    let page = DashboardPage {
        chrome: admin_chrome(&state, &cookies, &user, "/admin"),
        cultos: count_label(cultos, "cultos"),
        estudos: count_label(estudos, "estudos"),
        paginas: count_label(paginas, "páginas"),
        fotos: count_label(fotos, "fotos"),
    };
    render(&page)
}

fn config_page(chrome: AdminChrome, config: &SiteConfig, error: Option<String>) -> AdminConfigPage {
    AdminConfigPage {
        chrome,
        sections: ConfigSection::ALL
            .iter()
            .map(|section| ConfigSectionView {
                title: section.title().to_string(),
                fields: config.fields_in(*section),
            })
            .collect(),
        hero_image_url: config.hero_image_url.clone(),
        error,
    }
}

// GET /admin/configuracoes
pub async fn show_config(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
) -> AppResult<impl IntoResponse> {
    let config = config_service::load(&state.store).await;
    let chrome = admin_chrome(&state, &cookies, &user, CONFIG_PATH);
    render(&config_page(chrome, &config, None))
}

// POST /admin/configuracoes
pub async fn save_config(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
    Form(form): Form<HashMap<String, String>>,
) -> AppResult<Response> {
    let config = config_service::merge_form(config_service::load(&state.store).await, form);
    match config_service::save(&state.store, &config, &user.token).await {
        Ok(()) => {
            notify(&state, &cookies, Flash::success("Configurações salvas com sucesso!"));
            Ok(Redirect::to(CONFIG_PATH).into_response())
        }
        Err(e) => {
            // Formulário volta com o que foi digitado
            let chrome = admin_chrome(&state, &cookies, &user, CONFIG_PATH);
            let page = config_page(chrome, &config, Some(e.user_message()));
            Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&page)?).into_response())
        }
    }
}

// POST /admin/configuracoes/imagem (multipart, campo "file")
pub async fn upload_hero_image(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
    multipart: Multipart,
) -> AppResult<Redirect> {
    let result = async {
        let form = upload::read_upload_form(multipart).await?;
        let file = form
            .files
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Upload("Selecione uma imagem.".to_string()))?;
        let url = config_service::upload_hero_image(&state.store, file, &user.token).await?;
        let mut config = config_service::load(&state.store).await;
        config.hero_image_url = url;
        config_service::save(&state.store, &config, &user.token).await
    }
    .await;

    let flash = match result {
        Ok(()) => Flash::success("Imagem de fundo atualizada!"),
        Err(e) => Flash::error(e.user_message()),
    };
    notify(&state, &cookies, flash);
    Ok(Redirect::to(CONFIG_PATH))
}

// POST /admin/configuracoes/admins
pub async fn add_admin(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
    Form(form): Form<AddAdminForm>,
) -> AppResult<Redirect> {
    let flash = match auth_service::add_admin(&state.store, &form, &user.token).await {
        Ok(added) => Flash::success(format!(
            "Administrador {} adicionado.",
            added.email.unwrap_or(form.email)
        )),
        Err(e) => Flash::error(e.user_message()),
    };
    notify(&state, &cookies, flash);
    Ok(Redirect::to(CONFIG_PATH))
}
