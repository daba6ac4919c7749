// src/web/routes.rs
use crate::{
    state::AppState,
    web::{
        admin_handlers, agenda_handlers, auth_handlers, culto_handlers, editor_handlers,
        estudo_handlers, mw_admin, mw_auth, page_handlers, photo_handlers, public_handlers,
        upload::MAX_UPLOAD_BYTES,
    },
};
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

pub fn create_router(app_state: AppState) -> Router {
    // --- Site público ---
    let public_routes = Router::new()
        .route("/", get(public_handlers::home))
        .route("/cultos", get(public_handlers::cultos))
        .route("/cultos/{id}", get(public_handlers::culto_detail))
        .route("/estudos", get(public_handlers::estudos))
        .route("/estudos/{id}", get(public_handlers::estudo_detail))
        .route("/sobre", get(public_handlers::sobre))
        .route("/ao-vivo", get(public_handlers::ao_vivo))
        .route("/contato", get(public_handlers::contato))
        .route("/pagina/{slug}", get(public_handlers::dynamic_page))
        .route("/galeria", get(public_handlers::galeria))
        .route("/o-inicio", get(public_handlers::o_inicio))
        .route("/vinte-anos", get(public_handlers::vinte_anos));

    // --- Login/logout (sem guarda) ---
    let auth_routes = Router::new()
        .route(
            "/admin/login",
            get(auth_handlers::show_login_form).post(auth_handlers::handle_login),
        )
        .route("/admin/logout", post(auth_handlers::handle_logout));

    // --- Administração ---
    // Exigem sessão E papel admin
    let admin_routes = Router::new()
        .route("/admin", get(admin_handlers::dashboard))
        // Cultos
        .route("/admin/cultos", get(culto_handlers::list))
        .route(
            "/admin/cultos/novo",
            get(culto_handlers::new_form).post(culto_handlers::create),
        )
        .route(
            "/admin/cultos/{id}/editar",
            get(culto_handlers::edit_form).post(culto_handlers::update),
        )
        .route(
            "/admin/cultos/{id}/excluir",
            get(culto_handlers::confirm_delete).post(culto_handlers::delete),
        )
        // Estudos
        .route("/admin/estudos", get(estudo_handlers::list))
        .route(
            "/admin/estudos/novo",
            get(estudo_handlers::new_form).post(estudo_handlers::create),
        )
        .route(
            "/admin/estudos/{id}/editar",
            get(estudo_handlers::edit_form).post(estudo_handlers::update),
        )
        .route(
            "/admin/estudos/{id}/excluir",
            get(estudo_handlers::confirm_delete).post(estudo_handlers::delete),
        )
        // Páginas
        .route("/admin/paginas", get(page_handlers::list))
        .route(
            "/admin/paginas/novo",
            get(page_handlers::new_form).post(page_handlers::create),
        )
        .route(
            "/admin/paginas/{id}/editar",
            get(page_handlers::edit_form).post(page_handlers::update),
        )
        .route(
            "/admin/paginas/{id}/excluir",
            get(page_handlers::confirm_delete).post(page_handlers::delete),
        )
        // Agenda
        .route("/admin/agenda", get(agenda_handlers::list))
        .route(
            "/admin/agenda/novo",
            get(agenda_handlers::new_form).post(agenda_handlers::create),
        )
        .route(
            "/admin/agenda/{id}/editar",
            get(agenda_handlers::edit_form).post(agenda_handlers::update),
        )
        .route(
            "/admin/agenda/{id}/excluir",
            get(agenda_handlers::confirm_delete).post(agenda_handlers::delete),
        )
        // Fotos (envio em lote)
        .route(
            "/admin/fotos",
            get(photo_handlers::list)
                .post(photo_handlers::upload_photos)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/admin/fotos/{id}/excluir",
            get(photo_handlers::confirm_delete).post(photo_handlers::delete),
        )
        // Configurações
        .route(
            "/admin/configuracoes",
            get(admin_handlers::show_config).post(admin_handlers::save_config),
        )
        .route(
            "/admin/configuracoes/imagem",
            post(admin_handlers::upload_hero_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/admin/configuracoes/admins", post(admin_handlers::add_admin))
        // Editor
        .route("/admin/editor/apply", post(editor_handlers::apply))
        .route("/admin/editor/preview", post(editor_handlers::preview))
        // mw_admin primeiro (interno), mw_auth por fora: corre antes e põe o SignedInUser
        .route_layer(middleware::from_fn(mw_admin::require_admin))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_auth::require_auth,
        ));

    // --- Router Final ---
    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(admin_routes)
        .fallback(public_handlers::not_found)
        .with_state(app_state)
}
