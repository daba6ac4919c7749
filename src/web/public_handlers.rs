// src/web/public_handlers.rs
use crate::{
    error::AppResult,
    models::photo::PhotoCategory,
    services::{
        config_service, content, culto_service, estudo_service, menu, page_service, photo_service,
        schedule_service,
    },
    state::AppState,
    templates::{
        quick_links, AoVivoPage, ContactInfo, ContatoPage, CultoCard, CultoDetailPage, CultosPage,
        DynamicPage, EstudoCard, EstudoDetailPage, EstudosPage, GaleriaPage, HomePage, NavItem,
        NotFoundPage, OInicioPage, PhotoGroup, SiteChrome, SobrePage, ValueCard, VinteAnosPage,
        YearTab,
    },
    web::{flash, or_empty, render},
};
use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_cookies::Cookies;

/// Cabeçalho (menu composto), rodapé (configuração) e notificação pendente.
pub(crate) async fn site_chrome(state: &AppState, cookies: &Cookies, current: &str) -> SiteChrome {
    let config = config_service::load(&state.store).await;
    let pages = or_empty(page_service::menu_pages(&state.store).await, "páginas do menu");
    let menu = menu::compose_menu(menu::static_links(), &pages);
    SiteChrome {
        config,
        nav: NavItem::from_menu(&menu, current),
        flash: flash::take(cookies, &state.cookie_key),
    }
}

async fn not_found_page(
    state: &AppState,
    cookies: &Cookies,
    current: &str,
    title: &str,
    message: &str,
    back_href: &str,
    back_label: &str,
) -> AppResult<Response> {
    let page = NotFoundPage {
        chrome: site_chrome(state, cookies, current).await,
        title: title.to_string(),
        message: message.to_string(),
        back_href: back_href.to_string(),
        back_label: back_label.to_string(),
    };
    Ok((StatusCode::NOT_FOUND, render(&page)?).into_response())
}

// GET /
pub async fn home(State(state): State<AppState>, cookies: Cookies) -> AppResult<impl IntoResponse> {
    let recent = or_empty(
        culto_service::recent(&state.store, culto_service::RECENT_LIMIT).await,
        "cultos recentes",
    );
    let schedule = or_empty(schedule_service::list(&state.store).await, "programação");
    let page = HomePage {
        chrome: site_chrome(&state, &cookies, "/").await,
        recent: recent.iter().map(CultoCard::from).collect(),
        schedule,
        quick_links: quick_links(),
    };
    render(&page)
}

#[derive(Deserialize, Debug)]
pub struct CultosParams {
    ano: Option<String>,
}

// GET /cultos?ano=YYYY
pub async fn cultos(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(params): Query<CultosParams>,
) -> AppResult<impl IntoResponse> {
    let years = or_empty(culto_service::published_years(&state.store).await, "anos dos cultos");
    // Sem ano pedido (ou inválido) fica o mais recente
    let selected = params
        .ano
        .as_deref()
        .and_then(|a| a.trim().parse::<i32>().ok())
        .or_else(|| years.first().copied());
    let cultos = or_empty(culto_service::list_published(&state.store, selected).await, "cultos");

    let page = CultosPage {
        chrome: site_chrome(&state, &cookies, "/cultos").await,
        years: years
            .iter()
            .map(|y| YearTab {
                year: *y,
                active: Some(*y) == selected,
            })
            .collect(),
        cultos: cultos.iter().map(CultoCard::from).collect(),
    };
    render(&page)
}

// GET /cultos/{id}
pub async fn culto_detail(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let current = format!("/cultos/{}", id);
    let found = culto_service::find_published(&state.store, &id)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Erro ao carregar culto {}: {}", id, e);
            None
        });
    let Some(culto) = found else {
        return not_found_page(
            &state,
            &cookies,
            &current,
            "Culto não encontrado",
            "O culto que você procura não existe ou não está disponível.",
            "/cultos",
            "Voltar para Cultos",
        )
        .await;
    };

    let page = CultoDetailPage {
        chrome: site_chrome(&state, &cookies, "/cultos").await,
        embed_url: culto
            .video_id
            .as_deref()
            .map(content::embed_url)
            .unwrap_or_default(),
        description_html: culto
            .description
            .as_deref()
            .map(content::render_rich)
            .unwrap_or_default(),
        summary_html: culto
            .summary
            .as_deref()
            .map(content::render_rich)
            .unwrap_or_default(),
        teachings: culto.teachings.clone(),
        culto: CultoCard::from(&culto),
    };
    Ok(render(&page)?.into_response())
}

// GET /estudos
pub async fn estudos(State(state): State<AppState>, cookies: Cookies) -> AppResult<impl IntoResponse> {
    let estudos = or_empty(estudo_service::list_published(&state.store).await, "estudos");
    let page = EstudosPage {
        chrome: site_chrome(&state, &cookies, "/estudos").await,
        estudos: estudos.iter().map(EstudoCard::from).collect(),
    };
    render(&page)
}

// GET /estudos/{id}
pub async fn estudo_detail(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let found = estudo_service::find_published(&state.store, &id)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Erro ao carregar estudo {}: {}", id, e);
            None
        });
    let Some(estudo) = found else {
        return not_found_page(
            &state,
            &cookies,
            "/estudos",
            "Estudo não encontrado",
            "O estudo que você procura não existe ou não está disponível.",
            "/estudos",
            "Voltar para Estudos",
        )
        .await;
    };

    let page = EstudoDetailPage {
        chrome: site_chrome(&state, &cookies, "/estudos").await,
        content_html: estudo
            .content
            .as_deref()
            .map(content::render_rich)
            .unwrap_or_default(),
        estudo: EstudoCard::from(&estudo),
    };
    Ok(render(&page)?.into_response())
}

// GET /sobre
pub async fn sobre(State(state): State<AppState>, cookies: Cookies) -> AppResult<impl IntoResponse> {
    let chrome = site_chrome(&state, &cookies, "/sobre").await;
    let config = &chrome.config;
    let values = config
        .about_values()
        .into_iter()
        .filter(|(title, _)| !title.trim().is_empty())
        .map(|(title, description)| ValueCard { title, description })
        .collect();
    let page = SobrePage {
        history_html: content::render_rich(&config.about_history),
        mission_html: content::render_rich(&config.about_mission),
        vision_html: content::render_rich(&config.about_vision),
        values,
        chrome,
    };
    render(&page)
}

// GET /ao-vivo
pub async fn ao_vivo(State(state): State<AppState>, cookies: Cookies) -> AppResult<impl IntoResponse> {
    let embed_url = state
        .live_stream_channel
        .as_deref()
        .map(|channel| {
            format!(
                "https://www.youtube.com/embed/live_stream?channel={}",
                urlencoding::encode(channel)
            )
        })
        .unwrap_or_default();
    let page = AoVivoPage {
        chrome: site_chrome(&state, &cookies, "/ao-vivo").await,
        embed_url,
    };
    render(&page)
}

// GET /contato
pub async fn contato(State(state): State<AppState>, cookies: Cookies) -> AppResult<impl IntoResponse> {
    let chrome = site_chrome(&state, &cookies, "/contato").await;
    let page = ContatoPage {
        contact: ContactInfo::from_config(&chrome.config),
        chrome,
    };
    render(&page)
}

// GET /pagina/{slug}
pub async fn dynamic_page(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(slug): Path<String>,
) -> AppResult<Response> {
    let current = format!("/pagina/{}", slug);
    let found = page_service::find_by_slug(&state.store, &slug)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Erro ao carregar página {}: {}", slug, e);
            None
        });
    let Some(found) = found else {
        return not_found_page(
            &state,
            &cookies,
            &current,
            "Página não encontrada",
            "A página que você procura não existe ou foi removida.",
            "/",
            "Voltar ao início",
        )
        .await;
    };

    let page = DynamicPage {
        chrome: site_chrome(&state, &cookies, &current).await,
        hero_title: found.hero_title.clone().unwrap_or_else(|| found.title.clone()),
        hero_subtitle: found.hero_subtitle.clone().unwrap_or_default(),
        section_title: found.section_title.clone().unwrap_or_default(),
        section_subtitle: found.section_subtitle.clone().unwrap_or_default(),
        content_html: found
            .content
            .as_deref()
            .map(content::render_rich)
            .unwrap_or_default(),
    };
    Ok(render(&page)?.into_response())
}

// GET /galeria
pub async fn galeria(State(state): State<AppState>, cookies: Cookies) -> AppResult<impl IntoResponse> {
    let photos = or_empty(photo_service::list(&state.store, None).await, "fotos");
    let groups = photo_service::group_by_category(&photos)
        .into_iter()
        .map(|(category, items)| PhotoGroup {
            value: category.value().to_string(),
            label: category.label().to_string(),
            photos: items.into_iter().cloned().collect(),
        })
        .collect();
    let page = GaleriaPage {
        chrome: site_chrome(&state, &cookies, "/galeria").await,
        groups,
    };
    render(&page)
}

// GET /o-inicio
pub async fn o_inicio(State(state): State<AppState>, cookies: Cookies) -> AppResult<impl IntoResponse> {
    let page = OInicioPage {
        chrome: site_chrome(&state, &cookies, "/o-inicio").await,
    };
    render(&page)
}

// GET /vinte-anos
pub async fn vinte_anos(State(state): State<AppState>, cookies: Cookies) -> AppResult<impl IntoResponse> {
    let photos = or_empty(photo_service::list(&state.store, None).await, "fotos");
    let page = VinteAnosPage {
        chrome: site_chrome(&state, &cookies, "/vinte-anos").await,
        photo_count: photos.len(),
    };
    render(&page)
}

// Qualquer outro caminho
pub async fn not_found(
    State(state): State<AppState>,
    cookies: Cookies,
    OriginalUri(uri): OriginalUri,
) -> AppResult<Response> {
    tracing::debug!("404: {}", uri.path());
    not_found_page(
        &state,
        &cookies,
        uri.path(),
        "Página não encontrada",
        "O endereço que você acessou não existe.",
        "/",
        "Voltar ao início",
    )
    .await
}
