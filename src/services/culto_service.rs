// src/services/culto_service.rs
use super::{content::extract_youtube_id, validate_form};
use crate::{
    backend::{decode_rows, Query},
    cache::QueryKey,
    error::{AppError, AppResult},
    models::{
        culto::{Culto, CultoForm, CultoInput},
        non_empty,
    },
    state::Store,
};
use serde::Deserialize;

const TABLE: &str = "cultos";

// Todas as consultas que uma escrita em cultos pode afetar
const AFFECTED: &[&str] = &[
    "cultos",
    "culto",
    "cultos-years",
    "recent-cultos",
    "admin-cultos",
    "admin-cultos-count",
];

pub const RECENT_LIMIT: usize = 3;

/// Cultos publicados, do mais recente para o mais antigo, opcionalmente de um só ano.
pub async fn list_published(store: &Store, year: Option<i32>) -> AppResult<Vec<Culto>> {
    let mut query = Query::new().eq("published", true);
    if let Some(year) = year {
        query = query.eq("year", year);
    }
    store
        .cached_rows(
            QueryKey::new("cultos").with_opt(year),
            TABLE,
            query.order("date", false),
            None,
        )
        .await
}

/// Culto publicado pelo id. Inexistente ou não publicado resolve para `None`.
pub async fn find_published(store: &Store, id: &str) -> AppResult<Option<Culto>> {
    let query = Query::new().eq("id", id).eq("published", true).limit(1);
    let rows: Vec<Culto> = store
        .cached_rows(QueryKey::new("culto").with(id), TABLE, query, None)
        .await?;
    Ok(rows.into_iter().next())
}

#[derive(Deserialize)]
struct YearRow {
    #[serde(default)]
    year: Option<i32>,
}

/// Anos com cultos publicados (filtro do arquivo), sem repetições, mais recente primeiro.
pub async fn published_years(store: &Store) -> AppResult<Vec<i32>> {
    let query = Query::new()
        .columns(&["year"])
        .eq("published", true)
        .order("year", false);
    let rows: Vec<YearRow> = store
        .cached_rows(QueryKey::new("cultos-years"), TABLE, query, None)
        .await?;
    let mut years: Vec<i32> = rows.into_iter().filter_map(|r| r.year).collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    Ok(years)
}

/// Últimos cultos publicados (página inicial).
pub async fn recent(store: &Store, limit: usize) -> AppResult<Vec<Culto>> {
    let query = Query::new()
        .eq("published", true)
        .order("date", false)
        .limit(limit);
    store
        .cached_rows(QueryKey::new("recent-cultos").with(limit), TABLE, query, None)
        .await
}

// --- Administração ---

/// Todos os cultos, publicados ou não.
pub async fn list_all(store: &Store, auth: &str) -> AppResult<Vec<Culto>> {
    store
        .cached_rows(
            QueryKey::new("admin-cultos"),
            TABLE,
            Query::new().order("date", false),
            Some(auth),
        )
        .await
}

pub async fn find_by_id(store: &Store, id: &str, auth: &str) -> AppResult<Option<Culto>> {
    let rows = store
        .backend
        .select(TABLE, &Query::new().eq("id", id).limit(1), Some(auth))
        .await?;
    Ok(decode_rows::<Culto>(rows)?.into_iter().next())
}

pub async fn count_all(store: &Store, auth: &str) -> AppResult<u64> {
    store
        .cached_count(QueryKey::new("admin-cultos-count"), TABLE, Some(auth))
        .await
}

/// Valida e normaliza o formulário (ID do vídeo extraído da URL, ano tirado da data).
fn input_from_form(form: &CultoForm) -> AppResult<CultoInput> {
    validate_form(form)?;
    let date = form
        .parsed_date()
        .ok_or_else(|| AppError::Validation("Data inválida.".to_string()))?;
    let video_id = non_empty(&extract_youtube_id(&form.video_id));
    Ok(form.to_input(date, video_id))
}

pub async fn create(store: &Store, form: &CultoForm, auth: &str) -> AppResult<Culto> {
    let input = input_from_form(form)?;
    let row = store
        .backend
        .insert(TABLE, serde_json::to_value(&input)?, Some(auth))
        .await?;
    store.cache.invalidate_all(AFFECTED).await;
    let culto: Culto = serde_json::from_value(row)?;
    tracing::info!("Culto criado: {} ({})", culto.title, culto.id);
    Ok(culto)
}

pub async fn update(store: &Store, id: &str, form: &CultoForm, auth: &str) -> AppResult<Culto> {
    let input = input_from_form(form)?;
    let row = store
        .backend
        .update(TABLE, id, serde_json::to_value(&input)?, Some(auth))
        .await?;
    store.cache.invalidate_all(AFFECTED).await;
    tracing::info!("Culto atualizado: {}", id);
    Ok(serde_json::from_value(row)?)
}

pub async fn delete(store: &Store, id: &str, auth: &str) -> AppResult<()> {
    store.backend.delete(TABLE, id, Some(auth)).await?;
    store.cache.invalidate_all(AFFECTED).await;
    tracing::info!("Culto removido: {}", id);
    Ok(())
}
