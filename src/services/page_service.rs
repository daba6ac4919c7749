// src/services/page_service.rs
use super::validate_form;
use crate::{
    backend::{decode_rows, Query},
    cache::QueryKey,
    error::{AppError, AppResult},
    models::page::{Page, PageForm, PageInput},
    state::Store,
};
use unicode_normalization::UnicodeNormalization;

const TABLE: &str = "pages";

const AFFECTED: &[&str] = &["admin-pages", "menu-pages", "pages", "page"];

/// Rótulo do grupo das páginas sem menu pai (lista do admin).
pub const NO_MENU_LABEL: &str = "Sem Menu";

/// Slug de URL a partir de um título: minúsculas, sem acentos, só `[a-z0-9-]`.
pub fn slugify(title: &str) -> String {
    let plain: String = title
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect::<String>()
        .to_lowercase();

    let mut slug = String::with_capacity(plain.len());
    let mut pending_dash = false;
    for c in plain.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

pub async fn list_published(store: &Store) -> AppResult<Vec<Page>> {
    let query = Query::new().eq("published", true).order("menu_order", true);
    store
        .cached_rows(QueryKey::new("pages"), TABLE, query, None)
        .await
}

/// Páginas publicadas e visíveis no menu, pela ordem de menu.
pub async fn menu_pages(store: &Store) -> AppResult<Vec<Page>> {
    let query = Query::new()
        .eq("published", true)
        .eq("show_in_menu", true)
        .order("menu_order", true);
    store
        .cached_rows(QueryKey::new("menu-pages"), TABLE, query, None)
        .await
}

pub async fn find_by_slug(store: &Store, slug: &str) -> AppResult<Option<Page>> {
    let query = Query::new().eq("slug", slug).eq("published", true).limit(1);
    let rows: Vec<Page> = store
        .cached_rows(QueryKey::new("page").with(slug), TABLE, query, None)
        .await?;
    Ok(rows.into_iter().next())
}

pub async fn list_all(store: &Store, auth: &str) -> AppResult<Vec<Page>> {
    let query = Query::new().order("parent_menu", true).order("menu_order", true);
    store
        .cached_rows(QueryKey::new("admin-pages"), TABLE, query, Some(auth))
        .await
}

pub async fn find_by_id(store: &Store, id: &str, auth: &str) -> AppResult<Option<Page>> {
    let rows = store
        .backend
        .select(TABLE, &Query::new().eq("id", id).limit(1), Some(auth))
        .await?;
    Ok(decode_rows::<Page>(rows)?.into_iter().next())
}

pub async fn count_all(store: &Store, auth: &str) -> AppResult<u64> {
    store
        .cached_count(QueryKey::new("admin-pages-count"), TABLE, Some(auth))
        .await
}

/// Agrupa a lista do admin pelo menu pai, mantendo a ordem de chegada dos grupos.
pub fn group_by_menu(pages: &[Page]) -> Vec<(String, Vec<&Page>)> {
    let mut groups: Vec<(String, Vec<&Page>)> = Vec::new();
    for page in pages {
        let label = page.menu_group().unwrap_or(NO_MENU_LABEL);
        match groups.iter_mut().find(|(name, _)| name == label) {
            Some((_, items)) => items.push(page),
            None => groups.push((label.to_string(), vec![page])),
        }
    }
    groups
}

fn input_from_form(form: &PageForm) -> AppResult<PageInput> {
    validate_form(form)?;
    // Slug em branco é gerado a partir do título; um slug digitado também é normalizado
    let source = if form.slug.trim().is_empty() {
        &form.title
    } else {
        &form.slug
    };
    let slug = slugify(source);
    if slug.is_empty() {
        return Err(AppError::Validation(
            "Não foi possível gerar um endereço a partir do título.".to_string(),
        ));
    }
    Ok(form.to_input(slug))
}

pub async fn create(store: &Store, form: &PageForm, auth: &str) -> AppResult<Page> {
    let input = input_from_form(form)?;
    let row = store
        .backend
        .insert(TABLE, serde_json::to_value(&input)?, Some(auth))
        .await?;
    store.cache.invalidate_all(AFFECTED).await;
    let page: Page = serde_json::from_value(row)?;
    tracing::info!("Página criada: /pagina/{}", page.slug);
    Ok(page)
}

pub async fn update(store: &Store, id: &str, form: &PageForm, auth: &str) -> AppResult<Page> {
    let input = input_from_form(form)?;
    let row = store
        .backend
        .update(TABLE, id, serde_json::to_value(&input)?, Some(auth))
        .await?;
    store.cache.invalidate_all(AFFECTED).await;
    tracing::info!("Página atualizada: {}", id);
    Ok(serde_json::from_value(row)?)
}

pub async fn delete(store: &Store, id: &str, auth: &str) -> AppResult<()> {
    store.backend.delete(TABLE, id, Some(auth)).await?;
    store.cache.invalidate_all(AFFECTED).await;
    tracing::info!("Página removida: {}", id);
    Ok(())
}
