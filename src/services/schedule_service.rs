// src/services/schedule_service.rs
use super::validate_form;
use crate::{
    backend::{decode_rows, Query},
    cache::QueryKey,
    error::AppResult,
    models::schedule::{ScheduleForm, ScheduleItem},
    state::Store,
};

const TABLE: &str = "schedule";

const AFFECTED: &[&str] = &["schedule", "admin-schedule"];

/// Agenda semanal pela ordem definida no admin.
pub async fn list(store: &Store) -> AppResult<Vec<ScheduleItem>> {
    store
        .cached_rows(
            QueryKey::new("schedule"),
            TABLE,
            Query::new().order("order_index", true),
            None,
        )
        .await
}

/// Próximo índice: um acima do maior existente (1 com a tabela vazia).
/// Remoções não renumeram, por isso podem ficar buracos.
pub fn next_order_index(existing: &[ScheduleItem]) -> i64 {
    existing.iter().map(|i| i.order_index).max().unwrap_or(0) + 1
}

pub async fn create(store: &Store, form: &ScheduleForm, auth: &str) -> AppResult<ScheduleItem> {
    validate_form(form)?;
    // Lê direto do backend: o índice não pode vir de uma cache desatualizada
    let rows = store.backend.select(TABLE, &Query::new(), Some(auth)).await?;
    let existing: Vec<ScheduleItem> = decode_rows(rows)?;

    let mut input = form.to_input();
    input.order_index = Some(next_order_index(&existing));
    let row = store
        .backend
        .insert(TABLE, serde_json::to_value(&input)?, Some(auth))
        .await?;
    store.cache.invalidate_all(AFFECTED).await;
    let item: ScheduleItem = serde_json::from_value(row)?;
    tracing::info!("Item de agenda criado: {} {} (ordem {})", item.day, item.time, item.order_index);
    Ok(item)
}

pub async fn update(store: &Store, id: &str, form: &ScheduleForm, auth: &str) -> AppResult<ScheduleItem> {
    validate_form(form)?;
    let row = store
        .backend
        .update(TABLE, id, serde_json::to_value(form.to_input())?, Some(auth))
        .await?;
    store.cache.invalidate_all(AFFECTED).await;
    tracing::info!("Item de agenda atualizado: {}", id);
    Ok(serde_json::from_value(row)?)
}

pub async fn delete(store: &Store, id: &str, auth: &str) -> AppResult<()> {
    store.backend.delete(TABLE, id, Some(auth)).await?;
    store.cache.invalidate_all(AFFECTED).await;
    tracing::info!("Item de agenda removido: {}", id);
    Ok(())
}

pub async fn find(store: &Store, id: &str) -> AppResult<Option<ScheduleItem>> {
    Ok(list(store).await?.into_iter().find(|i| i.id == id))
}
