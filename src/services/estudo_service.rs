// src/services/estudo_service.rs
use super::validate_form;
use crate::{
    backend::{decode_rows, Query},
    cache::QueryKey,
    error::{AppError, AppResult},
    models::estudo::{Estudo, EstudoForm, EstudoInput},
    state::Store,
};

const TABLE: &str = "estudos";

const AFFECTED: &[&str] = &["estudos", "estudo", "admin-estudos", "admin-estudos-count"];

pub async fn list_published(store: &Store) -> AppResult<Vec<Estudo>> {
    let query = Query::new().eq("published", true).order("date", false);
    store
        .cached_rows(QueryKey::new("estudos"), TABLE, query, None)
        .await
}

/// Estudo publicado pelo id; `None` se não existir ou estiver oculto.
pub async fn find_published(store: &Store, id: &str) -> AppResult<Option<Estudo>> {
    let query = Query::new().eq("id", id).eq("published", true).limit(1);
    let rows: Vec<Estudo> = store
        .cached_rows(QueryKey::new("estudo").with(id), TABLE, query, None)
        .await?;
    Ok(rows.into_iter().next())
}

pub async fn list_all(store: &Store, auth: &str) -> AppResult<Vec<Estudo>> {
    store
        .cached_rows(
            QueryKey::new("admin-estudos"),
            TABLE,
            Query::new().order("date", false),
            Some(auth),
        )
        .await
}

pub async fn find_by_id(store: &Store, id: &str, auth: &str) -> AppResult<Option<Estudo>> {
    let rows = store
        .backend
        .select(TABLE, &Query::new().eq("id", id).limit(1), Some(auth))
        .await?;
    Ok(decode_rows::<Estudo>(rows)?.into_iter().next())
}

pub async fn count_all(store: &Store, auth: &str) -> AppResult<u64> {
    store
        .cached_count(QueryKey::new("admin-estudos-count"), TABLE, Some(auth))
        .await
}

fn input_from_form(form: &EstudoForm) -> AppResult<EstudoInput> {
    validate_form(form)?;
    let date = form
        .parsed_date()
        .ok_or_else(|| AppError::Validation("Data inválida.".to_string()))?;
    Ok(form.to_input(date))
}

pub async fn create(store: &Store, form: &EstudoForm, auth: &str) -> AppResult<Estudo> {
    let input = input_from_form(form)?;
    let row = store
        .backend
        .insert(TABLE, serde_json::to_value(&input)?, Some(auth))
        .await?;
    store.cache.invalidate_all(AFFECTED).await;
    let estudo: Estudo = serde_json::from_value(row)?;
    tracing::info!("Estudo criado: {} ({})", estudo.title, estudo.id);
    Ok(estudo)
}

pub async fn update(store: &Store, id: &str, form: &EstudoForm, auth: &str) -> AppResult<Estudo> {
    let input = input_from_form(form)?;
    let row = store
        .backend
        .update(TABLE, id, serde_json::to_value(&input)?, Some(auth))
        .await?;
    store.cache.invalidate_all(AFFECTED).await;
    tracing::info!("Estudo atualizado: {}", id);
    Ok(serde_json::from_value(row)?)
}

pub async fn delete(store: &Store, id: &str, auth: &str) -> AppResult<()> {
    store.backend.delete(TABLE, id, Some(auth)).await?;
    store.cache.invalidate_all(AFFECTED).await;
    tracing::info!("Estudo removido: {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::memory_store;
    use serde_json::json;

    #[tokio::test]
    async fn hidden_estudo_only_in_admin_list() {
        let (store, backend) = memory_store();
        backend.seed(
            TABLE,
            vec![
                json!({"id": "e1", "title": "Romanos 8", "author": "Pr. Silva", "date": "2024-02-01", "published": true}),
                json!({"id": "e2", "title": "Em revisão", "author": "Pr. Silva", "date": "2024-03-01", "published": false}),
            ],
        );
        let public = list_published(&store).await.unwrap();
        assert_eq!(public.len(), 1);
        assert!(find_published(&store, "e2").await.unwrap().is_none());
        assert_eq!(list_all(&store, "token").await.unwrap()[0].id, "e2");
        assert!(find_by_id(&store, "e2", "token").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn update_is_visible_on_next_read() {
        let (store, backend) = memory_store();
        backend.seed(
            TABLE,
            vec![json!({"id": "e1", "title": "Salmos", "author": "Pr. Silva", "date": "2024-02-01", "published": true})],
        );
        assert_eq!(find_published(&store, "e1").await.unwrap().unwrap().title, "Salmos");

        let mut form = EstudoForm::from_estudo(&find_by_id(&store, "e1", "t").await.unwrap().unwrap());
        form.title = "Salmos 23".to_string();
        update(&store, "e1", &form, "t").await.unwrap();

        assert_eq!(find_published(&store, "e1").await.unwrap().unwrap().title, "Salmos 23");
        assert_eq!(list_published(&store).await.unwrap()[0].title, "Salmos 23");
    }
}
