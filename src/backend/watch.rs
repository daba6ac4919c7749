// src/backend/watch.rs
//! Marca, por pedido, o token do utilizador que o backend recusou.
//!
//! O guarda do admin corre o pedido dentro de [`TokenWatch::scope`]. Um 401 fica
//! registado mesmo quando o handler troca o erro por uma secção vazia.
//! Variáveis task-local não passam para tarefas criadas com `tokio::spawn`.

use std::{
    future::Future,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use tokio::task_local;

task_local! {
    static TOKEN_WATCH: TokenWatch;
}

#[derive(Debug, Clone, Default)]
pub struct TokenWatch(Arc<AtomicBool>);

impl TokenWatch {
    /// Corre `fut` e diz se algum pedido ao backend recusou o token pelo caminho.
    pub async fn scope<Fut>(fut: Fut) -> (Fut::Output, bool)
    where
        Fut: Future,
    {
        let watch = TokenWatch::default();
        let output = TOKEN_WATCH.scope(watch.clone(), fut).await;
        (output, watch.0.load(Ordering::SeqCst))
    }

    /// Fora de um `scope` não faz nada.
    pub fn reject() {
        let _ = TOKEN_WATCH.try_with(|watch| watch.0.store(true, Ordering::SeqCst));
    }
}
