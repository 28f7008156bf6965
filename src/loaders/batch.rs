// src/loaders/batch.rs

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::sync::{oneshot, Mutex};

use crate::common::error::AppError;

/// Janela de agrupamento e tamanho máximo de um lote.
#[derive(Debug, Clone, Copy)]
pub struct LoaderConfig {
    pub wait: Duration,
    pub max_batch: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self { wait: Duration::from_millis(1), max_batch: 100 }
    }
}

/// `Ok(None)` quando a linha não existe; o erro é o do lote inteiro.
pub type LoadResult<V> = Result<Option<V>, Arc<AppError>>;

/// Busca em lote de uma entidade pela sua chave natural.
#[async_trait]
pub trait BatchFetch: Send + Sync + 'static {
    type Value: Clone + Send + Sync + 'static;

    const ENTITY: &'static str;

    async fn fetch(&self, keys: &[i64]) -> Result<Vec<Self::Value>, AppError>;

    fn key(value: &Self::Value) -> i64;
}

struct Batch<V> {
    id: u64,
    keys: Vec<i64>,
    waiters: HashMap<i64, Vec<oneshot::Sender<LoadResult<V>>>>,
}

impl<V> Batch<V> {
    fn new(id: u64) -> Self {
        Self { id, keys: Vec::new(), waiters: HashMap::new() }
    }

    // Chave repetida no mesmo lote só ganha mais um ouvinte.
    fn push(&mut self, key: i64, waiter: oneshot::Sender<LoadResult<V>>) {
        match self.waiters.get_mut(&key) {
            Some(waiters) => waiters.push(waiter),
            None => {
                self.keys.push(key);
                self.waiters.insert(key, vec![waiter]);
            }
        }
    }
}

struct State<V> {
    cache: HashMap<i64, Option<V>>,
    pending: Option<Batch<V>>,
    next_batch: u64,
}

struct Inner<F: BatchFetch> {
    fetcher: F,
    config: LoaderConfig,
    state: Mutex<State<F::Value>>,
}

enum Ticket<V> {
    Ready(Option<V>),
    Waiting(oneshot::Receiver<LoadResult<V>>),
}

/// Loader com agrupamento e cache, válido por uma requisição.
///
/// Chamadas dentro da janela entram no mesmo lote; o lote sai quando a janela
/// termina ou quando atinge `max_batch` chaves, com um único `fetch` de chaves
/// sem repetição. Valores resolvidos (inclusive ausentes) ficam em cache;
/// erros não, então uma nova chamada tenta de novo.
pub struct Loader<F: BatchFetch> {
    inner: Arc<Inner<F>>,
}

impl<F: BatchFetch> Clone for Loader<F> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<F: BatchFetch> Loader<F> {
    pub fn new(fetcher: F, config: LoaderConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher,
                config,
                state: Mutex::new(State { cache: HashMap::new(), pending: None, next_batch: 0 }),
            }),
        }
    }

    pub async fn load(&self, key: i64) -> LoadResult<F::Value> {
        let ticket = self.enqueue(key).await;
        resolve(ticket).await
    }

    async fn enqueue(&self, key: i64) -> Ticket<F::Value> {
        let mut state = self.inner.state.lock().await;

        if let Some(hit) = state.cache.get(&key) {
            return Ticket::Ready(hit.clone());
        }

        let (tx, rx) = oneshot::channel();
        match state.pending.as_mut() {
            Some(batch) => batch.push(key, tx),
            None => {
                let id = state.next_batch;
                state.next_batch += 1;

                let mut batch = Batch::new(id);
                batch.push(key, tx);
                state.pending = Some(batch);

                // Fecha o lote quando a janela terminar, se o limite não o fechou antes
                let inner = Arc::clone(&self.inner);
                tokio::spawn(async move {
                    tokio::time::sleep(inner.config.wait).await;
                    let batch = inner.state.lock().await.pending.take_if(|b| b.id == id);
                    if let Some(batch) = batch {
                        inner.dispatch(batch).await;
                    }
                });
            }
        }

        let full = state
            .pending
            .as_ref()
            .is_some_and(|b| b.keys.len() >= self.inner.config.max_batch);
        if full {
            if let Some(batch) = state.pending.take() {
                let inner = Arc::clone(&self.inner);
                tokio::spawn(async move { inner.dispatch(batch).await });
            }
        }

        Ticket::Waiting(rx)
    }
}

impl<F: BatchFetch> Inner<F> {
    async fn dispatch(&self, batch: Batch<F::Value>) {
        tracing::debug!(entity = F::ENTITY, batch = batch.id, keys = ?batch.keys, "despachando lote");

        match self.fetcher.fetch(&batch.keys).await {
            Ok(values) => {
                let mut by_key: HashMap<i64, F::Value> =
                    values.into_iter().map(|v| (F::key(&v), v)).collect();

                let mut state = self.state.lock().await;
                for (key, waiters) in batch.waiters {
                    let value = by_key.remove(&key);
                    state.cache.insert(key, value.clone());
                    for waiter in waiters {
                        // Quem desistiu de esperar não impede os demais
                        let _ = waiter.send(Ok(value.clone()));
                    }
                }
            }
            Err(err) => {
                tracing::debug!(entity = F::ENTITY, batch = batch.id, error = %err, "lote falhou");
                let err = Arc::new(err);
                for waiters in batch.waiters.into_values() {
                    for waiter in waiters {
                        let _ = waiter.send(Err(Arc::clone(&err)));
                    }
                }
            }
        }
    }
}

async fn resolve<V>(ticket: Ticket<V>) -> LoadResult<V> {
    match ticket {
        Ticket::Ready(value) => Ok(value),
        Ticket::Waiting(rx) => rx.await.unwrap_or_else(|_| {
            Err(Arc::new(AppError::InternalServerError(anyhow::anyhow!(
                "loader batch was dropped"
            ))))
        }),
    }
}
