//! Single-writer actor for SQLite.
//!
//! SQLite allows one writer at a time. Instead of letting pool connections
//! contend for the write lock, all mutations are funneled through one
//! background task that owns a dedicated connection and runs each job inside
//! an immediate transaction. Multi-statement jobs (insert + join rows, or the
//! generation job's compensating delete) are therefore atomic for free.

use std::any::Any;

use diesel::SqliteConnection;
use tobby_core::errors::Result;
use tokio::sync::{mpsc, oneshot};

use super::DbPool;
use crate::errors::StorageError;

// A queued unit of database work. The return value is type-erased so one
// channel can carry jobs with different result types.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;
type ErasedJob = Job<Box<dyn Any + Send + 'static>>;
type Reply = oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>;

/// Handle for submitting write jobs to the actor.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<(ErasedJob, Reply)>,
}

impl WriteHandle {
    /// Runs `job` on the writer's connection, inside a transaction, and
    /// returns its result.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |conn| job(conn).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                reply_tx,
            ))
            .await
            .expect("writer actor channel closed; the actor task has stopped");

        reply_rx
            .await
            .expect("writer actor dropped the reply sender without responding")
            .map(|boxed| {
                *boxed
                    .downcast::<T>()
                    .unwrap_or_else(|_| panic!("writer actor returned an unexpected result type"))
            })
    }
}

/// Spawns the writer actor and returns a handle for submitting jobs.
///
/// The actor holds one pool connection for its whole lifetime and processes
/// jobs strictly in order. It stops when the last `WriteHandle` is dropped.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<(ErasedJob, Reply)>(1024);

    tokio::spawn(async move {
        let mut conn = pool
            .get()
            .expect("could not reserve a connection for the writer actor");

        while let Some((job, reply_tx)) = rx.recv().await {
            let result = conn
                .immediate_transaction::<_, StorageError, _>(|c| {
                    job(c).map_err(StorageError::from)
                })
                .map_err(|e: StorageError| e.into());

            // The requester may have given up; that is not our problem.
            let _ = reply_tx.send(result);
        }
    });

    WriteHandle { tx }
}
