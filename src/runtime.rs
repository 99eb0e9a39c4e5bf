//! Shared Tokio runtime for driving async clients from synchronous code
//!
//! Every command runs sequentially; the HTTP and S3 clients are async, so each
//! remote call blocks the calling thread on this runtime.

use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::{Builder, Runtime};

use crate::error::{self, Result};

static RT: OnceLock<Runtime> = OnceLock::new();

fn runtime() -> Result<&'static Runtime> {
    if let Some(rt) = RT.get() {
        return Ok(rt);
    }
    let rt = Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(|e| error::fs::io_error(format!("Failed to start async runtime: {e}")))?;
    Ok(RT.get_or_init(|| rt))
}

/// Run a future to completion on the shared runtime
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    Ok(runtime()?.block_on(future))
}
