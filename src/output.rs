// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Eventually-resolved values flowing between resources.
//!
//! An [`Output`] is produced by a resource that may not exist yet (the name the
//! cluster assigned to an object, a load balancer hostname). Consumers either
//! derive new outputs from it or `resolve()` it explicitly. The producing
//! computation is shared: it runs once, no matter how many consumers await it.

use crate::error::{Result, StackError};
use futures::future::{self, BoxFuture, FutureExt, Shared};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

type SharedResult<T> = std::result::Result<T, Arc<StackError>>;

#[derive(Clone)]
pub struct Output<T> {
    inner: Shared<BoxFuture<'static, SharedResult<T>>>,
}

impl<T> Output<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// An output whose value is known at authoring time
    pub fn known(value: T) -> Self {
        Self::from_future(future::ready(Ok(value)))
    }

    /// An output produced by a computation that runs on first resolution
    pub fn from_future<F>(fut: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            inner: fut
                .map(|res| res.map_err(StackError::into_shared))
                .boxed()
                .shared(),
        }
    }

    /// Derive an output by transforming the resolved value
    pub fn apply<U, F>(&self, f: F) -> Output<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let this = self.clone();
        Output::from_future(async move { this.resolve().await.map(f) })
    }

    /// Derive an output by running another asynchronous step on the resolved value
    pub fn and_then<U, F, Fut>(&self, f: F) -> Output<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> Fut + Send + 'static,
        Fut: Future<Output = Result<U>> + Send + 'static,
    {
        let this = self.clone();
        Output::from_future(async move { f(this.resolve().await?).await })
    }

    /// Join two outputs into one resolving to both values
    pub fn zip<U>(&self, other: &Output<U>) -> Output<(T, U)>
    where
        U: Clone + Send + Sync + 'static,
    {
        let (left, right) = (self.clone(), other.clone());
        Output::from_future(async move {
            future::try_join(left.resolve(), right.resolve()).await
        })
    }

    /// Join any number of outputs, preserving their order
    pub fn all(outputs: impl IntoIterator<Item = Output<T>>) -> Output<Vec<T>> {
        let outputs: Vec<Output<T>> = outputs.into_iter().collect();
        Output::from_future(async move {
            future::try_join_all(outputs.iter().map(|output| output.resolve())).await
        })
    }

    /// Wait for the value. Failures of the producer surface as [`StackError::Dependency`].
    pub async fn resolve(&self) -> Result<T> {
        self.inner.clone().await.map_err(StackError::Dependency)
    }

    /// The value, if it has already been resolved successfully
    pub fn peek(&self) -> Option<T> {
        self.inner.peek().and_then(|res| res.as_ref().ok().cloned())
    }
}

impl<T> fmt::Debug for Output<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.inner.peek() {
            Some(Ok(_)) => "resolved",
            Some(Err(_)) => "failed",
            None => "pending",
        };
        f.debug_struct("Output").field("state", &state).finish()
    }
}
