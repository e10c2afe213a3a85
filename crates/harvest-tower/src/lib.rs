//! Small [`tower`] helpers shared by the harvest service stack

use std::pin::Pin;

use futures::Future;

pub mod service;

/// Boxed, sendable future returned by the middleware in this workspace
pub type ResponseFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;
