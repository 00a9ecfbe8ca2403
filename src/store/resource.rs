//! The resource that exposes a [`DocumentStore`] over HTTP.

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::http::{Dispatcher, Request};
use crate::negotiation::{Charset, MediaType};
use crate::resource::{
    Acceptor, ETag, Exchange, Handler, Provider, Resource, ResourceError, ResourceResult,
};
use crate::store::document::{Document, DocumentStore};

/// JSON request body for PUT and POST.
#[derive(Debug, Deserialize)]
struct DocumentBody {
    content: String,
}

/// One request's view of the store.
#[derive(Debug)]
pub struct DocumentResource {
    store: Arc<DocumentStore>,
    path: String,
    /// Where an accepted body is written: the request path, or the
    /// generated path of a creating POST.
    target: String,
}

impl DocumentResource {
    pub fn new(store: Arc<DocumentStore>, path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            store,
            target: path.clone(),
            path,
        }
    }

    fn is_collection(&self) -> bool {
        self.path.ends_with('/')
    }

    fn loaded<'e>(ex: &'e Exchange<'_>) -> Option<&'e Document> {
        ex.context.get::<Document>()
    }

    fn render_json(&mut self, ex: &mut Exchange<'_>) -> ResourceResult<()> {
        let body = if self.is_collection() {
            serde_json::to_vec(&self.store.list(&self.path))
        } else {
            let doc = Self::loaded(ex).ok_or_else(|| ResourceError::fault("document not loaded"))?;
            serde_json::to_vec(doc)
        }
        .map_err(ResourceError::fault)?;
        ex.response.write_body(&body);
        Ok(())
    }

    fn render_text(&mut self, ex: &mut Exchange<'_>) -> ResourceResult<()> {
        if self.is_collection() {
            for doc in self.store.list(&self.path) {
                ex.response.write_body(doc.path.as_bytes());
                ex.response.write_body(b"\n");
            }
            return Ok(());
        }
        let doc = Self::loaded(ex).ok_or_else(|| ResourceError::fault("document not loaded"))?;
        let content = doc.content.clone();
        ex.response.write_body(content.as_bytes());
        Ok(())
    }

    fn store_text(&mut self, ex: &mut Exchange<'_>) -> ResourceResult<()> {
        let content = std::str::from_utf8(ex.request().body())
            .map_err(|_| ResourceError::halt_with(StatusCode::BAD_REQUEST, "body is not UTF-8"))?;
        self.store.put(&self.target, content);
        Ok(())
    }

    fn store_json(&mut self, ex: &mut Exchange<'_>) -> ResourceResult<()> {
        let body: DocumentBody = serde_json::from_slice(ex.request().body())
            .map_err(|e| ResourceError::halt_with(StatusCode::BAD_REQUEST, e.to_string()))?;
        self.store.put(&self.target, body.content);
        Ok(())
    }
}

impl Resource for DocumentResource {
    fn malformed_request(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        Ok(self.path.split('/').any(|segment| segment == ".."))
    }

    fn allowed_methods(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Vec<Method>> {
        if self.is_collection() {
            Ok(vec![Method::GET, Method::HEAD, Method::POST, Method::OPTIONS])
        } else {
            Ok(vec![
                Method::GET,
                Method::HEAD,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
        }
    }

    fn content_types_provided(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Vec<Provider<Self>>> {
        Ok(vec![
            (MediaType::new("application", "json"), Self::render_json as Handler<Self>),
            (MediaType::new("text", "plain"), Self::render_text as Handler<Self>),
        ])
    }

    fn content_types_accepted(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Vec<Acceptor<Self>>> {
        Ok(vec![
            (MediaType::new("application", "json"), Self::store_json as Handler<Self>),
            (MediaType::new("text", "plain"), Self::store_text as Handler<Self>),
        ])
    }

    fn charsets_provided(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Vec<Charset>> {
        Ok(vec![Charset::for_name("UTF-8")])
    }

    fn resource_exists(&mut self, ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        if self.is_collection() {
            return Ok(true);
        }
        match self.store.get(&self.path) {
            Some(doc) => {
                ex.context.insert(doc);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn previously_existed(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        Ok(self.store.was_deleted(&self.path))
    }

    fn post_is_create(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        Ok(self.is_collection())
    }

    fn create_path(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Option<String>> {
        let name = Uuid::new_v4().simple().to_string();
        self.target = format!("{}{}", self.path, name);
        Ok(Some(name))
    }

    fn delete_resource(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        Ok(self.store.delete(&self.path))
    }

    fn generate_etag(&mut self, ex: &mut Exchange<'_>) -> ResourceResult<Option<ETag>> {
        Ok(Self::loaded(ex).map(|doc| ETag::strong(format!("r{}", doc.revision))))
    }

    fn last_modified(&mut self, ex: &mut Exchange<'_>) -> ResourceResult<Option<DateTime<Utc>>> {
        Ok(Self::loaded(ex).map(|doc| doc.modified))
    }

    fn finish_request(&mut self, ex: &mut Exchange<'_>) -> ResourceResult<()> {
        tracing::trace!(path = %self.path, status = %ex.response.status(), "Document request finished");
        Ok(())
    }
}

/// Serves every path from one shared store.
#[derive(Debug, Clone, Default)]
pub struct DocumentDispatcher {
    store: Arc<DocumentStore>,
}

impl DocumentDispatcher {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }
}

impl Dispatcher for DocumentDispatcher {
    type Resource = DocumentResource;

    fn dispatch(&self, request: &Request) -> Option<DocumentResource> {
        Some(DocumentResource::new(self.store.clone(), request.path()))
    }
}
