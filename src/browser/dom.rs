//! Shared page state for DOM-backed browser backends.
//!
//! Both the HTTP backend and the test mock hold the current page as raw
//! markup and answer selector queries against it. `scraper::Html` is not
//! `Send`, so documents are parsed inside short synchronous sections and
//! only plain captured data crosses await points.

use crate::browser::{BrowserError, ElementHandle};
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

/// Element data captured at query time. Handles refer to entries in the
/// session's capture table and go stale on navigation.
#[derive(Debug, Clone)]
pub(crate) struct CapturedElement {
    pub text: String,
    pub attrs: HashMap<String, String>,
    /// Action of the enclosing `<form>`, when there is one.
    pub form_action: Option<Option<String>>,
}

/// What a click on a given element translates to.
#[derive(Debug, Clone)]
pub(crate) enum ClickAction {
    /// Follow a hyperlink.
    Navigate(Url),
    /// Submit the enclosing form with the fields recorded so far.
    Submit(Url),
}

#[derive(Debug, Default)]
struct PageState {
    url: Option<Url>,
    html: String,
    elements: HashMap<u64, CapturedElement>,
    /// (input name, value) pairs recorded by `fill`, submitted on click.
    form_fields: Vec<(String, String)>,
    next_id: u64,
    closed: bool,
}

/// Interior-mutable core shared by DOM-backed backends.
#[derive(Debug, Default)]
pub(crate) struct DomCore {
    state: Mutex<PageState>,
}

impl DomCore {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, PageState> {
        self.state.lock().expect("page state poisoned")
    }

    pub fn ensure_open(&self) -> Result<(), BrowserError> {
        if self.guard().closed {
            Err(BrowserError::SessionClosed)
        } else {
            Ok(())
        }
    }

    /// Install a freshly fetched page, invalidating all prior handles.
    pub fn load(&self, url: Url, html: String) {
        let mut state = self.guard();
        state.url = Some(url);
        state.html = html;
        state.elements.clear();
        state.form_fields.clear();
    }

    pub fn current_url(&self) -> Result<String, BrowserError> {
        self.ensure_open()?;
        self.guard()
            .url
            .as_ref()
            .map(|u| u.to_string())
            .ok_or(BrowserError::NoPage)
    }

    pub fn page_source(&self) -> Result<String, BrowserError> {
        self.ensure_open()?;
        let state = self.guard();
        if state.url.is_none() {
            return Err(BrowserError::NoPage);
        }
        Ok(state.html.clone())
    }

    /// Run a selector query against the current page, capturing matches.
    pub fn query(&self, selector: &str) -> Result<Vec<ElementHandle>, BrowserError> {
        self.ensure_open()?;
        let parsed = Selector::parse(selector)
            .map_err(|_| BrowserError::InvalidSelector(selector.to_string()))?;

        let mut state = self.guard();
        if state.url.is_none() {
            return Err(BrowserError::NoPage);
        }

        let document = Html::parse_document(&state.html);
        let mut captured = Vec::new();
        for element in document.select(&parsed) {
            let text = element.text().collect::<String>().trim().to_string();
            let attrs: HashMap<String, String> = element
                .value()
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            let form_action = element.ancestors().find_map(|node| {
                scraper::ElementRef::wrap(node).and_then(|el| {
                    if el.value().name() == "form" {
                        Some(el.value().attr("action").map(str::to_string))
                    } else {
                        None
                    }
                })
            });
            captured.push(CapturedElement {
                text,
                attrs,
                form_action,
            });
        }
        drop(document);

        let mut handles = Vec::with_capacity(captured.len());
        for element in captured {
            let id = state.next_id;
            state.next_id += 1;
            state.elements.insert(id, element);
            handles.push(ElementHandle { id });
        }
        Ok(handles)
    }

    pub fn query_first(&self, selector: &str) -> Result<Option<ElementHandle>, BrowserError> {
        Ok(self.query(selector)?.into_iter().next())
    }

    pub fn text(&self, handle: &ElementHandle) -> Result<String, BrowserError> {
        self.ensure_open()?;
        self.guard()
            .elements
            .get(&handle.id)
            .map(|e| e.text.clone())
            .ok_or(BrowserError::StaleElement)
    }

    pub fn attr(
        &self,
        handle: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        self.ensure_open()?;
        self.guard()
            .elements
            .get(&handle.id)
            .map(|e| e.attrs.get(name).cloned())
            .ok_or(BrowserError::StaleElement)
    }

    /// Record a form field value. The element must carry a `name` attribute.
    pub fn record_fill(&self, handle: &ElementHandle, value: &str) -> Result<(), BrowserError> {
        self.ensure_open()?;
        let mut state = self.guard();
        let name = state
            .elements
            .get(&handle.id)
            .ok_or(BrowserError::StaleElement)?
            .attrs
            .get("name")
            .cloned()
            .ok_or_else(|| {
                BrowserError::NotInteractable("form field has no name attribute".to_string())
            })?;
        state.form_fields.retain(|(n, _)| n != &name);
        state.form_fields.push((name, value.to_string()));
        Ok(())
    }

    /// Decide what clicking an element means for a DOM-backed backend.
    pub fn click_action(&self, handle: &ElementHandle) -> Result<ClickAction, BrowserError> {
        self.ensure_open()?;
        let state = self.guard();
        let base = state.url.as_ref().ok_or(BrowserError::NoPage)?;
        let element = state
            .elements
            .get(&handle.id)
            .ok_or(BrowserError::StaleElement)?;

        if let Some(href) = element.attrs.get("href") {
            let target = base.join(href).map_err(|e| {
                BrowserError::Navigation {
                    url: href.clone(),
                    message: e.to_string(),
                }
            })?;
            return Ok(ClickAction::Navigate(target));
        }

        if let Some(action) = &element.form_action {
            let mut target = match action.as_deref().filter(|a| !a.is_empty()) {
                Some(action) => base.join(action).map_err(|e| BrowserError::Navigation {
                    url: action.to_string(),
                    message: e.to_string(),
                })?,
                None => base.clone(),
            };
            target
                .query_pairs_mut()
                .clear()
                .extend_pairs(state.form_fields.iter().map(|(k, v)| (k.as_str(), v.as_str())));
            return Ok(ClickAction::Submit(target));
        }

        Err(BrowserError::NotInteractable(
            "element is neither a link nor part of a form".to_string(),
        ))
    }

    /// Blank the session, keeping it open.
    pub fn reset(&self) -> Result<(), BrowserError> {
        self.ensure_open()?;
        let mut state = self.guard();
        state.url = None;
        state.html.clear();
        state.elements.clear();
        state.form_fields.clear();
        Ok(())
    }

    pub fn close(&self) {
        self.guard().closed = true;
    }
}
