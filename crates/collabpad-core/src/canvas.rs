//! Canvas state: the single owner of document, history, view and tools.

use crate::camera::Camera;
use crate::config::CanvasConfig;
use crate::document::{DocumentTree, NotebookId, Page, PageId};
use crate::elements::{
    Element, ElementDraft, ElementId, ElementPatch, ImageData, fit_within,
};
use crate::history::HistoryBook;
use crate::image_cache::{ImageCache, LoadedImage};
use crate::poll::{OptionId, PollId, QuestionId, UserId};
use crate::session::{SessionError, SessionManager};
use crate::storage::{BlobStore, DEFAULT_USER_NAME, PersistedState};
use crate::tools::{ToolKind, ToolManager};
use crate::widget::WidgetManager;
use kurbo::{Point, Size, Vec2};
use std::fmt;
use uuid::Uuid;

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Elements of the current page.
    Elements,
    /// Notebooks, pages or the current pointers.
    Document,
    /// Polls or questions of the current page.
    Polls,
    /// Zoom or pan.
    View,
    /// Active tool or tool settings.
    Tool,
    Session,
    /// Selection, hover or text edit state.
    Selection,
    /// Dark mode or user name.
    Preferences,
}

impl ChangeKind {
    /// Whether this change touches the persisted blob.
    pub fn is_persisted(self) -> bool {
        matches!(
            self,
            ChangeKind::Elements | ChangeKind::Document | ChangeKind::Polls | ChangeKind::Preferences
        )
    }
}

pub type SubscriptionId = u64;

type Observer = Box<dyn FnMut(ChangeKind)>;

/// Per-user settings that outlive a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    pub dark_mode: bool,
    /// Process-local identity used for votes, questions and the session roster.
    pub user_id: UserId,
    pub user_name: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            dark_mode: true,
            user_id: Uuid::new_v4(),
            user_name: DEFAULT_USER_NAME.to_string(),
        }
    }
}

/// The canvas state.
///
/// Every public mutation completes one logical operation, then persists (when
/// a store is attached) and notifies subscribers once.
pub struct Canvas {
    pub config: CanvasConfig,
    document: DocumentTree,
    history: HistoryBook,
    pub camera: Camera,
    pub tool_manager: ToolManager,
    pub widgets: WidgetManager,
    session: SessionManager,
    pub images: ImageCache,
    preferences: Preferences,
    store: Option<Box<dyn BlobStore>>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: SubscriptionId,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas")
            .field("document", &self.document)
            .field("camera", &self.camera)
            .field("tool", &self.tool_manager.current_tool())
            .field("preferences", &self.preferences)
            .field("persistent", &self.store.is_some())
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Canvas {
    pub fn new() -> Self {
        Self::with_config(CanvasConfig::default())
    }

    pub fn with_config(config: CanvasConfig) -> Self {
        Self::build(config, DocumentTree::new(), Preferences::default(), None)
    }

    /// Open the document stored in `store`, or a fresh one if there is none
    /// or it can't be read. Later changes are written back to the same key.
    pub fn open(config: CanvasConfig, store: Box<dyn BlobStore>) -> Self {
        let state = PersistedState::load(store.as_ref(), &config.storage_key);
        let preferences = Preferences {
            dark_mode: state.dark_mode,
            user_name: state.current_user_name.clone(),
            ..Preferences::default()
        };
        Self::build(config, state.document(), preferences, Some(store))
    }

    fn build(
        config: CanvasConfig,
        document: DocumentTree,
        preferences: Preferences,
        store: Option<Box<dyn BlobStore>>,
    ) -> Self {
        let mut canvas = Self {
            camera: Camera::with_limits(config.min_zoom, config.max_zoom),
            tool_manager: ToolManager::new(
                config.highlighter_width_multiplier,
                config.highlighter_opacity,
            ),
            history: HistoryBook::new(config.history_limit),
            config,
            document,
            widgets: WidgetManager::new(),
            session: SessionManager::new(),
            images: ImageCache::new(),
            preferences,
            store,
            observers: Vec::new(),
            next_subscription: 0,
        };
        canvas.seed_history();
        canvas
    }

    // --- Observation ---

    /// Register a callback run after every completed operation.
    pub fn subscribe(&mut self, observer: impl FnMut(ChangeKind) + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    /// Persist if needed, then tell subscribers.
    pub(crate) fn notify(&mut self, kind: ChangeKind) {
        if kind.is_persisted() {
            self.persist();
        }
        for (_, observer) in &mut self.observers {
            observer(kind);
        }
    }

    /// Write the persisted blob. Failures are logged, never fatal.
    pub fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let state = PersistedState::capture(
            &self.document,
            self.preferences.dark_mode,
            &self.preferences.user_name,
        );
        if let Err(e) = state.save(store.as_ref(), &self.config.storage_key) {
            log::error!("failed to persist canvas: {e}");
        }
    }

    // --- Read access ---

    pub fn document(&self) -> &DocumentTree {
        &self.document
    }

    pub fn current_page(&self) -> &Page {
        self.document.current_page()
    }

    pub(crate) fn page_mut(&mut self) -> &mut Page {
        self.document.current_page_mut()
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.current_page().element(id)
    }

    /// Current page's elements back to front.
    pub fn elements(&self) -> Vec<&Element> {
        self.current_page().elements_ordered()
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn selection(&self) -> Option<ElementId> {
        self.widgets.selected()
    }

    /// Hit-test tolerance in canvas units at the current zoom.
    pub fn hit_tolerance(&self) -> f64 {
        self.config.hit_tolerance / self.camera.zoom()
    }

    /// Frontmost element under a canvas point.
    pub fn element_at(&self, point: Point) -> Option<ElementId> {
        self.current_page()
            .top_element_at(point, self.hit_tolerance())
    }

    // --- Elements ---

    /// Add an element to the current page and record it in history.
    pub fn create_element(&mut self, draft: ElementDraft) -> ElementId {
        self.seed_history();
        let id = self.page_mut().create_element(draft);
        self.record_history();
        self.notify(ChangeKind::Elements);
        id
    }

    /// Merge a partial update. Not recorded in history: call
    /// [`snapshot`](Self::snapshot) once the interaction is complete.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        self.seed_history();
        let changed = self.page_mut().update_element(id, patch);
        if changed {
            self.notify(ChangeKind::Elements);
        }
        changed
    }

    /// Remove an element and record it in history. Unknown ids are a no-op.
    pub fn delete_element(&mut self, id: ElementId) -> Option<Element> {
        self.seed_history();
        let removed = self.page_mut().delete_element(id);
        match &removed {
            Some(_) => {
                self.forget_element(id);
                self.record_history();
                self.notify(ChangeKind::Elements);
            }
            None => log::debug!("delete of unknown element {id} ignored"),
        }
        removed
    }

    /// Delete the selected element, if any.
    pub fn delete_selected(&mut self) -> bool {
        match self.widgets.selected() {
            Some(id) => self.delete_element(id).is_some(),
            None => false,
        }
    }

    /// Remove every element on the current page.
    pub fn clear_canvas(&mut self) {
        self.seed_history();
        let ids: Vec<ElementId> = self.current_page().elements().iter().map(Element::id).collect();
        self.page_mut().clear();
        for id in ids {
            self.forget_element(id);
        }
        self.record_history();
        self.notify(ChangeKind::Elements);
    }

    pub fn bring_to_front(&mut self, id: ElementId) -> bool {
        self.seed_history();
        if !self.page_mut().bring_to_front(id) {
            return false;
        }
        self.record_history();
        self.notify(ChangeKind::Elements);
        true
    }

    fn forget_element(&mut self, id: ElementId) {
        self.widgets.remove(id);
        self.images.remove(id);
    }

    /// Place an uploaded image, shrunk to the configured box.
    pub fn insert_image(&mut self, image: ImageData, natural_size: Size) -> ElementId {
        let size = fit_within(natural_size, self.config.image_fit);
        self.create_element(ElementDraft::image(self.config.image_position, image, size))
    }

    /// A bitmap finished loading. Results for deleted elements are dropped.
    pub fn image_loaded(&mut self, id: ElementId, image: LoadedImage) {
        let present = self.contains_element_anywhere(id);
        if self.images.insert(id, image, present) {
            self.notify(ChangeKind::Elements);
        }
    }

    pub fn image_failed(&mut self, id: ElementId, reason: &str) {
        self.images.fail(id, reason);
    }

    fn contains_element_anywhere(&self, id: ElementId) -> bool {
        element_on_any_page(&self.document, id)
    }

    /// Drop bitmaps whose element no longer lives on any page.
    fn prune_images(&mut self) {
        let document = &self.document;
        self.images.retain(|id| element_on_any_page(document, id));
    }

    // --- History ---

    fn seed_history(&mut self) {
        let page = self.document.current_page_id();
        self.history.ensure(page, self.document.current_page().elements());
    }

    fn record_history(&mut self) {
        let page = self.document.current_page_id();
        let elements = self.document.current_page().elements();
        self.history.ensure(page, elements).snapshot(elements);
    }

    /// Record the current page as a new history entry.
    pub fn snapshot(&mut self) {
        self.seed_history();
        self.record_history();
        self.notify(ChangeKind::Elements);
    }

    pub fn undo(&mut self) -> bool {
        self.seed_history();
        let page = self.document.current_page_id();
        let Some(elements) = self.history.get_mut(page).and_then(|h| h.undo()) else {
            return false;
        };
        self.restore(elements);
        true
    }

    pub fn redo(&mut self) -> bool {
        self.seed_history();
        let page = self.document.current_page_id();
        let Some(elements) = self.history.get_mut(page).and_then(|h| h.redo()) else {
            return false;
        };
        self.restore(elements);
        true
    }

    fn restore(&mut self, elements: Vec<Element>) {
        self.tool_manager.cancel();
        self.page_mut().replace_elements(elements);
        if let Some(id) = self.widgets.selected() {
            if !self.current_page().contains(id) {
                self.widgets.remove(id);
            }
        }
        self.prune_images();
        self.notify(ChangeKind::Elements);
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo(self.document.current_page_id())
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo(self.document.current_page_id())
    }

    /// Number of history entries for the current page.
    pub fn history_len(&self) -> usize {
        self.history
            .get(self.document.current_page_id())
            .map_or(0, |h| h.len())
    }

    // --- Text editing ---

    /// Open the inline editor on a text or sticky element.
    pub fn begin_text_edit(&mut self, id: ElementId) -> bool {
        let Some(text) = self.element(id).and_then(Element::text).map(str::to_string) else {
            return false;
        };
        self.tool_manager.cancel();
        self.widgets.enter_editing(id, &text);
        self.notify(ChangeKind::Selection);
        true
    }

    pub fn set_text_draft(&mut self, text: &str) -> bool {
        self.widgets.set_draft(text)
    }

    /// Write the edited text back. History is only recorded when it changed.
    pub fn commit_text_edit(&mut self) -> bool {
        let Some(edit) = self.widgets.exit_editing() else {
            return false;
        };
        if edit.is_changed()
            && self
                .page_mut()
                .update_element(edit.element_id, &ElementPatch::with_text(edit.draft))
        {
            self.record_history();
            self.notify(ChangeKind::Elements);
            return true;
        }
        self.notify(ChangeKind::Selection);
        false
    }

    /// Close the editor without touching the element.
    pub fn cancel_text_edit(&mut self) -> bool {
        if self.widgets.exit_editing().is_none() {
            return false;
        }
        self.notify(ChangeKind::Selection);
        true
    }

    // --- Selection ---

    pub fn select(&mut self, id: ElementId) -> bool {
        if !self.current_page().contains(id) {
            return false;
        }
        self.widgets.select(id);
        self.notify(ChangeKind::Selection);
        true
    }

    pub fn clear_selection(&mut self) {
        if self.widgets.selected().is_some() || self.widgets.is_editing() {
            self.widgets.clear_selection();
            self.notify(ChangeKind::Selection);
        }
    }

    // --- Tools and view ---

    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.widgets.is_editing() {
            self.commit_text_edit();
        }
        self.tool_manager.set_tool(tool);
        self.notify(ChangeKind::Tool);
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.camera.set_zoom(zoom);
        self.notify(ChangeKind::View);
    }

    /// Zoom keeping the canvas point under `screen_point` in place.
    pub fn zoom_at(&mut self, screen_point: Point, zoom: f64) -> bool {
        let changed = self.camera.zoom_at(screen_point, zoom);
        if changed {
            self.notify(ChangeKind::View);
        }
        changed
    }

    /// One wheel notch anchored at a screen point.
    pub fn wheel_zoom(&mut self, screen_point: Point, delta_y: f64) -> bool {
        let step = self.config.wheel_zoom_step;
        let changed = self.camera.wheel_zoom(screen_point, delta_y, step);
        if changed {
            self.notify(ChangeKind::View);
        }
        changed
    }

    pub fn set_pan(&mut self, offset: Vec2) {
        self.camera.set_offset(offset);
        self.notify(ChangeKind::View);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.camera.pan(delta);
        self.notify(ChangeKind::View);
    }

    // --- Document tree ---

    /// The current page changed: drop transient state and seed its history.
    ///
    /// Callers commit any open text edit before the document moves.
    fn page_switched(&mut self) {
        self.tool_manager.cancel();
        self.widgets.reset();
        self.seed_history();
        self.notify(ChangeKind::Document);
    }

    pub fn create_notebook(&mut self, name: &str) -> NotebookId {
        self.commit_text_edit();
        let id = self.document.create_notebook(name);
        self.page_switched();
        id
    }

    pub fn delete_notebook(&mut self, id: NotebookId) -> bool {
        self.commit_text_edit();
        let previous_page = self.document.current_page_id();
        let removed = self.document.delete_notebook(id);
        if removed.is_empty() {
            return false;
        }
        for page in removed {
            self.history.remove(page);
        }
        self.prune_images();
        if self.document.current_page_id() != previous_page {
            self.page_switched();
        } else {
            self.notify(ChangeKind::Document);
        }
        true
    }

    pub fn rename_notebook(&mut self, id: NotebookId, name: &str) -> bool {
        let renamed = self.document.rename_notebook(id, name);
        if renamed {
            self.notify(ChangeKind::Document);
        }
        renamed
    }

    pub fn select_notebook(&mut self, id: NotebookId) -> bool {
        self.commit_text_edit();
        if !self.document.select_notebook(id) {
            return false;
        }
        self.page_switched();
        true
    }

    pub fn create_page(&mut self, notebook: NotebookId, name: &str) -> Option<PageId> {
        self.commit_text_edit();
        let id = self.document.create_page(notebook, name)?;
        self.page_switched();
        Some(id)
    }

    pub fn delete_page(&mut self, notebook: NotebookId, page: PageId) -> bool {
        let previous_page = self.document.current_page_id();
        self.commit_text_edit();
        if !self.document.delete_page(notebook, page) {
            return false;
        }
        self.history.remove(page);
        self.prune_images();
        if self.document.current_page_id() != previous_page {
            self.page_switched();
        } else {
            self.notify(ChangeKind::Document);
        }
        true
    }

    pub fn rename_page(&mut self, notebook: NotebookId, page: PageId, name: &str) -> bool {
        let renamed = self.document.rename_page(notebook, page, name);
        if renamed {
            self.notify(ChangeKind::Document);
        }
        renamed
    }

    pub fn select_page(&mut self, page: PageId) -> bool {
        self.commit_text_edit();
        if !self.document.select_page(page) {
            return false;
        }
        self.page_switched();
        true
    }

    // --- Polls and Q&A ---

    pub fn add_poll<S: AsRef<str>>(&mut self, question: &str, options: &[S]) -> Option<PollId> {
        let id = self.page_mut().add_poll(question, options)?;
        self.notify(ChangeKind::Polls);
        Some(id)
    }

    /// Vote as the local user.
    pub fn vote_poll(&mut self, poll: PollId, option: OptionId) -> bool {
        let voter = self.preferences.user_id;
        self.poll_change(|page| page.vote_poll(poll, option, voter))
    }

    pub fn close_poll(&mut self, poll: PollId) -> bool {
        self.poll_change(|page| page.close_poll(poll))
    }

    pub fn toggle_poll_pin(&mut self, poll: PollId) -> bool {
        self.poll_change(|page| page.toggle_poll_pin(poll))
    }

    /// Ask a question as the local user.
    pub fn add_question(&mut self, text: &str) -> Option<QuestionId> {
        let (author, name) = (self.preferences.user_id, self.preferences.user_name.clone());
        let id = self.page_mut().add_question(text, author, &name)?;
        self.notify(ChangeKind::Polls);
        Some(id)
    }

    pub fn upvote_question(&mut self, question: QuestionId) -> bool {
        let user = self.preferences.user_id;
        self.poll_change(|page| page.upvote_question(question, user))
    }

    pub fn mark_question_answered(&mut self, question: QuestionId) -> bool {
        self.poll_change(|page| page.mark_question_answered(question))
    }

    fn poll_change(&mut self, f: impl FnOnce(&mut Page) -> bool) -> bool {
        let changed = f(self.page_mut());
        if changed {
            self.notify(ChangeKind::Polls);
        }
        changed
    }

    // --- Session and preferences ---

    pub fn create_session(&mut self) -> String {
        let code = self
            .session
            .create(self.preferences.user_id, &self.preferences.user_name);
        self.notify(ChangeKind::Session);
        code
    }

    /// Join with a display name, which also becomes the stored user name.
    pub fn join_session(&mut self, code: &str, name: &str) -> Result<String, SessionError> {
        let code = self.session.join(code, self.preferences.user_id, name)?;
        self.preferences.user_name = name.to_string();
        self.persist();
        self.notify(ChangeKind::Session);
        Ok(code)
    }

    pub fn leave_session(&mut self) -> Result<(), SessionError> {
        self.session.leave(self.preferences.user_id)?;
        self.notify(ChangeKind::Session);
        Ok(())
    }

    /// Share the local pointer (canvas space) with the roster.
    pub fn update_cursor(&mut self, position: Point) -> bool {
        let updated = self.session.update_cursor(self.preferences.user_id, position);
        if updated {
            self.notify(ChangeKind::Session);
        }
        updated
    }

    /// Rename the local user. Inside a session this is one `Session` change.
    pub fn set_user_name(&mut self, name: &str) {
        self.preferences.user_name = name.to_string();
        if self.session.rename(self.preferences.user_id, name) {
            self.persist();
            self.notify(ChangeKind::Session);
        } else {
            self.notify(ChangeKind::Preferences);
        }
    }

    pub fn toggle_dark_mode(&mut self) -> bool {
        self.preferences.dark_mode = !self.preferences.dark_mode;
        self.notify(ChangeKind::Preferences);
        self.preferences.dark_mode
    }
}

fn element_on_any_page(document: &DocumentTree, id: ElementId) -> bool {
    document
        .notebooks()
        .iter()
        .flat_map(|n| n.pages())
        .any(|p| p.contains(id))
}
