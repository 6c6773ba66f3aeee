//! Notebook → page → element tree with current-selection pointers.

use crate::elements::{Element, ElementDraft, ElementId, ElementPatch};
use crate::poll::{OptionId, Poll, PollId, Question, QuestionId, UserId, sorted_questions};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};
#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};

pub type PageId = Uuid;
pub type NotebookId = Uuid;

/// Name given to the page every new notebook starts with.
pub const DEFAULT_PAGE_NAME: &str = "Page 1";
/// Name of the notebook created when none exist.
pub const DEFAULT_NOTEBOOK_NAME: &str = "My First Notebook";

/// Milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// A page: elements plus the polls and questions shown beside them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: PageId,
    pub name: String,
    #[serde(default)]
    elements: Vec<Element>,
    #[serde(default)]
    polls: Vec<Poll>,
    #[serde(default)]
    questions: Vec<Question>,
    /// Lowest z-index the next element may take.
    #[serde(default)]
    next_z_index: u64,
}

impl Page {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            elements: Vec::new(),
            polls: Vec::new(),
            questions: Vec::new(),
            next_z_index: 0,
        }
    }

    /// Elements in creation order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Elements back to front, the order they are painted in.
    pub fn elements_ordered(&self) -> Vec<&Element> {
        let mut ordered: Vec<&Element> = self.elements.iter().collect();
        ordered.sort_by_key(|e| e.z_index());
        ordered
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id() == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.element(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn next_z(&self) -> u64 {
        let above_existing = self
            .elements
            .iter()
            .map(|e| e.z_index() + 1)
            .max()
            .unwrap_or(0);
        self.next_z_index.max(above_existing)
    }

    /// Add an element with a fresh id on top of everything else.
    pub fn create_element(&mut self, draft: ElementDraft) -> ElementId {
        let z = self.next_z();
        let element = draft.into_element(z);
        let id = element.id();
        self.next_z_index = z + 1;
        self.elements.push(element);
        id
    }

    /// Merge `patch` into an element. Unknown ids are ignored.
    ///
    /// Returns true if the element exists and changed.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        match self.elements.iter_mut().find(|e| e.id() == id) {
            Some(element) => element.apply(patch),
            None => {
                log::debug!("update of unknown element {id} ignored");
                false
            }
        }
    }

    pub fn delete_element(&mut self, id: ElementId) -> Option<Element> {
        let index = self.elements.iter().position(|e| e.id() == id)?;
        Some(self.elements.remove(index))
    }

    /// Remove every element. Z-indices keep counting up from where they were.
    pub fn clear(&mut self) -> usize {
        self.next_z_index = self.next_z();
        let removed = self.elements.len();
        self.elements.clear();
        removed
    }

    /// Swap in a whole element list, e.g. a history snapshot.
    pub fn replace_elements(&mut self, elements: Vec<Element>) {
        self.next_z_index = self.next_z();
        self.elements = elements;
        self.next_z_index = self.next_z();
    }

    /// Give an element the highest z-index on the page.
    pub fn bring_to_front(&mut self, id: ElementId) -> bool {
        let z = self.next_z();
        let Some(element) = self.elements.iter_mut().find(|e| e.id() == id) else {
            return false;
        };
        if element.z_index + 1 == z {
            return false;
        }
        element.z_index = z;
        self.next_z_index = z + 1;
        true
    }

    /// Ids of elements under `point`, front to back.
    pub fn elements_at(&self, point: Point, tolerance: f64) -> Vec<ElementId> {
        let mut hits: Vec<&Element> = self
            .elements
            .iter()
            .filter(|e| e.hit_test(point, tolerance))
            .collect();
        hits.sort_by(|a, b| b.z_index().cmp(&a.z_index()));
        hits.into_iter().map(Element::id).collect()
    }

    /// Frontmost element under `point`.
    pub fn top_element_at(&self, point: Point, tolerance: f64) -> Option<ElementId> {
        self.elements
            .iter()
            .filter(|e| e.hit_test(point, tolerance))
            .max_by_key(|e| e.z_index())
            .map(Element::id)
    }

    pub fn polls(&self) -> &[Poll] {
        &self.polls
    }

    pub fn poll(&self, id: PollId) -> Option<&Poll> {
        self.polls.iter().find(|p| p.id == id)
    }

    fn poll_mut(&mut self, id: PollId) -> Option<&mut Poll> {
        self.polls.iter_mut().find(|p| p.id == id)
    }

    /// Returns `None` when the input doesn't make a valid poll.
    pub fn add_poll<S: AsRef<str>>(&mut self, question: &str, options: &[S]) -> Option<PollId> {
        let poll = Poll::new(question, options)?;
        let id = poll.id;
        self.polls.push(poll);
        Some(id)
    }

    pub fn vote_poll(&mut self, poll: PollId, option: OptionId, voter: UserId) -> bool {
        self.poll_mut(poll).is_some_and(|p| p.vote(option, voter))
    }

    pub fn close_poll(&mut self, poll: PollId) -> bool {
        match self.poll_mut(poll) {
            Some(p) if !p.closed => {
                p.close();
                true
            }
            _ => false,
        }
    }

    pub fn toggle_poll_pin(&mut self, poll: PollId) -> bool {
        self.poll_mut(poll).map(Poll::toggle_pin).is_some()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Questions in display order.
    pub fn sorted_questions(&self) -> Vec<&Question> {
        sorted_questions(&self.questions)
    }

    pub fn add_question(
        &mut self,
        text: &str,
        author_id: UserId,
        author_name: &str,
    ) -> Option<QuestionId> {
        let question = Question::new(text, author_id, author_name)?;
        let id = question.id;
        self.questions.push(question);
        Some(id)
    }

    pub fn upvote_question(&mut self, question: QuestionId, user: UserId) -> bool {
        self.question_mut(question).map(|q| q.upvote(user)).is_some()
    }

    pub fn mark_question_answered(&mut self, question: QuestionId) -> bool {
        self.question_mut(question)
            .map(Question::toggle_answered)
            .is_some()
    }

    fn question_mut(&mut self, id: QuestionId) -> Option<&mut Question> {
        self.questions.iter_mut().find(|q| q.id == id)
    }
}

/// A named, never-empty collection of pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notebook {
    pub id: NotebookId,
    pub name: String,
    pages: Vec<Page>,
    /// Milliseconds since the Unix epoch.
    pub created_at: u64,
}

impl Notebook {
    /// A notebook holding a single blank page.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            pages: vec![Page::new(DEFAULT_PAGE_NAME)],
            created_at: now_millis(),
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == id)
    }

    pub fn first_page(&self) -> Option<&Page> {
        self.pages.first()
    }

    fn ensure_page(&mut self) {
        if self.pages.is_empty() {
            self.pages.push(Page::new(DEFAULT_PAGE_NAME));
        }
    }
}

/// Root of the document: notebooks plus the current notebook/page pointers.
///
/// There is always at least one notebook, every notebook has at least one page
/// and the pointers always resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "DocumentTreeParts")]
pub struct DocumentTree {
    notebooks: Vec<Notebook>,
    current_notebook_id: NotebookId,
    current_page_id: PageId,
}

/// Wire shape of [`DocumentTree`]; deserialization always goes through repair.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentTreeParts {
    #[serde(default)]
    notebooks: Vec<Notebook>,
    #[serde(default)]
    current_notebook_id: Option<NotebookId>,
    #[serde(default)]
    current_page_id: Option<PageId>,
}

impl From<DocumentTreeParts> for DocumentTree {
    fn from(parts: DocumentTreeParts) -> Self {
        Self::from_parts(parts.notebooks, parts.current_notebook_id, parts.current_page_id)
    }
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentTree {
    pub fn new() -> Self {
        let notebook = Notebook::new(DEFAULT_NOTEBOOK_NAME);
        let current_notebook_id = notebook.id;
        let current_page_id = notebook.pages[0].id;
        Self {
            notebooks: vec![notebook],
            current_notebook_id,
            current_page_id,
        }
    }

    /// Rebuild from persisted parts, repairing anything that breaks the invariants.
    pub fn from_parts(
        notebooks: Vec<Notebook>,
        current_notebook_id: Option<NotebookId>,
        current_page_id: Option<PageId>,
    ) -> Self {
        let mut tree = Self {
            notebooks,
            current_notebook_id: current_notebook_id.unwrap_or_default(),
            current_page_id: current_page_id.unwrap_or_default(),
        };
        tree.repair();
        tree
    }

    /// Restore the non-empty invariants and re-point dangling pointers.
    ///
    /// Returns true if anything had to be fixed.
    pub fn repair(&mut self) -> bool {
        let mut repaired = false;
        if self.notebooks.is_empty() {
            self.notebooks.push(Notebook::new(DEFAULT_NOTEBOOK_NAME));
            repaired = true;
        }
        for notebook in &mut self.notebooks {
            if notebook.pages.is_empty() {
                notebook.ensure_page();
                repaired = true;
            }
        }

        let notebook = match self.notebook(self.current_notebook_id) {
            Some(notebook) => notebook,
            None => {
                repaired = true;
                match self
                    .notebooks
                    .iter()
                    .find(|n| n.page(self.current_page_id).is_some())
                {
                    Some(owner) => owner,
                    None => &self.notebooks[0],
                }
            }
        };
        let notebook_id = notebook.id;
        let page_id = match notebook.page(self.current_page_id) {
            Some(page) => page.id,
            None => {
                repaired = true;
                notebook.pages[0].id
            }
        };

        self.current_notebook_id = notebook_id;
        self.current_page_id = page_id;
        if repaired {
            log::debug!("document pointers repaired");
        }
        repaired
    }

    pub fn notebooks(&self) -> &[Notebook] {
        &self.notebooks
    }

    pub fn notebook(&self, id: NotebookId) -> Option<&Notebook> {
        self.notebooks.iter().find(|n| n.id == id)
    }

    fn notebook_mut(&mut self, id: NotebookId) -> Option<&mut Notebook> {
        self.notebooks.iter_mut().find(|n| n.id == id)
    }

    pub fn current_notebook_id(&self) -> NotebookId {
        self.current_notebook_id
    }

    pub fn current_page_id(&self) -> PageId {
        self.current_page_id
    }

    fn current_indices(&self) -> (usize, usize) {
        let notebook = self
            .notebooks
            .iter()
            .position(|n| n.id == self.current_notebook_id)
            .unwrap_or(0);
        let page = self.notebooks[notebook]
            .pages
            .iter()
            .position(|p| p.id == self.current_page_id)
            .unwrap_or(0);
        (notebook, page)
    }

    pub fn current_notebook(&self) -> &Notebook {
        let (notebook, _) = self.current_indices();
        &self.notebooks[notebook]
    }

    pub fn current_page(&self) -> &Page {
        let (notebook, page) = self.current_indices();
        &self.notebooks[notebook].pages[page]
    }

    pub fn current_page_mut(&mut self) -> &mut Page {
        let (notebook, page) = self.current_indices();
        &mut self.notebooks[notebook].pages[page]
    }

    /// Locate a page anywhere in the tree.
    pub fn find_page(&self, id: PageId) -> Option<(&Notebook, &Page)> {
        self.notebooks
            .iter()
            .find_map(|n| n.page(id).map(|p| (n, p)))
    }

    /// Create a notebook with one blank page and make it current.
    pub fn create_notebook(&mut self, name: &str) -> NotebookId {
        let name = name.trim();
        let name = if name.is_empty() { DEFAULT_NOTEBOOK_NAME } else { name };
        let notebook = Notebook::new(name);
        let id = notebook.id;
        self.current_notebook_id = id;
        self.current_page_id = notebook.pages[0].id;
        self.notebooks.push(notebook);
        log::debug!("created notebook {id}");
        id
    }

    /// Delete a notebook. Returns the ids of the pages that went with it.
    ///
    /// Deleting the last notebook replaces it with a fresh default one.
    pub fn delete_notebook(&mut self, id: NotebookId) -> Vec<PageId> {
        let Some(index) = self.notebooks.iter().position(|n| n.id == id) else {
            log::debug!("delete of unknown notebook {id} ignored");
            return Vec::new();
        };
        let removed = self.notebooks.remove(index);
        if self.notebooks.is_empty() {
            self.notebooks.push(Notebook::new(DEFAULT_NOTEBOOK_NAME));
        }
        if self.current_notebook_id == id {
            let first = &self.notebooks[0];
            self.current_notebook_id = first.id;
            self.current_page_id = first.pages[0].id;
        }
        log::debug!("deleted notebook {id}");
        removed.pages.iter().map(|p| p.id).collect()
    }

    /// Blank names are ignored.
    pub fn rename_notebook(&mut self, id: NotebookId, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        match self.notebook_mut(id) {
            Some(notebook) => {
                notebook.name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Make a notebook current, landing on its first page.
    pub fn select_notebook(&mut self, id: NotebookId) -> bool {
        let Some(notebook) = self.notebook(id) else {
            return false;
        };
        let page = notebook.pages[0].id;
        self.current_notebook_id = id;
        self.current_page_id = page;
        true
    }

    /// Append a blank page to a notebook and make it current.
    pub fn create_page(&mut self, notebook_id: NotebookId, name: &str) -> Option<PageId> {
        let name = name.trim();
        let notebook = self.notebook_mut(notebook_id)?;
        let name = if name.is_empty() {
            format!("Page {}", notebook.pages.len() + 1)
        } else {
            name.to_string()
        };
        let page = Page::new(name);
        let id = page.id;
        notebook.pages.push(page);
        self.current_notebook_id = notebook_id;
        self.current_page_id = id;
        log::debug!("created page {id}");
        Some(id)
    }

    /// Delete a page. Deleting the last page of a notebook leaves a fresh blank one.
    ///
    /// Returns false when the page is not in that notebook.
    pub fn delete_page(&mut self, notebook_id: NotebookId, page_id: PageId) -> bool {
        let Some(notebook) = self.notebook_mut(notebook_id) else {
            return false;
        };
        let Some(index) = notebook.pages.iter().position(|p| p.id == page_id) else {
            log::debug!("delete of unknown page {page_id} ignored");
            return false;
        };
        notebook.pages.remove(index);
        notebook.ensure_page();
        let first = notebook.pages[0].id;

        if self.current_page_id == page_id {
            self.current_notebook_id = notebook_id;
            self.current_page_id = first;
        }
        log::debug!("deleted page {page_id}");
        true
    }

    pub fn rename_page(&mut self, notebook_id: NotebookId, page_id: PageId, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        let Some(page) = self
            .notebook_mut(notebook_id)
            .and_then(|n| n.pages.iter_mut().find(|p| p.id == page_id))
        else {
            return false;
        };
        page.name = name.to_string();
        true
    }

    /// Make a page current, switching notebooks if it lives elsewhere.
    pub fn select_page(&mut self, page_id: PageId) -> bool {
        let Some((notebook, page)) = self.find_page(page_id) else {
            log::debug!("select of unknown page {page_id} ignored");
            return false;
        };
        let (notebook_id, page_id) = (notebook.id, page.id);
        self.current_notebook_id = notebook_id;
        self.current_page_id = page_id;
        true
    }
}
