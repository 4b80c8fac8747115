use std::path::Path;

use eframe::egui;

use crate::command::Command;
use crate::config::EditorConfig;
use crate::element::{ElementPatch, KindPatch, factory};
use crate::error::ExportError;
use crate::export::Exporter;
use crate::file_handler::{DroppedItem, FileHandler};
use crate::input::InputHandler;
use crate::panels::{self, PropertiesPanel};
use crate::pdf_import::{self, ExtractedDocument, ExtractedFields};
use crate::renderer::Renderer;
use crate::state::{DocumentSnapshot, EditorModel, StatePersistence};
use crate::template;
use crate::tools::SelectionTool;

/// How long a status message stays in the top bar, in seconds
const STATUS_TIMEOUT: f64 = 6.0;

/// An imported PDF and the page currently shown
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSession {
    pub document: ExtractedDocument,
    /// 0-based
    pub page: usize,
}

impl ImportSession {
    pub fn new(document: ExtractedDocument) -> Self {
        Self { document, page: 0 }
    }

    pub fn fields(&self) -> ExtractedFields {
        self.document
            .page(self.page)
            .map(|page| page.data.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Screen {
    #[default]
    Start,
    Editor,
    /// Review extracted text and fields before opening them in the editor
    Import(ImportSession),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    /// egui time when the message was posted; `None` until first shown
    posted_at: Option<f64>,
}

/// We derive Deserialize/Serialize so we can persist app state on shutdown.
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct EditorApp {
    pub(crate) config: EditorConfig,
    /// Percent
    pub(crate) zoom: u32,
    pub(crate) show_grid: bool,

    #[serde(skip)]
    pub(crate) model: EditorModel,
    #[serde(skip)]
    pub(crate) tool: SelectionTool,
    #[serde(skip)]
    pub(crate) input: InputHandler,
    #[serde(skip)]
    pub(crate) renderer: Renderer,
    #[serde(skip)]
    pub(crate) properties: PropertiesPanel,
    #[serde(skip)]
    pub(crate) exporter: Exporter,
    #[serde(skip)]
    file_handler: FileHandler,
    #[serde(skip)]
    autosave: Option<StatePersistence>,
    #[serde(skip)]
    pub(crate) screen: Screen,
    /// Set when the editor shows a page of an imported PDF
    #[serde(skip)]
    pub(crate) source: Option<ImportSession>,
    #[serde(skip)]
    status: Option<StatusMessage>,
    /// Path typed into the "import PDF" field
    #[serde(skip)]
    pub(crate) import_path: String,
}

impl Default for EditorApp {
    fn default() -> Self {
        Self::with_config(EditorConfig::default())
    }
}

impl std::fmt::Debug for EditorApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorApp")
            .field("zoom", &self.zoom)
            .field("elements", &self.model.elements().len())
            .field("screen", &self.screen)
            .field("exporting", &self.exporter.in_flight())
            .finish_non_exhaustive()
    }
}

impl EditorApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let stored = cc
            .storage
            .and_then(|storage| eframe::get_value::<EditorApp>(storage, eframe::APP_KEY));
        let (mut config, zoom, show_grid) = match stored {
            Some(app) => (app.config, app.zoom, app.show_grid),
            None => (EditorConfig::default(), 100, true),
        };
        if let Some(from_env) = EditorConfig::from_env() {
            config = from_env;
        }
        if let Err(err) = config.validate() {
            log::warn!("Stored config rejected, using defaults: {}", err);
            config = EditorConfig::default();
        }

        let mut app = Self::with_config(config);
        app.zoom = app.config.clamp_zoom(zoom);
        app.set_show_grid(show_grid);
        app
    }

    /// Fresh runtime state for a configuration
    pub fn with_config(config: EditorConfig) -> Self {
        let autosave = config.autosave_dir.clone().map(|dir| {
            StatePersistence::new(dir).with_interval(config.autosave_interval)
        });
        Self {
            model: EditorModel::new(&config),
            tool: SelectionTool::new(&config),
            input: InputHandler::new(),
            renderer: Renderer::new(),
            properties: PropertiesPanel::default(),
            exporter: Exporter::default(),
            file_handler: FileHandler::new(),
            autosave,
            screen: Screen::Start,
            source: None,
            status: None,
            import_path: String::new(),
            zoom: 100,
            show_grid: true,
            config,
        }
    }

    pub fn model(&self) -> &EditorModel {
        &self.model
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn set_show_grid(&mut self, show: bool) {
        self.show_grid = show;
        self.renderer.set_show_grid(show);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = self.config.clamp_zoom(self.zoom + self.config.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self
            .config
            .clamp_zoom(self.zoom.saturating_sub(self.config.zoom_step));
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind: StatusKind::Info,
            posted_at: None,
        });
    }

    pub fn error(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::error!("{}", text);
        self.status = Some(StatusMessage {
            text,
            kind: StatusKind::Error,
            posted_at: None,
        });
    }

    /// Execute commands from a panel or tool, logging the ones that miss
    pub fn execute(&mut self, commands: Vec<Command>) {
        for src in edited_image_sources(&commands) {
            self.renderer.reload_image(src);
        }
        self.model.execute_all(commands);
    }

    /// Swap in a new element collection, abandoning any gesture
    fn load_elements(&mut self, elements: Vec<crate::element::Element>) {
        self.tool.reset();
        self.execute(vec![Command::ReplaceAll(elements)]);
        self.screen = Screen::Editor;
    }

    pub fn new_document(&mut self) {
        log::info!("New blank document");
        self.source = None;
        self.load_elements(Vec::new());
    }

    pub fn load_template(&mut self, id: &str) {
        match template::find(id) {
            Some(template) => {
                log::info!("Loading template {}", template.name);
                self.source = None;
                self.load_elements(template.instantiate());
            }
            None => self.error(format!("Unknown template: {}", id)),
        }
    }

    /// Import a PDF from a path on disk
    pub fn import_pdf_path(&mut self, path: &Path) {
        match pdf_import::import_file(path) {
            Ok(document) => self.screen = Screen::Import(ImportSession::new(document)),
            Err(err) => self.error(err.to_string()),
        }
    }

    pub fn import_pdf_bytes(&mut self, name: &str, bytes: &[u8]) {
        log::info!("Importing {}", name);
        match pdf_import::extract_document(bytes) {
            Ok(document) => self.screen = Screen::Import(ImportSession::new(document)),
            Err(err) => self.error(err.to_string()),
        }
    }

    /// Open the reviewed import in the editor: the invoice template filled
    /// from the page's fields, or the page's raw text
    pub fn open_import(&mut self, session: ImportSession, raw_text: bool) {
        let elements = if raw_text {
            match session.document.page(session.page) {
                Some(page) => template::raw_text_document(page),
                None => Vec::new(),
            }
        } else {
            template::populate_template(&template::invoice(), &session.fields())
        };
        self.load_elements(elements);
        self.source = Some(session);
    }

    /// Reload the invoice template for another page of the imported PDF
    pub fn go_to_import_page(&mut self, page: usize) {
        let Some(mut session) = self.source.take() else {
            return;
        };
        if page < session.document.pages.len() && page != session.page {
            session.page = page;
            self.info(format!("Page {} of {}", page + 1, session.document.total_pages));
        }
        let elements = template::populate_template(&template::invoice(), &session.fields());
        self.load_elements(elements);
        self.source = Some(session);
    }

    pub fn start_export(&mut self) {
        match self.exporter.start(self.model.elements(), &self.config) {
            Ok(()) => self.info("Exporting PDF..."),
            Err(ExportError::EmptyDocument) => {
                self.error(ExportError::EmptyDocument.to_string());
            }
            Err(err) => self.error(format!("Export failed: {}", err)),
        }
    }

    /// Export the fixed case summary for the given fields
    pub fn start_smart_fill_export(&mut self, fields: &ExtractedFields) {
        let elements = template::smart_fill_document(fields);
        match self.exporter.start(&elements, &self.config) {
            Ok(()) => self.info("Generating case summary PDF..."),
            Err(err) => self.error(format!("Export failed: {}", err)),
        }
    }

    fn poll_export(&mut self, ctx: &egui::Context) {
        if !self.exporter.in_flight() {
            return;
        }
        match self.exporter.poll() {
            Some(Ok(path)) => self.info(format!("PDF saved to {}", path.display())),
            Some(Err(err)) => self.error(format!("Export failed: {}", err)),
            None => ctx.request_repaint_after(std::time::Duration::from_millis(100)),
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        if !self.file_handler.check_for_dropped_files(ctx) {
            return;
        }
        // drop at the pointer when it is over the page
        let at = ctx
            .input(|i| i.pointer.hover_pos())
            .map(|pos| self.input.transform().to_page(pos))
            .filter(|pos| pos.x >= 0.0 && pos.y >= 0.0)
            .unwrap_or(egui::pos2(100.0, 300.0));

        for item in self.file_handler.process_dropped_files() {
            match item {
                DroppedItem::Image { name, data_uri } => {
                    if self.screen != Screen::Editor {
                        self.new_document();
                    }
                    log::info!("Placing {}", name);
                    self.execute(vec![Command::AddElement(factory::image_with_src(data_uri, at))]);
                }
                DroppedItem::Pdf { name, bytes } => self.import_pdf_bytes(&name, &bytes),
            }
        }
    }

    pub fn latest_autosave(&self) -> Option<std::path::PathBuf> {
        let autosave = self.autosave.as_ref()?;
        match autosave.find_latest_autosave() {
            Ok(path) => path,
            Err(err) => {
                log::warn!("Can't list autosaves: {}", err);
                None
            }
        }
    }

    pub fn restore_autosave(&mut self, path: &Path) {
        match DocumentSnapshot::load_from(path) {
            Ok(snapshot) => {
                log::info!("Restored {} elements from {}", snapshot.elements.len(), path.display());
                self.source = None;
                self.load_elements(snapshot.elements);
            }
            Err(err) => self.error(format!("Failed to restore session: {}", err)),
        }
    }

    fn autosave(&mut self) {
        let Some(autosave) = self.autosave.as_mut() else {
            return;
        };
        if let Err(err) = autosave.try_autosave(self.model.elements()) {
            log::warn!("Autosave failed: {}", err);
        }
    }

    /// The current status text, dropping it once it has been shown long enough
    pub(crate) fn visible_status(&mut self, now: f64) -> Option<&StatusMessage> {
        let expired = self.status.as_mut().is_some_and(|status| {
            let posted = *status.posted_at.get_or_insert(now);
            now - posted > STATUS_TIMEOUT
        });
        if expired {
            self.status = None;
        }
        self.status.as_ref()
    }
}

impl eframe::App for EditorApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_export(ctx);
        self.file_handler.preview_files_being_dropped(ctx);
        self.handle_dropped_files(ctx);

        match self.screen {
            Screen::Start => panels::start_page(self, ctx),
            Screen::Import(_) => panels::import_panel(self, ctx),
            Screen::Editor => {
                panels::top_bar(self, ctx);
                panels::tools_panel(self, ctx);
                let commands = self.properties.show(ctx, &self.model);
                self.execute(commands);
                panels::central_panel(self, ctx);
                self.autosave();
            }
        }
    }
}

/// Image sources written by `UpdateElement` commands
fn edited_image_sources(commands: &[Command]) -> impl Iterator<Item = &str> {
    commands.iter().filter_map(|command| match command {
        Command::UpdateElement {
            patch:
                ElementPatch {
                    kind: Some(KindPatch::Image { src }),
                    ..
                },
            ..
        } if !src.is_empty() => Some(src.as_str()),
        _ => None,
    })
}
