#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod command;
pub mod components;
pub mod config;
pub mod document;
pub mod element;
pub mod error;
pub mod export;
pub mod file_handler;
pub mod geometry;
pub mod id_generator;
pub mod input;
pub mod panels;
pub mod pdf_import;
pub mod renderer;
pub mod scene;
pub mod state;
pub mod template;
pub mod texture_manager;
pub mod tools;
pub mod util;
pub mod widgets;

pub use app::EditorApp;
pub use command::{Command, CommandError, History};
pub use config::EditorConfig;
pub use document::Document;
pub use element::{Element, ElementKind, ElementPatch, ElementPrototype};
pub use error::{ExportError, ImportError};
pub use export::export_to_pdf;
pub use id_generator::ElementId;
pub use input::{InputEvent, PageTransform};
pub use pdf_import::{ExtractedDocument, ExtractedFields, extract_document};
pub use renderer::Renderer;
pub use state::{EditorModel, EditorState};
pub use tools::{SelectionTool, Tool};
