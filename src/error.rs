use std::path::PathBuf;
use thiserror::Error;

pub type FillResult<T> = Result<T, FillError>;

#[derive(Error, Debug)]
pub enum FillError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Template not found at: {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Invalid layout: {0}")]
    Layout(String),

    #[error("Workbook error: {0}")]
    Workbook(String),
}
