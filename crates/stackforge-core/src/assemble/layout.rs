//! Path template expansion and namespace placement

use super::naming::{to_kebab_case, to_upper_camel_case};
use crate::config::{Frontend, ValidConfig};
use crate::resolve::GenerationTask;

/// File extension of the client entry script
fn script_extension(frontend: Frontend) -> &'static str {
    match frontend {
        Frontend::React => "jsx",
        Frontend::Vue | Frontend::Svelte | Frontend::None => "js",
    }
}

/// File extension of client components
fn component_extension(frontend: Frontend) -> &'static str {
    match frontend {
        Frontend::React => "jsx",
        Frontend::Vue => "vue",
        Frontend::Svelte => "svelte",
        Frontend::None => "js",
    }
}

/// Expand a task's path template and place it under its namespace directory
pub fn output_path(task: &GenerationTask, config: &ValidConfig) -> String {
    let spec = task.artifact.spec();
    let entity = spec.entity.unwrap_or_default();

    let relative = task
        .path_template
        .replace("{project}", &to_kebab_case(config.project_name()))
        .replace("{Project}", &to_upper_camel_case(config.project_name()))
        .replace("{Entity}", &to_upper_camel_case(entity))
        .replace("{script}", script_extension(config.frontend()))
        .replace("{component}", component_extension(config.frontend()));

    match task.namespace.directory() {
        Some(dir) => format!("{}/{}", dir, relative),
        None => relative,
    }
}
