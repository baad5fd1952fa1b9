//! Initialize a new result repository

use crate::commands::utils::init_repository;
use crate::commands::Command;
use crate::error::Result;
use crate::ui::UI;

pub struct InitCommand {
    base_path: Option<String>,
}

impl InitCommand {
    pub fn new(base_path: Option<String>) -> Self {
        InitCommand { base_path }
    }
}

impl Command for InitCommand {
    fn execute(&self, ui: &mut dyn UI) -> Result<i32> {
        match init_repository(self.base_path.as_deref()) {
            Ok(_) => {
                ui.output("Initialized empty result repository")?;
                Ok(0)
            }
            Err(e) => {
                ui.error(&format!("Failed to initialize repository: {}", e))?;
                Ok(1)
            }
        }
    }

    fn name(&self) -> &str {
        "init"
    }

    fn help(&self) -> &str {
        "Initialize a new result repository in .robotr/"
    }
}
