//! Plan command implementation.
//!
//! The `rxboot plan` command shows the resolved launch plan without
//! running anything.

use std::path::PathBuf;

use crate::cli::args::PlanArgs;
use crate::config::StackLayout;
use crate::error::{RxbootError, Result};
use crate::requirements::{Interpreter, PythonRuntime, INTERPRETER_CANDIDATES};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The plan command implementation.
pub struct PlanCommand {
    context: CommandContext,
    args: PlanArgs,
}

impl PlanCommand {
    /// Create a new plan command.
    pub fn new(context: CommandContext, args: PlanArgs) -> Self {
        Self { context, args }
    }

    /// Interpreter the plan would use. Not required to exist.
    fn python(&self) -> PathBuf {
        if let Some(path) = &self.context.python {
            return path.clone();
        }
        Interpreter::discover(None)
            .map(|interpreter| interpreter.executable().to_path_buf())
            .unwrap_or_else(|_| PathBuf::from(INTERPRETER_CANDIDATES[0]))
    }
}

impl Command for PlanCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let layout = StackLayout::new(&self.context.project_root);
        let plan = layout.plan(&self.python());

        let rendered = if self.args.json {
            serde_json::to_string_pretty(&plan).map_err(|e| RxbootError::Other(e.into()))?
        } else {
            serde_yaml::to_string(&plan).map_err(|e| RxbootError::Other(e.into()))?
        };
        ui.message(rendered.trim_end());

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    fn context(root: &std::path::Path) -> CommandContext {
        let mut context = CommandContext::new(root.to_path_buf());
        context.python = Some(PathBuf::from("/opt/python/bin/python3"));
        context
    }

    #[test]
    fn json_plan_lists_both_services() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();

        let result = PlanCommand::new(context(temp.path()), PlanArgs { json: true })
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        let value: serde_json::Value = serde_json::from_str(&ui.messages()[0]).unwrap();
        let names: Vec<_> = value["services"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Backend API", "Frontend UI"]);
        assert_eq!(value["python"], "/opt/python/bin/python3");
    }

    #[test]
    fn yaml_plan_is_default() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();

        PlanCommand::new(context(temp.path()), PlanArgs::default())
            .execute(&mut ui)
            .unwrap();

        let yaml: serde_yaml::Value = serde_yaml::from_str(&ui.messages()[0]).unwrap();
        assert_eq!(yaml["minimum_python"].as_str(), Some("3.8"));
        assert!(ui.messages()[0].contains("api_docs: http://localhost:8000/api/docs"));
    }

    #[test]
    fn plan_has_no_side_effects() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(".env.template"), "KEY=\n").unwrap();

        PlanCommand::new(context(temp.path()), PlanArgs::default())
            .execute(&mut MockUI::new())
            .unwrap();

        assert!(!temp.path().join(".env").exists());
    }
}
