//! The rename-template workflow.
//!
//! A fixed sequence of steps: validate, check preconditions, plan, rename
//! directories and files, rewrite contents per category group, rename the
//! solution file, rewrite docs, then optionally build, test and initialize
//! version control. Nothing is rolled back; a failing step stops the run and
//! the steps already applied stay applied.

use serde::Serialize;
use std::path::Path;

use crate::build::BuildVerifier;
use crate::defaults::RetemplateConfig;
use crate::error::{Error, Result};
use crate::naming;
use crate::refactor::{
    apply_renames, rewrite_pass, FileCategory, FileEdit, FileFailure, FileSkip, PassOutcome,
    PathRename, RenameLedger, RenameOutcome, RenamePlan, RenameWarning,
};
use crate::runner::CommandRunner;
use crate::utils::paths;
use crate::vcs;

#[derive(Debug, Clone)]
pub struct RenameRequest {
    pub old_token: String,
    pub new_token: String,
    pub skip_build: bool,
    pub skip_vcs_init: bool,
    /// Proceed past the precondition prompt without asking.
    pub assume_yes: bool,
    /// Compute and report the plan without touching the tree.
    pub dry_run: bool,
}

impl RenameRequest {
    pub fn new(old_token: impl Into<String>, new_token: impl Into<String>) -> Self {
        Self {
            old_token: old_token.into(),
            new_token: new_token.into(),
            skip_build: false,
            skip_vcs_init: false,
            assume_yes: false,
            dry_run: false,
        }
    }
}

/// Asks the user to confirm a risky continuation.
pub trait Confirm {
    fn confirm(&self, message: &str) -> Result<bool>;
}

/// Declines every confirmation. Used when no one can be asked.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeNo;

impl Confirm for AssumeNo {
    fn confirm(&self, _message: &str) -> Result<bool> {
        Ok(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Validate,
    CheckPreconditions,
    RenameDirectories,
    RenameFiles,
    RewriteSource,
    RewriteManifests,
    RewriteSolution,
    RenameSolutionFile,
    RewriteDocs,
    Build,
    Test,
    VcsInit,
}

impl Step {
    pub fn label(&self) -> &'static str {
        match self {
            Step::Validate => "Validating name",
            Step::CheckPreconditions => "Checking template",
            Step::RenameDirectories => "Renaming directories",
            Step::RenameFiles => "Renaming files",
            Step::RewriteSource => "Updating source files",
            Step::RewriteManifests => "Updating project and build files",
            Step::RewriteSolution => "Updating solution",
            Step::RenameSolutionFile => "Renaming solution",
            Step::RewriteDocs => "Updating documentation and editor files",
            Step::Build => "Building",
            Step::Test => "Testing",
            Step::VcsInit => "Initializing repository",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Started,
    Succeeded,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub step: Step,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RenameSummary {
    pub old_token: String,
    pub new_token: String,
    pub root: String,
    pub dry_run: bool,
    pub directories_renamed: usize,
    pub files_renamed: usize,
    pub files_updated: usize,
    pub replacements: usize,
    pub files_unchanged: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    pub renamed: Vec<PathRename>,
    pub updated: Vec<FileEdit>,
    pub skipped: Vec<FileSkip>,
    pub failures: Vec<FileFailure>,
    pub warnings: Vec<RenameWarning>,
    pub steps: Vec<StepRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<RenamePlan>,
    pub success: bool,
}

impl RenameSummary {
    fn begin(&mut self, step: Step) {
        crate::log_status!("rename", "{}...", step.label());
        self.steps.push(StepRecord {
            step,
            status: StepStatus::Started,
            message: None,
        });
    }

    fn finish(&mut self, status: StepStatus, message: Option<String>) {
        if let Some(record) = self.steps.last_mut() {
            match (&status, &message) {
                (StepStatus::Succeeded, None) => {
                    crate::log_status!("rename", "{}: done", record.step.label())
                }
                (_, Some(msg)) => {
                    crate::log_status!("rename", "{}: {}", record.step.label(), msg)
                }
                (_, None) => crate::log_status!("rename", "{}: {:?}", record.step.label(), status),
            }
            record.status = status;
            record.message = message;
        }
    }

    fn skip(&mut self, step: Step, reason: &str) {
        self.begin(step);
        self.finish(StepStatus::Skipped, Some(reason.to_string()));
    }

    fn absorb_renames(&mut self, outcome: RenameOutcome) {
        for rename in &outcome.renamed {
            if rename.is_dir {
                self.directories_renamed += 1;
            } else {
                self.files_renamed += 1;
            }
        }
        self.renamed.extend(outcome.renamed);
        self.warnings.extend(outcome.warnings);
        self.failures.extend(outcome.failures);
    }

    fn absorb_pass(&mut self, outcome: PassOutcome) {
        self.files_updated += outcome.updated.len();
        self.replacements += outcome.updated.iter().map(|e| e.replacements).sum::<usize>();
        self.files_unchanged += outcome.unchanged;
        self.updated.extend(outcome.updated);
        self.skipped.extend(outcome.skipped);
        self.failures.extend(outcome.failures);
    }

    fn step_message(count: usize, noun: &str, failed: usize) -> Option<String> {
        if failed == 0 {
            Some(format!("{} {}", count, noun))
        } else {
            Some(format!("{} {}, {} failed", count, noun, failed))
        }
    }

    /// Attach the partial summary to a step error and mark the step failed.
    fn fail(&mut self, err: Error) -> Error {
        self.finish(StepStatus::Failed, Some(err.message.clone()));
        self.close();
        let summary = serde_json::to_value(&*self).unwrap_or(serde_json::Value::Null);
        err.with_detail("summary", summary)
    }

    fn close(&mut self) {
        self.files_skipped = self.skipped.len();
        self.files_failed = self.failures.len();
        self.success = self.failures.is_empty()
            && self.steps.iter().all(|s| s.status != StepStatus::Failed);
    }
}

/// Runs the rename workflow over one template root.
pub struct TemplateRenameOrchestrator<'a> {
    root: &'a Path,
    config: &'a RetemplateConfig,
    runner: &'a dyn CommandRunner,
    confirm: &'a dyn Confirm,
}

impl<'a> TemplateRenameOrchestrator<'a> {
    pub fn new(
        root: &'a Path,
        config: &'a RetemplateConfig,
        runner: &'a dyn CommandRunner,
        confirm: &'a dyn Confirm,
    ) -> Self {
        Self {
            root,
            config,
            runner,
            confirm,
        }
    }

    pub fn run(&self, request: &RenameRequest) -> Result<RenameSummary> {
        let mut summary = RenameSummary {
            old_token: request.old_token.clone(),
            new_token: request.new_token.clone(),
            root: self.root.display().to_string(),
            dry_run: request.dry_run,
            ..Default::default()
        };

        summary.begin(Step::Validate);
        self.validate(request).map_err(|e| summary.fail(e))?;
        summary.finish(StepStatus::Succeeded, None);

        summary.begin(Step::CheckPreconditions);
        let message = self
            .check_preconditions(request)
            .map_err(|e| summary.fail(e))?;
        summary.finish(StepStatus::Succeeded, message);

        let rename = &self.config.rename;
        let plan = RenamePlan::build(self.root, &request.old_token, &request.new_token, rename);
        tracing::debug!(
            directories = plan.directories.len(),
            files = plan.files.len() + plan.solution_files.len(),
            targets = plan.targets.len(),
            "built rename plan"
        );

        if request.dry_run {
            for step in [
                Step::RenameDirectories,
                Step::RenameFiles,
                Step::RewriteSource,
                Step::RewriteManifests,
                Step::RewriteSolution,
                Step::RenameSolutionFile,
                Step::RewriteDocs,
                Step::Build,
                Step::Test,
                Step::VcsInit,
            ] {
                summary.skip(step, "dry run");
            }
            summary.plan = Some(plan);
            summary.close();
            return Ok(summary);
        }

        let policy = rename.file_error_policy;
        let old = request.old_token.as_str();
        let new = request.new_token.as_str();
        let mut ledger = RenameLedger::new();

        summary.begin(Step::RenameDirectories);
        let outcome = apply_renames(self.root, &plan.directories, &mut ledger, policy)
            .map_err(|e| summary.fail(e))?;
        let msg = RenameSummary::step_message(outcome.renamed.len(), "renamed", outcome.failures.len());
        summary.absorb_renames(outcome);
        summary.finish(StepStatus::Succeeded, msg);

        summary.begin(Step::RenameFiles);
        let outcome = apply_renames(self.root, &plan.files, &mut ledger, policy)
            .map_err(|e| summary.fail(e))?;
        let msg = RenameSummary::step_message(outcome.renamed.len(), "renamed", outcome.failures.len());
        summary.absorb_renames(outcome);
        summary.finish(StepStatus::Succeeded, msg);

        let passes: [(Step, &[FileCategory]); 3] = [
            (Step::RewriteSource, &[FileCategory::Source]),
            (
                Step::RewriteManifests,
                &[FileCategory::ProjectManifest, FileCategory::BuildConfig],
            ),
            (Step::RewriteSolution, &[FileCategory::SolutionManifest]),
        ];
        for (step, categories) in passes {
            summary.begin(step);
            let outcome = rewrite_pass(
                self.root,
                plan.targets_in(categories),
                &ledger,
                old,
                new,
                rename.match_mode,
                policy,
            )
            .map_err(|e| summary.fail(e))?;
            let msg = RenameSummary::step_message(outcome.updated.len(), "updated", outcome.failures.len());
            summary.absorb_pass(outcome);
            summary.finish(StepStatus::Succeeded, msg);
        }

        summary.begin(Step::RenameSolutionFile);
        let outcome = apply_renames(self.root, &plan.solution_files, &mut ledger, policy)
            .map_err(|e| summary.fail(e))?;
        let msg = RenameSummary::step_message(outcome.renamed.len(), "renamed", outcome.failures.len());
        summary.absorb_renames(outcome);
        summary.finish(StepStatus::Succeeded, msg);

        summary.begin(Step::RewriteDocs);
        let outcome = rewrite_pass(
            self.root,
            plan.targets_in(&[FileCategory::Documentation, FileCategory::EditorConfig]),
            &ledger,
            old,
            new,
            rename.match_mode,
            policy,
        )
        .map_err(|e| summary.fail(e))?;
        let msg = RenameSummary::step_message(outcome.updated.len(), "updated", outcome.failures.len());
        summary.absorb_pass(outcome);
        summary.finish(StepStatus::Succeeded, msg);

        if request.skip_build {
            summary.skip(Step::Build, "--skip-build");
            summary.skip(Step::Test, "--skip-build");
        } else {
            let verifier = BuildVerifier::new(self.runner, self.root, &self.config.toolchain);

            summary.begin(Step::Build);
            verifier.build().map_err(|e| summary.fail(e))?;
            summary.finish(StepStatus::Succeeded, None);

            summary.begin(Step::Test);
            verifier.test().map_err(|e| summary.fail(e))?;
            summary.finish(StepStatus::Succeeded, None);
        }

        if request.skip_vcs_init {
            summary.skip(Step::VcsInit, "--skip-vcs-init");
        } else if vcs::is_repository(self.root) {
            summary.skip(Step::VcsInit, "already a repository");
        } else {
            summary.begin(Step::VcsInit);
            vcs::initialize(self.runner, self.root, &self.config.vcs).map_err(|e| summary.fail(e))?;
            summary.finish(StepStatus::Succeeded, None);
        }

        summary.close();
        crate::log_status!(
            "rename",
            "{} files updated, {} skipped, {} failed: {}",
            summary.files_updated,
            summary.files_skipped,
            summary.files_failed,
            if summary.success { "success" } else { "completed with failures" }
        );

        Ok(summary)
    }

    fn validate(&self, request: &RenameRequest) -> Result<()> {
        naming::require_valid("new_name", &request.new_token)?;
        if request.new_token == request.old_token {
            return Err(Error::validation_invalid_argument(
                "new_name",
                "New name is the same as the placeholder",
                Some(request.new_token.clone()),
            ));
        }
        Ok(())
    }

    /// Returns a note for the step record when the run proceeds past a warning.
    fn check_preconditions(&self, request: &RenameRequest) -> Result<Option<String>> {
        if !self.root.is_dir() {
            return Err(Error::validation_invalid_argument(
                "path",
                "Template root is not a directory",
                Some(self.root.display().to_string()),
            ));
        }

        let expected = paths::with_last(&self.config.rename.source_dir, &request.old_token);
        if paths::join_relative(self.root, &expected).is_dir() {
            return Ok(None);
        }

        let warning = format!(
            "'{}' not found; this template may already be customized",
            expected
        );
        crate::log_status!("rename", "Warning: {}", warning);

        if request.dry_run {
            return Ok(Some(format!("{} (dry run)", warning)));
        }
        if request.assume_yes {
            return Ok(Some(format!("{} (--yes)", warning)));
        }
        if self.confirm.confirm(&format!("{}. Continue anyway?", warning))? {
            return Ok(Some(format!("{} (confirmed)", warning)));
        }

        Err(Error::template_precondition_declined(expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::testing::FakeRunner;
    use std::fs;
    use tempfile::TempDir;

    struct AssumeYes;

    impl Confirm for AssumeYes {
        fn confirm(&self, _message: &str) -> Result<bool> {
            Ok(true)
        }
    }

    fn touch(root: &Path, relative: &str, content: &str) {
        let path = paths::join_relative(root, relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn template() -> TempDir {
        let dir = TempDir::new().unwrap();
        touch(
            dir.path(),
            "YourLibrary.sln",
            "Project(\"{FAE}\") = \"YourLibrary\", \"src\\YourLibrary\\YourLibrary.csproj\"\n",
        );
        touch(
            dir.path(),
            "src/YourLibrary/YourLibrary.csproj",
            "<Project><RootNamespace>YourLibrary</RootNamespace></Project>\n",
        );
        touch(dir.path(), "src/YourLibrary/Class1.cs", "namespace YourLibrary;\n");
        touch(dir.path(), "README.md", "# YourLibrary\n");
        dir
    }

    fn request(new: &str) -> RenameRequest {
        RenameRequest {
            skip_vcs_init: true,
            ..RenameRequest::new("YourLibrary", new)
        }
    }

    #[test]
    fn full_run_renames_rewrites_builds_and_commits() {
        let dir = template();
        let config = RetemplateConfig::default();
        let runner = FakeRunner::new();
        let orchestrator = TemplateRenameOrchestrator::new(dir.path(), &config, &runner, &AssumeNo);

        let summary = orchestrator
            .run(&RenameRequest::new("YourLibrary", "My.Library"))
            .unwrap();

        assert!(summary.success);
        assert_eq!(summary.directories_renamed, 1);
        assert_eq!(summary.files_renamed, 2);
        assert!(dir.path().join("src/My.Library/My.Library.csproj").exists());
        assert!(dir.path().join("My.Library.sln").exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("My.Library.sln")).unwrap(),
            "Project(\"{FAE}\") = \"My.Library\", \"src\\My.Library\\My.Library.csproj\"\n"
        );
        assert_eq!(
            runner.calls(),
            vec![
                "dotnet build",
                "dotnet test --no-build",
                "git init",
                "git add -A",
                "git commit -m \"Initial commit from template\""
            ]
        );

        let steps: Vec<Step> = summary.steps.iter().map(|s| s.step).collect();
        assert_eq!(steps.first(), Some(&Step::Validate));
        assert_eq!(steps.last(), Some(&Step::VcsInit));
        assert_eq!(steps.len(), 12);
    }

    #[test]
    fn invalid_name_fails_before_touching_the_tree() {
        let dir = template();
        let config = RetemplateConfig::default();
        let runner = FakeRunner::new();
        let orchestrator = TemplateRenameOrchestrator::new(dir.path(), &config, &runner, &AssumeNo);

        let err = orchestrator.run(&request("123Bad")).unwrap_err();

        assert_eq!(err.code.as_str(), "validation.invalid_argument");
        assert!(dir.path().join("src/YourLibrary/Class1.cs").exists());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn same_name_as_placeholder_is_rejected() {
        let dir = template();
        let config = RetemplateConfig::default();
        let runner = FakeRunner::new();
        let orchestrator = TemplateRenameOrchestrator::new(dir.path(), &config, &runner, &AssumeNo);

        let err = orchestrator.run(&request("YourLibrary")).unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
        assert_eq!(err.details["summary"]["steps"][0]["step"], "validate");
        assert_eq!(err.details["summary"]["steps"][0]["status"], "failed");
    }

    #[test]
    fn declined_precondition_is_recorded_as_failed_step() {
        let dir = TempDir::new().unwrap();
        let config = RetemplateConfig::default();
        let runner = FakeRunner::new();
        let orchestrator = TemplateRenameOrchestrator::new(dir.path(), &config, &runner, &AssumeNo);

        let err = orchestrator.run(&request("Acme")).unwrap_err();

        assert_eq!(err.code.as_str(), "template.precondition_declined");
        let steps = err.details["summary"]["steps"].as_array().unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0]["status"], "succeeded");
        assert_eq!(steps[1]["step"], "check_preconditions");
        assert_eq!(steps[1]["status"], "failed");
    }

    #[test]
    fn second_run_requires_confirmation() {
        let dir = template();
        let config = RetemplateConfig::default();
        let runner = FakeRunner::new();
        let mut first = request("My.Library");
        first.skip_build = true;
        TemplateRenameOrchestrator::new(dir.path(), &config, &runner, &AssumeNo)
            .run(&first)
            .unwrap();

        let err = TemplateRenameOrchestrator::new(dir.path(), &config, &runner, &AssumeNo)
            .run(&first)
            .unwrap_err();
        assert_eq!(err.code.as_str(), "template.precondition_declined");

        let summary = TemplateRenameOrchestrator::new(dir.path(), &config, &runner, &AssumeYes)
            .run(&first)
            .unwrap();
        assert_eq!(summary.steps[1].status, StepStatus::Succeeded);
        assert!(summary.steps[1].message.as_deref().unwrap().contains("confirmed"));
    }

    #[test]
    fn dry_run_reports_plan_without_mutation() {
        let dir = template();
        let config = RetemplateConfig::default();
        let runner = FakeRunner::new();
        let mut req = request("Acme");
        req.dry_run = true;

        let summary = TemplateRenameOrchestrator::new(dir.path(), &config, &runner, &AssumeNo)
            .run(&req)
            .unwrap();

        let plan = summary.plan.unwrap();
        assert_eq!(plan.directories.len(), 1);
        assert_eq!(plan.rename_count(), 3);
        assert!(dir.path().join("src/YourLibrary/YourLibrary.csproj").exists());
        assert!(runner.calls().is_empty());
        assert!(summary
            .steps
            .iter()
            .skip(2)
            .all(|s| s.status == StepStatus::Skipped));
    }

    #[test]
    fn build_failure_keeps_applied_renames_and_reports_summary() {
        let dir = template();
        let config = RetemplateConfig::default();
        let runner = FakeRunner::new().respond("dotnet build", 1, "error CS0246");
        let orchestrator = TemplateRenameOrchestrator::new(dir.path(), &config, &runner, &AssumeNo);

        let err = orchestrator.run(&request("Acme")).unwrap_err();

        assert_eq!(err.code.as_str(), "template.build_failed");
        assert!(dir.path().join("src/Acme/Acme.csproj").exists());
        assert_eq!(err.details["summary"]["success"], false);
        assert_eq!(err.details["summary"]["directories_renamed"], 1);
        assert!(!runner.calls().iter().any(|c| c.starts_with("dotnet test")));
    }

    #[test]
    fn unavailable_toolchain_fails_the_build_step() {
        let dir = template();
        let config = RetemplateConfig::default();
        let runner = FakeRunner::new().missing("dotnet");
        let orchestrator = TemplateRenameOrchestrator::new(dir.path(), &config, &runner, &AssumeNo);

        let err = orchestrator.run(&request("Acme")).unwrap_err();

        assert_eq!(err.code.as_str(), "template.build_failed");
        assert_eq!(err.details["exitCode"], -1);
        assert!(!err.hints.is_empty());
        let steps = err.details["summary"]["steps"].as_array().unwrap();
        let build = steps.iter().find(|s| s["step"] == "build").unwrap();
        assert_eq!(build["status"], "failed");
        assert!(!runner.calls().iter().any(|c| c.starts_with("git")));
    }

    #[test]
    fn existing_repository_skips_vcs_init() {
        let dir = template();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let config = RetemplateConfig::default();
        let runner = FakeRunner::new();
        let mut req = RenameRequest::new("YourLibrary", "Acme");
        req.skip_build = true;

        let summary = TemplateRenameOrchestrator::new(dir.path(), &config, &runner, &AssumeNo)
            .run(&req)
            .unwrap();

        let vcs = summary.steps.last().unwrap();
        assert_eq!(vcs.status, StepStatus::Skipped);
        assert!(runner.calls().is_empty());
    }
}
