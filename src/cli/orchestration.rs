//! Main workflow orchestration logic
//!
//! Keeps the release flow apart from CLI argument parsing, so it can be
//! driven programmatically with any [`Repository`] and [`Registry`].

use std::path::{Path, PathBuf};
use std::thread;

use tracing::{info, instrument};

use crate::analyzer::{determine_bump, plan_release, ReleasePlan, ResolutionInput, VersionResolver};
use crate::boundary::BoundaryWarning;
use crate::changelog::{prepend_to_file, ChangelogRenderer};
use crate::config::Config;
use crate::domain::{
    BumpLevel, Commit, CommitClassifier, PackageInfo, PackageVersionState, PreReleaseType,
    PreviousTag, ReleaseType, TagPattern,
};
use crate::error::{enumerate, ReleaseError, Result};
use crate::git::{Repository, WorkingTreeChanges};
use crate::manifest::{load_package, write_version};
use crate::registry::{Registry, RegistryInfo};
use crate::ui;
use crate::workspace::{locate_package, PACKAGE_FILE};

/// Arguments for the release workflow
///
/// Mirrors the CLI Args but in a format suitable for orchestration logic.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseWorkflowArgs {
    /// Explicit release type, already checked for conflicting flags
    pub release_type: Option<ReleaseType>,

    /// Requested prerelease suffix (`--pre beta`)
    pub prerelease: Option<String>,

    /// Preview mode - print the changelog entry, touch nothing
    pub preview: bool,

    pub changelog: bool,
    pub commit: bool,
    pub tag: bool,

    /// When false, nothing is staged, committed or tagged
    pub git: bool,

    /// Skip the active branch check
    pub debug: bool,
}

impl Default for ReleaseWorkflowArgs {
    fn default() -> Self {
        ReleaseWorkflowArgs {
            release_type: None,
            prerelease: None,
            preview: false,
            changelog: true,
            commit: true,
            tag: true,
            git: true,
            debug: false,
        }
    }
}

/// Result of a release workflow that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowResult {
    /// Nothing to release
    Skipped(BoundaryWarning),

    /// Dry run: the entry that would have been written
    Preview {
        next_version: String,
        changelog_entry: String,
    },

    Released {
        next_version: String,
        /// Files written on disk
        files: Vec<PathBuf>,
        /// Tag created, if any
        tag: Option<String>,
    },
}

/// Facts gathered from the repository for one package.
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryInfo {
    pub active_branch: Option<String>,
    pub changes: WorkingTreeChanges,
    pub previous_tag: Option<PreviousTag>,
    /// Commits of the package since the previous tag, newest first
    pub commits: Vec<Commit>,
    pub suggested_bump: BumpLevel,
}

/// Find the package to release from `cwd` and check that it can be released.
pub fn prepare_package(cwd: &Path, config: &Config) -> Result<PackageInfo> {
    let package_root = locate_package(cwd, &config.layout)?;
    ui::display_step(&format!(
        "Reading {}...",
        package_root.join(PACKAGE_FILE).display()
    ));
    let package = load_package(&package_root)?;
    check_package(&package, config)?;
    Ok(package)
}

/// Checks that do not need the repository or the registry.
pub fn check_package(package: &PackageInfo, config: &Config) -> Result<()> {
    if package.private {
        return Err(ReleaseError::package("Cannot publish a private package."));
    }

    let expected = format!("{}{}", config.layout.name_prefix, package.short_name);
    if package.name != expected {
        return Err(ReleaseError::package(format!(
            "Name mismatch in {}, expected {:?}, found {:?}.",
            PACKAGE_FILE, expected, package.name
        )));
    }

    PackageVersionState::parse(&package.version, PACKAGE_FILE)?;
    Ok(())
}

/// Read branch, working tree, previous tag and scoped commits.
#[instrument(skip_all, fields(package = %package.name))]
pub fn gather_repository_info<R: Repository>(
    repo: &R,
    package: &PackageInfo,
    config: &Config,
) -> Result<RepositoryInfo> {
    let active_branch = repo.current_branch()?;
    let changes =
        WorkingTreeChanges::classify(&repo.changed_files()?, &package.short_name, &config.layout);

    let pattern = TagPattern::new(config.git.tag_format.clone());
    let previous_tag = pattern.latest(&package.name, &repo.list_tags()?)?;

    let raw_commits = repo.commits_since(previous_tag.as_ref().map(|t| t.name.as_str()))?;
    let classifier = CommitClassifier::new(package.short_name.clone(), package.name.clone())
        .with_note_keywords(config.commits.note_keywords.clone());
    let commits = classifier.classify_all(&raw_commits);
    let suggested_bump = determine_bump(&commits);

    info!(
        "{} of {} commit(s) concern the package, suggested bump: {}",
        commits.len(),
        raw_commits.len(),
        suggested_bump
    );

    Ok(RepositoryInfo {
        active_branch,
        changes,
        previous_tag,
        commits,
        suggested_bump,
    })
}

/// Main release workflow
///
/// 1. Validate the requested prerelease suffix
/// 2. Query the registry and the repository concurrently
/// 3. Check branch and working tree
/// 4. Plan the release (validation, no-op detection, next version)
/// 5. Preview, or write changelog and versions, then commit and tag
///
/// # Arguments
///
/// * `args` - Workflow arguments
/// * `config` - Loaded configuration
/// * `package` - Package returned by [`prepare_package`]
/// * `repo` - Repository holding the package
/// * `registry` - Source of published versions
pub fn run_release_workflow<R, G>(
    args: &ReleaseWorkflowArgs,
    config: &Config,
    package: &PackageInfo,
    repo: &R,
    registry: &G,
) -> Result<WorkflowResult>
where
    R: Repository,
    G: Registry,
{
    let prerelease = args
        .prerelease
        .as_deref()
        .map(|suffix| PreReleaseType::parse_allowed(suffix, &config.prerelease.suffixes))
        .transpose()?;

    ui::display_status(&format!(
        "Releasing {} package from /{}/{} directory.",
        package.name, config.layout.plugins_directory, package.short_name
    ));
    if args.preview {
        ui::display_warning("*** DRY RUN MODE: no files will be modified.");
    }

    ui::display_step("Gathering infos from npm and git...");
    let (registry_info, repository_info) = thread::scope(|scope| {
        let registry_query = scope.spawn(|| registry.info(&package.name));
        let repository_info = gather_repository_info(repo, package, config);
        let registry_info = registry_query
            .join()
            .unwrap_or_else(|payload| std::panic::resume_unwind(payload));
        (registry_info, repository_info)
    });

    let registry_info: RegistryInfo = registry_info?;
    let repository_info = repository_info?;

    if repository_info.active_branch.as_deref() != Some(package.short_name.as_str()) && !args.debug {
        return Err(ReleaseError::package(format!(
            "Please re-run this command while on the {} branch.",
            package.short_name
        )));
    }

    if !repository_info.changes.dirty_packages.is_empty() {
        let dirty: Vec<String> = repository_info.changes.dirty_packages.iter().cloned().collect();
        return Err(ReleaseError::package(format!(
            "Cannot create a commit for a plugin while files from other plugins are modified or even staged. Please commit changes on {} before running this command again.",
            enumerate(&dirty, " and ")
        )));
    }

    let previous_tag = repository_info.previous_tag.as_ref();
    ui::display_step(&ui::format_release_state(
        PACKAGE_FILE,
        &package.version,
        registry_info.latest_version.as_deref(),
        previous_tag.map(|t| t.name.as_str()),
    ));

    if let Some(tag) = previous_tag.filter(|t| t.version.is_none()) {
        ui::display_boundary_warning(&BoundaryWarning::UnparsableTag {
            tag: tag.name.clone(),
        });
    }

    let input = ResolutionInput {
        current_version: package.version.clone(),
        bump: repository_info.suggested_bump,
        release_type: args.release_type,
        prerelease_id: prerelease.map(|p| p.to_string()),
        tag_version: previous_tag.and_then(|t| t.version.clone()),
        registry_version: registry_info.latest_version.clone(),
    };
    let resolver = VersionResolver::new(config.versioning.stable_override);

    let resolution = match plan_release(
        &resolver,
        &input,
        repository_info.commits.len(),
        previous_tag.map(|t| t.name.as_str()),
    )? {
        ReleasePlan::Skip(warning) => {
            ui::display_boundary_warning(&warning);
            return Ok(WorkflowResult::Skipped(warning));
        }
        ReleasePlan::Release(resolution) => resolution,
    };

    let next_version = resolution.next_version.to_string();
    ui::display_status(&format!("Next version is {:?}.", next_version));

    if args.preview {
        // links make the preview harder to read
        let changelog_entry = ChangelogRenderer::new(None)
            .with_profile_url(config.changelog.profile_url.clone())
            .render(&package.name, &next_version, &repository_info.commits);
        ui::display_changelog_preview(&changelog_entry);
        return Ok(WorkflowResult::Preview {
            next_version,
            changelog_entry,
        });
    }

    let mut files = Vec::new();
    if args.changelog {
        let changelog_path = package.package_root().join(&config.changelog.file);
        ui::display_step(&format!("Updating {}...", config.changelog.file));
        let entry = ChangelogRenderer::new(package.urls.clone())
            .with_profile_url(config.changelog.profile_url.clone())
            .render(&package.name, &next_version, &repository_info.commits);
        prepend_to_file(&changelog_path, &entry)?;
        files.push(changelog_path);
    }

    ui::display_step(&format!("Updating {} version...", PACKAGE_FILE));
    files.extend(write_version(package, &next_version)?);

    let mut tag = None;
    if args.git {
        ui::display_step("Staging changed files...");
        let mut paths = files.clone();
        paths.extend(repository_info.changes.to_commit.iter().map(PathBuf::from));
        paths.sort();
        paths.dedup();
        repo.stage_paths(&paths)?;

        if args.commit {
            ui::display_step("Committing changed files...");
            let message = config
                .git
                .commit_format
                .replace("{name}", &package.name)
                .replace("{version}", &next_version);
            repo.commit_staged(&message)?;

            if args.tag {
                let name = TagPattern::new(config.git.tag_format.clone())
                    .format(&package.name, &next_version);
                ui::display_step(&format!("Tagging {}...", name));
                repo.create_tag(&name)?;
                tag = Some(name);
            }
        }
    }

    ui::display_success(&format!(
        "All done. Use \"npm publish\" to publish {} v{} to the registry.",
        package.name, next_version
    ));
    ui::display_status(
        "You should also merge this branch into the main branch, then use \"git push --follow-tags\" to update the remote.",
    );

    Ok(WorkflowResult::Released {
        next_version,
        files,
        tag,
    })
}
