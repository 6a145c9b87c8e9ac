#![allow(dead_code)]

use color_eyre::eyre::{Result, eyre};
use healthcheck::{CommandOutput, CommandRunner, Invocation};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

pub const GOOD_SIGNATURE: &str = "gpg: Signature made Mon 01 Jan 2024 10:00:00 UTC\n\
gpg:                using RSA key ABCDEF0123456789\n\
gpg: Good signature from \"Dev <dev@example.com>\" [ultimate]\n\
3f2a1c0d9e8b7a6f5e4d3c2b1a0f9e8d7c6b5a49\n";

pub const BAD_SIGNATURE: &str = "gpg: Signature made Mon 01 Jan 2024 10:00:00 UTC\n\
gpg:                using RSA key ABCDEF0123456789\n\
gpg: BAD signature from \"Dev <dev@example.com>\" [ultimate]\n\
3f2a1c0d9e8b7a6f5e4d3c2b1a0f9e8d7c6b5a49\n";

pub const EXPIRED_SIGNATURE: &str = "gpg: Signature made Mon 01 Jan 2024 10:00:00 UTC\n\
gpg:                using RSA key ABCDEF0123456789\n\
gpg: Good signature from \"Dev <dev@example.com>\" [expired]\n\
gpg: Note: This key has expired!\n\
3f2a1c0d9e8b7a6f5e4d3c2b1a0f9e8d7c6b5a49\n";

pub const UNCLEAR_SIGNATURE: &str = "gpg: Signature made Mon 01 Jan 2024 10:00:00 UTC\n\
gpg:                using RSA key ABCDEF0123456789\n\
gpg: Can't check signature: No public key\n\
3f2a1c0d9e8b7a6f5e4d3c2b1a0f9e8d7c6b5a49\n";

pub const NO_SIGNATURE: &str = "3f2a1c0d9e8b7a6f5e4d3c2b1a0f9e8d7c6b5a49\n";

pub const LFS_ENV: &str = "git-lfs/3.4.0 (GitHub; linux amd64; go 1.21.1)\n\
git version 2.43.0\n\
\n\
Endpoint=https://github.com/acme/widgets.git/info/lfs (auth=none)\n\
LocalWorkingDir=/work/widgets\n\
git config filter.lfs.process = \"git-lfs filter-process\"\n\
git config filter.lfs.smudge = \"git-lfs smudge -- %f\"\n\
git config filter.lfs.clean = \"git-lfs clean -- %f\"\n";

/// Answers commands from a table keyed by command line and records every call.
pub struct ScriptedRunner {
    responses: HashMap<String, CommandOutput>,
    programs: HashSet<String>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            programs: HashSet::from(["git".to_string()]),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn ok(mut self, command_line: &str, stdout: &str) -> Self {
        self.responses
            .insert(command_line.to_string(), CommandOutput::success(stdout));
        self
    }

    pub fn fail(mut self, command_line: &str, code: i32, stderr: &str) -> Self {
        self.responses
            .insert(command_line.to_string(), CommandOutput::failure(code, stderr));
        self
    }

    pub fn with_program(mut self, name: &str) -> Self {
        self.programs.insert(name.to_string());
        self
    }

    pub fn without_program(mut self, name: &str) -> Self {
        self.programs.remove(name);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn was_called(&self, command_line: &str) -> bool {
        self.calls.borrow().iter().any(|c| c == command_line)
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        let line = invocation.command_line();
        self.calls.borrow_mut().push(line.clone());

        if !self.programs.contains(&invocation.program) {
            return Err(eyre!("could not start `{line}`: program not found"));
        }

        Ok(self
            .responses
            .get(&line)
            .cloned()
            .unwrap_or_else(|| CommandOutput::failure(1, &format!("unscripted command: {line}"))))
    }

    fn find_program(&self, name: &str) -> Option<PathBuf> {
        self.programs
            .contains(name)
            .then(|| PathBuf::from(format!("/usr/bin/{name}")))
    }
}

/// A repository on `main`, in sync with `origin/main`, with a reachable SSH
/// `origin`, an HTTPS `backup` rejecting credentials, LFS set up, a good
/// signature on HEAD and a small staged diff.
pub fn healthy_repo() -> ScriptedRunner {
    ScriptedRunner::new()
        .with_program("git-lfs")
        .with_program("ssh")
        .ok("git --version", "git version 2.43.0\n")
        .ok("git symbolic-ref --short -q HEAD", "main\n")
        .ok(
            "git rev-parse --abbrev-ref --symbolic-full-name @{u}",
            "origin/main\n",
        )
        .ok("git config --get branch.main.remote", "origin\n")
        .ok("git fetch origin", "")
        .ok("git rev-list --left-right --count origin/main...HEAD", "0\t0\n")
        .ok("git status --short --branch", "## main...origin/main\n")
        .ok("git remote", "origin\nbackup\n")
        .ok("git remote get-url origin", "git@github.com:acme/widgets.git\n")
        .ok(
            "git ls-remote --heads origin",
            "3f2a1c0d9e8b7a6f5e4d3c2b1a0f9e8d7c6b5a49\trefs/heads/main\n",
        )
        .ok(
            "git remote get-url backup",
            "https://git.example.com/acme/widgets.git\n",
        )
        .fail(
            "git ls-remote --heads backup",
            128,
            concat!(
                "remote: Invalid username or password.\n",
                "fatal: Authentication failed for 'https://git.example.com/acme/widgets.git/'\n",
            ),
        )
        .ok("git lfs env", LFS_ENV)
        .ok("git lfs ls-files", "1a2b3c4d5e * assets/model.bin\n")
        .ok(
            "git rev-parse --verify -q HEAD",
            "3f2a1c0d9e8b7a6f5e4d3c2b1a0f9e8d7c6b5a49\n",
        )
        .ok("git log -1 --show-signature --format=%H", GOOD_SIGNATURE)
        .ok("git diff --cached --numstat", "10\t2\tsrc/lib.rs\n")
}

pub fn messages(outcome: &healthcheck::Outcome, stage: healthcheck::Stage) -> Vec<String> {
    outcome
        .reports
        .iter()
        .filter(|r| r.stage == stage)
        .flat_map(|r| r.findings.iter().map(|f| f.message.clone()))
        .collect()
}
