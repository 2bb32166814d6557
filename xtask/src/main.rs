// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::process::Command as StdCommand;
use std::process::ExitCode;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "x", about = "Development tasks for the workspace")]
struct Command {
    #[command(subcommand)]
    sub: SubCommand,
}

#[derive(Subcommand)]
enum SubCommand {
    /// Run rustfmt and clippy over the workspace.
    Lint {
        /// Apply formatting and clippy fixes instead of only checking.
        #[arg(long)]
        fix: bool,
    },
    /// Run the unit, integration and doc tests.
    Test {
        /// Also run with every optional feature enabled.
        #[arg(long)]
        all_features: bool,
    },
}

fn main() -> ExitCode {
    let cmd = Command::parse();
    let result = match cmd.sub {
        SubCommand::Lint { fix } => run_lint(fix),
        SubCommand::Test { all_features } => run_test(all_features),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::FAILURE
        }
    }
}

fn run_lint(fix: bool) -> Result<(), String> {
    if fix {
        run(cargo().args(["fmt", "--all"]))?;
        run(cargo().args([
            "clippy",
            "--workspace",
            "--all-targets",
            "--all-features",
            "--fix",
            "--allow-dirty",
            "--allow-staged",
        ]))
    } else {
        run(cargo().args(["fmt", "--all", "--check"]))?;
        run(cargo().args([
            "clippy",
            "--workspace",
            "--all-targets",
            "--all-features",
            "--",
            "-D",
            "warnings",
        ]))
    }
}

fn run_test(all_features: bool) -> Result<(), String> {
    run(cargo().args(["test", "--workspace"]))?;
    if all_features {
        run(cargo().args(["test", "--workspace", "--all-features"]))?;
    }
    Ok(())
}

fn cargo() -> StdCommand {
    let program = which::which("cargo").unwrap_or_else(|_| "cargo".into());
    StdCommand::new(program)
}

fn run(cmd: &mut StdCommand) -> Result<(), String> {
    let display = format!("{cmd:?}");
    let status = cmd
        .status()
        .map_err(|err| format!("failed to spawn {display}: {err}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("{display} exited with {status}"))
    }
}
