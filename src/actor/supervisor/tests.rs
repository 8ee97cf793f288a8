use std::io;
use std::path::PathBuf;

use super::machine::{Action, Lifecycle, Notice, Phase};
use crate::actor::messages::{CycleId, RestartReason, ShutdownReason, SupervisorMsg};
use crate::exec::{CompileOutcome, KillError, ProcessExit, SpawnError};

fn kill_ok(cycle: CycleId) -> SupervisorMsg {
    SupervisorMsg::KillDone {
        cycle,
        result: Ok(()),
    }
}

fn kill_err(cycle: CycleId) -> SupervisorMsg {
    SupervisorMsg::KillDone {
        cycle,
        result: Err(KillError {
            name: "srv".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "killall not found"),
        }),
    }
}

fn compiled(cycle: CycleId, code: i32) -> SupervisorMsg {
    SupervisorMsg::CompileDone {
        cycle,
        outcome: CompileOutcome::Finished(ProcessExit::with_code(code)),
    }
}

fn compile_spawn_failed(cycle: CycleId) -> SupervisorMsg {
    SupervisorMsg::CompileDone {
        cycle,
        outcome: CompileOutcome::SpawnFailed(spawn_error("make")),
    }
}

fn spawn_error(program: &str) -> SpawnError {
    SpawnError {
        program: program.into(),
        source: io::Error::new(io::ErrorKind::NotFound, "not found"),
    }
}

fn exited(code: i32) -> SupervisorMsg {
    SupervisorMsg::ServerExited {
        exit: ProcessExit::with_code(code),
    }
}

fn restart() -> SupervisorMsg {
    SupervisorMsg::Restart(RestartReason::Console)
}

fn file_changed() -> SupervisorMsg {
    SupervisorMsg::Restart(RestartReason::FileChanged(PathBuf::from("/project/main.c")))
}

fn has_notice(actions: &[Action], notice: &Notice) -> bool {
    actions
        .iter()
        .any(|a| matches!(a, Action::Notify(n) if n == notice))
}

fn has_crash_warning(actions: &[Action]) -> bool {
    actions
        .iter()
        .any(|a| matches!(a, Action::Notify(Notice::ServerCrashed(_))))
}

fn spawns(actions: &[Action]) -> bool {
    actions.iter().any(|a| matches!(a, Action::Spawn(_)))
}

/// Drive a lifecycle through startup until the server runs.
fn running(has_compile_step: bool) -> Lifecycle {
    let mut lc = Lifecycle::new(has_compile_step);
    lc.start();
    lc.handle(kill_ok(1));
    if has_compile_step {
        lc.handle(compiled(1, 0));
    }
    lc.handle(SupervisorMsg::ServerStarted { cycle: 1 });
    assert_eq!(lc.phase(), Phase::Running);
    lc
}

// ----------------------------------------------------------------------------
// Startup and ordering
// ----------------------------------------------------------------------------

#[test]
fn test_start_issues_kill_with_flag_set() {
    let mut lc = Lifecycle::new(true);
    let actions = lc.start();

    assert_eq!(
        actions,
        vec![Action::Notify(Notice::Starting), Action::Kill(1)]
    );
    assert_eq!(lc.phase(), Phase::Killing);
    assert!(lc.kill_signal_sent());
}

#[test]
fn test_kill_then_compile_then_run() {
    let mut lc = Lifecycle::new(true);
    lc.start();

    assert_eq!(lc.handle(kill_ok(1)), vec![Action::Compile(1)]);
    assert_eq!(lc.phase(), Phase::Compiling);

    assert_eq!(lc.handle(compiled(1, 0)), vec![Action::Spawn(1)]);
    assert_eq!(lc.phase(), Phase::Running);
}

#[test]
fn test_no_compile_step_goes_straight_to_run() {
    let mut lc = Lifecycle::new(false);
    lc.start();

    let actions = lc.handle(kill_ok(1));
    assert_eq!(actions, vec![Action::Spawn(1)]);
    assert_eq!(lc.phase(), Phase::Running);
    assert!(!actions.iter().any(|a| matches!(a, Action::Compile(_))));
}

#[test]
fn test_every_trigger_without_compile_step_runs_directly() {
    let mut lc = running(false);
    for n in 2..5 {
        let actions = lc.handle(file_changed());
        assert!(actions.contains(&Action::Kill(n)));
        assert_eq!(lc.handle(kill_ok(n)), vec![Action::Spawn(n)]);
        lc.handle(SupervisorMsg::ServerStarted { cycle: n });
    }
}

// ----------------------------------------------------------------------------
// Compile failures
// ----------------------------------------------------------------------------

#[test]
fn test_failed_compile_never_spawns() {
    let mut lc = Lifecycle::new(true);
    lc.start();
    lc.handle(kill_ok(1));

    let actions = lc.handle(compiled(1, 1));
    assert!(!spawns(&actions));
    assert!(has_notice(&actions, &Notice::CompileFailed));
    assert_eq!(lc.phase(), Phase::Idle);
}

#[test]
fn test_failed_compile_waits_for_next_trigger() {
    let mut lc = running(true);
    lc.handle(file_changed());
    lc.handle(kill_ok(2));
    lc.handle(compiled(2, 2));
    assert_eq!(lc.phase(), Phase::Idle);

    let actions = lc.handle(file_changed());
    assert!(actions.contains(&Action::Kill(3)));
    lc.handle(kill_ok(3));
    assert_eq!(lc.handle(compiled(3, 0)), vec![Action::Spawn(3)]);
}

#[test]
fn test_compiler_spawn_error_after_startup_is_failed_compile() {
    let mut lc = running(true);
    lc.handle(restart());
    lc.handle(kill_ok(2));

    let actions = lc.handle(compile_spawn_failed(2));
    assert!(has_notice(&actions, &Notice::CompileFailed));
    assert!(!actions.contains(&Action::FinalKill));
    assert_eq!(lc.phase(), Phase::Idle);
}

// ----------------------------------------------------------------------------
// Fatal startup errors
// ----------------------------------------------------------------------------

#[test]
fn test_startup_kill_error_is_fatal() {
    let mut lc = Lifecycle::new(true);
    lc.start();

    let actions = lc.handle(kill_err(1));
    assert!(actions.contains(&Action::FinalKill));
    assert!(!actions.iter().any(|a| matches!(a, Action::Compile(_))));
    assert_eq!(lc.phase(), Phase::Exiting);

    let actions = lc.handle(SupervisorMsg::FinalKillDone { result: Ok(()) });
    assert_eq!(actions, vec![Action::Exit(1)]);
}

#[test]
fn test_startup_compile_spawn_error_is_fatal() {
    let mut lc = Lifecycle::new(true);
    lc.start();
    lc.handle(kill_ok(1));

    let actions = lc.handle(compile_spawn_failed(1));
    assert!(actions.contains(&Action::FinalKill));
    assert!(!spawns(&actions));

    let actions = lc.handle(SupervisorMsg::FinalKillDone { result: Ok(()) });
    assert_eq!(actions.last(), Some(&Action::Exit(1)));
}

#[test]
fn test_later_kill_error_continues_to_compile() {
    let mut lc = running(true);
    lc.handle(restart());

    let actions = lc.handle(kill_err(2));
    assert!(matches!(actions[0], Action::Notify(Notice::KillFailed(_))));
    assert_eq!(actions[1], Action::Compile(2));
    assert_eq!(lc.phase(), Phase::Compiling);
}

#[test]
fn test_server_spawn_error_returns_to_idle() {
    let mut lc = Lifecycle::new(false);
    lc.start();
    lc.handle(kill_ok(1));

    let actions = lc.handle(SupervisorMsg::ServerSpawnFailed {
        cycle: 1,
        error: spawn_error("./srv"),
    });
    assert!(matches!(actions[..], [Action::Notify(Notice::SpawnFailed(_))]));
    assert_eq!(lc.phase(), Phase::Idle);
}

// ----------------------------------------------------------------------------
// Self-kill flag and crash warnings
// ----------------------------------------------------------------------------

#[test]
fn test_unprompted_crash_warns() {
    let mut lc = running(true);
    assert!(!lc.kill_signal_sent());

    let actions = lc.handle(exited(1));
    assert!(has_crash_warning(&actions));
    assert!(!lc.kill_signal_sent());
    assert_eq!(lc.phase(), Phase::Idle);
}

#[test]
fn test_signal_exit_without_kill_warns() {
    let mut lc = running(false);
    let actions = lc.handle(SupervisorMsg::ServerExited {
        exit: ProcessExit::signaled(),
    });
    assert!(has_crash_warning(&actions));
}

#[test]
fn test_killed_server_does_not_warn_and_flag_clears() {
    let mut lc = running(true);
    lc.handle(file_changed());
    assert!(lc.kill_signal_sent());

    let actions = lc.handle(SupervisorMsg::ServerExited {
        exit: ProcessExit::signaled(),
    });
    assert!(!has_crash_warning(&actions));
    assert!(!lc.kill_signal_sent());
    // still waiting for the kill step
    assert_eq!(lc.phase(), Phase::Killing);
}

#[test]
fn test_flag_read_only_once() {
    let mut lc = running(true);
    lc.handle(file_changed());

    assert!(!has_crash_warning(&lc.handle(exited(1))));
    // a second non-zero exit is no longer covered by the kill
    assert!(has_crash_warning(&lc.handle(exited(1))));
}

#[test]
fn test_clean_unprompted_exit_no_warning() {
    // server: ./srv, compilation: make; make exits 0, srv later exits 0
    let mut lc = running(true);
    let actions = lc.handle(exited(0));
    assert!(actions.is_empty());
    assert_eq!(lc.phase(), Phase::Idle);
}

#[test]
fn test_flag_cleared_when_new_server_starts_with_none_alive() {
    // startup kill matched nothing, so no exit ever consumes the flag
    let mut lc = Lifecycle::new(false);
    lc.start();
    assert!(lc.kill_signal_sent());
    lc.handle(kill_ok(1));
    lc.handle(SupervisorMsg::ServerStarted { cycle: 1 });
    assert!(!lc.kill_signal_sent());

    assert!(has_crash_warning(&lc.handle(exited(2))));
}

#[test]
fn test_flag_kept_while_old_server_still_alive() {
    let mut lc = running(false);
    lc.handle(restart());
    lc.handle(kill_ok(2));
    // old server has not reported its exit yet
    lc.handle(SupervisorMsg::ServerStarted { cycle: 2 });
    assert!(lc.kill_signal_sent());

    assert!(!has_crash_warning(&lc.handle(exited(143))));
    assert!(!lc.kill_signal_sent());
    assert_eq!(lc.phase(), Phase::Running);
}

// ----------------------------------------------------------------------------
// Overlapping triggers
// ----------------------------------------------------------------------------

#[test]
fn test_restart_during_kill_reruns_once_after_kill() {
    let mut lc = Lifecycle::new(true);
    lc.start();

    assert!(lc.handle(restart()).is_empty());
    assert!(lc.handle(file_changed()).is_empty());
    assert!(lc.rerun_pending());

    let actions = lc.handle(kill_ok(1));
    assert_eq!(
        actions,
        vec![Action::Notify(Notice::Restarting), Action::Kill(2)]
    );
    assert_eq!(lc.phase(), Phase::Killing);
    assert!(!lc.rerun_pending());

    // exactly one re-run: the next kill proceeds to compile
    assert_eq!(lc.handle(kill_ok(2)), vec![Action::Compile(2)]);
}

#[test]
fn test_restart_during_compile_kills_immediately() {
    let mut lc = Lifecycle::new(true);
    lc.start();
    lc.handle(kill_ok(1));
    assert_eq!(lc.phase(), Phase::Compiling);

    let actions = lc.handle(file_changed());
    assert!(actions.contains(&Action::Kill(2)));
    assert_eq!(lc.phase(), Phase::Killing);

    // the superseded compile result is discarded
    assert!(lc.handle(compiled(1, 0)).is_empty());
    assert_eq!(lc.phase(), Phase::Killing);
}

#[test]
fn test_restart_while_idle_after_failed_compile() {
    let mut lc = Lifecycle::new(true);
    lc.start();
    lc.handle(kill_ok(1));
    lc.handle(compiled(1, 1));

    let actions = lc.handle(restart());
    assert_eq!(
        actions,
        vec![Action::Notify(Notice::Restarting), Action::Kill(2)]
    );
}

#[test]
fn test_stale_kill_result_ignored() {
    let mut lc = running(true);
    lc.handle(restart());
    assert!(lc.handle(kill_ok(1)).is_empty());
    assert_eq!(lc.phase(), Phase::Killing);
}

// ----------------------------------------------------------------------------
// Shutdown
// ----------------------------------------------------------------------------

#[test]
fn test_quit_kills_then_exits_zero() {
    let mut lc = running(true);

    let actions = lc.handle(SupervisorMsg::Shutdown(ShutdownReason::Console));
    assert_eq!(
        actions,
        vec![Action::Notify(Notice::Exiting), Action::FinalKill]
    );
    assert_eq!(lc.phase(), Phase::Exiting);

    // the server dying from the final kill is not a crash
    assert!(lc.handle(exited(1)).is_empty());

    let actions = lc.handle(SupervisorMsg::FinalKillDone { result: Ok(()) });
    assert_eq!(actions, vec![Action::Exit(0)]);
}

#[test]
fn test_interrupt_from_any_phase() {
    let mut lc = Lifecycle::new(true);
    lc.start();
    lc.handle(kill_ok(1));
    assert_eq!(lc.phase(), Phase::Compiling);

    let actions = lc.handle(SupervisorMsg::Shutdown(ShutdownReason::Interrupt));
    assert!(actions.contains(&Action::FinalKill));

    // triggers and late results are ignored while exiting
    assert!(lc.handle(restart()).is_empty());
    assert!(lc.handle(compiled(1, 0)).is_empty());
    assert!(
        lc.handle(SupervisorMsg::Shutdown(ShutdownReason::Console))
            .is_empty()
    );

    let actions = lc.handle(SupervisorMsg::FinalKillDone { result: Ok(()) });
    assert_eq!(actions, vec![Action::Exit(0)]);
}

#[test]
fn test_final_kill_error_still_exits() {
    let mut lc = running(false);
    lc.handle(SupervisorMsg::Shutdown(ShutdownReason::Console));

    let actions = lc.handle(SupervisorMsg::FinalKillDone {
        result: Err(KillError {
            name: "srv".into(),
            source: io::Error::other("boom"),
        }),
    });
    assert!(matches!(actions[0], Action::Notify(Notice::KillFailed(_))));
    assert_eq!(actions[1], Action::Exit(0));
}

// ----------------------------------------------------------------------------
// Notices
// ----------------------------------------------------------------------------

#[test]
fn test_notice_text() {
    assert_eq!(
        Notice::CompileFailed.to_string(),
        "compilation errors, waiting for file changes before restarting"
    );
    assert_eq!(
        Notice::ServerCrashed(ProcessExit::with_code(1)).to_string(),
        "server exiting with errors, type 'rs' to restart"
    );
    assert!(Notice::CompileFailed.is_error());
    assert!(!Notice::Restarting.is_error());
}

// ----------------------------------------------------------------------------
// Executor (real processes)
// ----------------------------------------------------------------------------

#[cfg(unix)]
mod executor {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::time::Duration;

    use tempfile::TempDir;
    use tokio::sync::mpsc;

    use super::super::SupervisorActor;
    use crate::actor::messages::{RestartReason, ShutdownReason, SupervisorMsg};
    use crate::config::{
        CompileStep, DEFAULT_WATCH_PATTERN, PatternSet, ServerIdentity, WatcherConfig,
    };
    use crate::exec::Cmd;

    const WAIT_LIMIT: Duration = Duration::from_secs(10);

    /// The actor needs the kill tool for every cycle.
    async fn kill_tool_available() -> bool {
        Cmd::new("killall").run_quiet().await.is_ok()
    }

    /// Executable script that creates `marker` and exits 0.
    fn server_script(dir: &Path, name: &str, marker: &Path) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\ntouch '{}'\n", marker.display())).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Compile command that creates `marker`, then exits with `code`.
    fn compile_command(dir: &Path, marker: &Path, code: i32) -> String {
        let script = dir.join("compile.sh");
        fs::write(&script, format!("touch '{}'\nexit {code}\n", marker.display())).unwrap();
        format!("sh {}", script.display())
    }

    fn config(dir: &Path, server: PathBuf, compile: &str) -> Arc<WatcherConfig> {
        Arc::new(WatcherConfig {
            root: dir.to_path_buf(),
            identity: ServerIdentity::from_path(&server).unwrap(),
            server,
            compile: CompileStep::parse(Some(compile)),
            patterns: PatternSet::new(dir, &[DEFAULT_WATCH_PATTERN]).unwrap(),
            ignore: PatternSet::new::<&str>(dir, &[]).unwrap(),
            ignore_directories: false,
            verbose: false,
        })
    }

    async fn wait_for(path: &Path) -> bool {
        let deadline = tokio::time::Instant::now() + WAIT_LIMIT;
        while tokio::time::Instant::now() < deadline {
            if path.exists() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }

    /// Start the actor, returning its mailbox and join handle.
    fn start(
        config: Arc<WatcherConfig>,
    ) -> (mpsc::Sender<SupervisorMsg>, tokio::task::JoinHandle<i32>) {
        let (tx, rx) = mpsc::channel(32);
        let actor = SupervisorActor::new(rx, tx.clone(), config);
        (tx, tokio::spawn(actor.run()))
    }

    async fn quit(tx: mpsc::Sender<SupervisorMsg>, handle: tokio::task::JoinHandle<i32>) -> i32 {
        tx.send(SupervisorMsg::Shutdown(ShutdownReason::Console))
            .await
            .unwrap();
        tokio::time::timeout(WAIT_LIMIT, handle)
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_failed_compile_never_starts_server() {
        if !kill_tool_available().await {
            return;
        }
        let dir = TempDir::new().unwrap();
        let started = dir.path().join("started");
        let compiled = dir.path().join("compiled");
        let server = server_script(dir.path(), "sw-test-fail", &started);
        let compile = compile_command(dir.path(), &compiled, 1);

        let (tx, handle) = start(config(dir.path(), server, &compile));
        assert!(wait_for(&compiled).await);
        // let the CompileDone result reach the supervisor
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(quit(tx, handle).await, 0);
        assert!(!started.exists());
    }

    #[tokio::test]
    async fn test_successful_compile_starts_server() {
        if !kill_tool_available().await {
            return;
        }
        let dir = TempDir::new().unwrap();
        let started = dir.path().join("started");
        let compiled = dir.path().join("compiled");
        let server = server_script(dir.path(), "sw-test-ok", &started);
        let compile = compile_command(dir.path(), &compiled, 0);

        let (tx, handle) = start(config(dir.path(), server, &compile));
        assert!(wait_for(&started).await);
        assert!(compiled.exists());

        assert_eq!(quit(tx, handle).await, 0);
    }

    #[tokio::test]
    async fn test_no_compile_step_starts_server() {
        if !kill_tool_available().await {
            return;
        }
        let dir = TempDir::new().unwrap();
        let started = dir.path().join("started");
        let server = server_script(dir.path(), "sw-test-direct", &started);

        let (tx, handle) = start(config(dir.path(), server, ""));
        assert!(wait_for(&started).await);

        assert_eq!(quit(tx, handle).await, 0);
    }

    #[tokio::test]
    async fn test_console_restart_runs_another_cycle() {
        if !kill_tool_available().await {
            return;
        }
        let dir = TempDir::new().unwrap();
        let started = dir.path().join("started");
        let server = server_script(dir.path(), "sw-test-again", &started);

        let (tx, handle) = start(config(dir.path(), server, ""));
        assert!(wait_for(&started).await);
        fs::remove_file(&started).unwrap();

        tx.send(SupervisorMsg::Restart(RestartReason::Console))
            .await
            .unwrap();
        assert!(wait_for(&started).await);

        assert_eq!(quit(tx, handle).await, 0);
    }
}
