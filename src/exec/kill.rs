//! Process killer: terminate all processes matching a name.
//!
//! Uses the platform tool (`killall` / `taskkill`) so that processes are found
//! whether or not this supervisor started them. Whether any process actually
//! matched is not checked; only failing to run the tool is an error.

use super::{Cmd, KillError};

/// Send a terminate request to every process named `name`.
///
/// `name` must be the base name of the executable, never a full path.
pub async fn kill_by_name(name: &str) -> Result<(), KillError> {
    crate::debug!("spawning kill command: {}", name);

    let exit = kill_command(name)
        .run_quiet()
        .await
        .map_err(|e| KillError {
            name: name.to_owned(),
            source: e.source,
        })?;

    if !exit.success() {
        crate::debug!("kill `{}`: no matching process ({})", name, exit);
    }
    Ok(())
}

#[cfg(unix)]
fn kill_command(name: &str) -> Cmd {
    Cmd::new("killall").arg(name)
}

#[cfg(windows)]
fn kill_command(name: &str) -> Cmd {
    Cmd::new("taskkill").arg("/F").arg("/IM").arg(name)
}
