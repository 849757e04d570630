use anyhow::{Context, Result, anyhow};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::{Child as TokioChild, Command};
use tracing::{info, warn};

/// Displayed state of the background-music toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicState {
  Stopped,
  Playing,
  Paused,
}

impl MusicState {
  pub fn label(self) -> &'static str {
    match self {
      MusicState::Stopped => "off",
      MusicState::Playing => "playing",
      MusicState::Paused => "paused",
    }
  }

  /// State reached after one toggle press.
  pub fn toggled(self) -> Self {
    match self {
      MusicState::Stopped | MusicState::Paused => MusicState::Playing,
      MusicState::Playing => MusicState::Paused,
    }
  }
}

/// mpv IPC command setting the `pause` property to an explicit value.
fn pause_command(pause: bool) -> String {
  format!("{{\"command\":[\"set_property\",\"pause\",{}]}}\n", pause)
}

/// Looping background track played by an mpv child process.
pub struct BackgroundMusic {
  track: Option<PathBuf>,
  volume: u8,
  state: MusicState,
  process: Option<TokioChild>,
  ipc_socket_path: Option<String>,
}

impl BackgroundMusic {
  pub fn new(track: Option<PathBuf>, volume: u8) -> Self {
    Self { track, volume, state: MusicState::Stopped, process: None, ipc_socket_path: None }
  }

  pub fn state(&self) -> MusicState {
    self.state
  }

  /// Advance the toggle: start, pause or resume. On error the state is unchanged.
  pub async fn toggle(&mut self) -> Result<MusicState> {
    match self.state {
      MusicState::Stopped => self.start()?,
      MusicState::Playing => self.set_paused(true).await?,
      MusicState::Paused => self.set_paused(false).await?,
    }
    self.state = self.state.toggled();
    info!(state = self.state.label(), "music: toggled");
    Ok(self.state)
  }

  /// Reset to `Stopped` if mpv exited on its own (e.g. unreadable file).
  pub fn check_status(&mut self) {
    let Some(child) = self.process.as_mut() else { return };
    match child.try_wait() {
      Ok(Some(status)) => {
        warn!(%status, "music: mpv exited");
        self.process = None;
        self.cleanup_socket();
        self.state = MusicState::Stopped;
      }
      Ok(None) => {}
      Err(e) => warn!(err = %e, "music: failed to poll mpv"),
    }
  }

  fn start(&mut self) -> Result<()> {
    let Some(track) = self.track.as_ref() else {
      return Err(anyhow!("No background track configured."));
    };

    let socket_path = std::env::temp_dir().join(format!("reel-mpv-{}.sock", std::process::id()));
    let socket_path_str = socket_path.to_str().context("Temp dir path is not valid UTF-8")?.to_string();
    // Remove stale socket if it exists from a previous crash.
    let _ = std::fs::remove_file(&socket_path);

    let mut cmd = Command::new("mpv");
    cmd.args([
      "--no-video".to_string(),
      "--no-terminal".to_string(),
      "--loop-file=inf".to_string(),
      format!("--volume={}", self.volume),
      format!("--input-ipc-server={}", socket_path_str),
    ]);
    cmd.arg(track);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::null());

    let child = cmd.spawn().map_err(|e| {
      if e.kind() == std::io::ErrorKind::NotFound {
        anyhow!("mpv not found. Install it with: brew install mpv (macOS) or apt install mpv (Linux)")
      } else {
        anyhow!(e).context("Failed to spawn mpv process")
      }
    })?;

    info!(track = %track.display(), volume = self.volume, "music: mpv started");
    self.process = Some(child);
    self.ipc_socket_path = Some(socket_path_str);
    Ok(())
  }

  async fn set_paused(&mut self, pause: bool) -> Result<()> {
    let Some(ref socket_path) = self.ipc_socket_path else {
      return Err(anyhow!("mpv IPC socket is not available"));
    };
    let stream = tokio::net::UnixStream::connect(socket_path).await.context("Failed to connect to mpv IPC socket")?;
    stream.writable().await.context("mpv IPC socket not writable")?;
    let cmd = pause_command(pause);
    let written = stream.try_write(cmd.as_bytes()).context("Failed to send pause command to mpv")?;
    if written < cmd.len() {
      return Err(anyhow!("Partial write to mpv IPC socket: wrote {} of {} bytes", written, cmd.len()));
    }
    Ok(())
  }

  fn cleanup_socket(&mut self) {
    if let Some(path) = self.ipc_socket_path.take() {
      let _ = std::fs::remove_file(&path);
    }
  }

  pub async fn stop(&mut self) -> Result<()> {
    if let Some(mut child) = self.process.take() {
      child.kill().await.context("Failed to kill mpv process")?;
      let _ = child.wait().await;
    }
    self.cleanup_socket();
    self.state = MusicState::Stopped;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn toggle_cycle() {
    assert_eq!(MusicState::Stopped.toggled(), MusicState::Playing);
    assert_eq!(MusicState::Playing.toggled(), MusicState::Paused);
    assert_eq!(MusicState::Paused.toggled(), MusicState::Playing);
  }

  #[test]
  fn pause_command_sets_explicit_value() {
    assert_eq!(pause_command(true), "{\"command\":[\"set_property\",\"pause\",true]}\n");
    assert_eq!(pause_command(false), "{\"command\":[\"set_property\",\"pause\",false]}\n");
  }

  #[tokio::test]
  async fn toggle_without_track_errors_and_stays_stopped() {
    let mut music = BackgroundMusic::new(None, 50);
    let err = music.toggle().await.unwrap_err();
    assert_eq!(err.to_string(), "No background track configured.");
    assert_eq!(music.state(), MusicState::Stopped);
  }

  #[tokio::test]
  async fn stop_when_idle_is_ok() {
    let mut music = BackgroundMusic::new(Some(PathBuf::from("/nonexistent.mp3")), 50);
    music.stop().await.unwrap();
    assert_eq!(music.state(), MusicState::Stopped);
    music.check_status();
    assert_eq!(music.state(), MusicState::Stopped);
  }
}
