//! Interactive shell attachment.
//!
//! [`attach`] checks the pod, resolves the container and walks the shell
//! candidates until one starts. Raw mode is held by [`RawModeGuard`] around
//! each attempt so it is restored whatever the attempt returns.

use futures::channel::mpsc::Sender;
use futures::{Stream, StreamExt};
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Status;
use kube::api::{AttachParams, TerminalSize};
use kube::{Api, Client};
use std::cell::Cell;
use std::fmt::{Display, Formatter};
use std::io::{self, IsTerminal, Read};
use tokio::io::{AsyncWriteExt, copy};
use tokio::sync::{Mutex, mpsc, watch};
use tracing::{debug, info, warn};

use crate::error::ExecError;
use crate::model::shell_candidates;

const DEFAULT_CONTAINER_ANNOTATION: &str = "kubectl.kubernetes.io/default-container";
const STDIN_CHUNK: usize = 4096;
const MISSING_BINARY_MARKERS: [&str; 2] = ["executable file not found", "no such file"];

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ExitOutcome {
    /// The remote shell ran and exited; a non-zero code is not a session error.
    Completed { exit_code: i32 },
    ConnectionError(String),
    PodNotRunnable { phase: String },
    NoUsableShell,
}

impl ExitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

impl Display for ExitOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed { exit_code } => write!(f, "shell exited with code {exit_code}"),
            Self::ConnectionError(message) => write!(f, "connection error: {message}"),
            Self::PodNotRunnable { phase } => write!(
                f,
                "cannot exec into a container in a completed pod; current phase is {phase}"
            ),
            Self::NoUsableShell => write!(f, "no usable shell found (tried bash, ash, sh)"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PodSnapshot {
    pub phase: Option<String>,
    pub containers: Vec<String>,
    pub default_container: Option<String>,
}

impl PodSnapshot {
    fn from_pod(pod: &Pod) -> Self {
        Self {
            phase: pod.status.as_ref().and_then(|status| status.phase.clone()),
            containers: pod
                .spec
                .as_ref()
                .map(|spec| spec.containers.iter().map(|c| c.name.clone()).collect())
                .unwrap_or_default(),
            default_container: pod
                .metadata
                .annotations
                .as_ref()
                .and_then(|annotations| annotations.get(DEFAULT_CONTAINER_ANNOTATION))
                .cloned(),
        }
    }

    fn is_finished(&self) -> bool {
        matches!(self.phase.as_deref(), Some("Succeeded") | Some("Failed"))
    }

    /// Annotated default first, otherwise the first spec container.
    fn default_container(&self) -> Option<&str> {
        self.default_container
            .as_deref()
            .filter(|name| self.containers.iter().any(|c| c == name))
            .or_else(|| self.containers.first().map(String::as_str))
    }
}

#[derive(Debug, Clone)]
pub struct ExecTarget {
    pub namespace: String,
    pub pod: String,
    pub container: String,
    pub tty: bool,
}

/// The cluster side of an exec session.
pub trait ExecBackend {
    async fn fetch_pod(&self, namespace: &str, pod: &str) -> Result<PodSnapshot, ExecError>;

    /// Opens the exec stream for `command` and pumps it until the remote
    /// process exits, returning its exit code.
    async fn run(&self, target: &ExecTarget, command: &[String]) -> Result<i32, ExecError>;
}

pub trait TerminalControl {
    fn is_interactive(&self) -> bool;
    fn enable_raw(&self) -> io::Result<()>;
    fn disable_raw(&self) -> io::Result<()>;
}

pub struct LocalTerminal;

impl TerminalControl for LocalTerminal {
    fn is_interactive(&self) -> bool {
        io::stdin().is_terminal() && io::stdout().is_terminal()
    }

    fn enable_raw(&self) -> io::Result<()> {
        crossterm::terminal::enable_raw_mode()
    }

    fn disable_raw(&self) -> io::Result<()> {
        crossterm::terminal::disable_raw_mode()
    }
}

pub struct RawModeGuard<'a, T: TerminalControl> {
    terminal: &'a T,
}

impl<'a, T: TerminalControl> RawModeGuard<'a, T> {
    pub fn enter(terminal: &'a T) -> io::Result<Self> {
        terminal.enable_raw()?;
        Ok(Self { terminal })
    }
}

impl<T: TerminalControl> Drop for RawModeGuard<'_, T> {
    fn drop(&mut self) {
        if let Err(error) = self.terminal.disable_raw() {
            warn!(%error, "failed to restore terminal mode");
        }
    }
}

pub async fn attach<B, T>(
    backend: &B,
    terminal: &T,
    namespace: &str,
    pod: &str,
    container: Option<&str>,
) -> ExitOutcome
where
    B: ExecBackend,
    T: TerminalControl,
{
    let snapshot = match backend.fetch_pod(namespace, pod).await {
        Ok(snapshot) => snapshot,
        Err(ExecError::Connection(message) | ExecError::Rejected(message)) => {
            return ExitOutcome::ConnectionError(message);
        }
    };
    if snapshot.is_finished() {
        return ExitOutcome::PodNotRunnable {
            phase: snapshot.phase.unwrap_or_default(),
        };
    }

    let container = match container.filter(|name| !name.is_empty()) {
        Some(name) => name.to_string(),
        None => match snapshot.default_container() {
            Some(name) => {
                debug!(container = name, "using default container");
                name.to_string()
            }
            None => {
                return ExitOutcome::ConnectionError(format!(
                    "pod {namespace}/{pod} has no containers"
                ));
            }
        },
    };

    for command in shell_candidates() {
        let result = {
            let guard = if terminal.is_interactive() {
                match RawModeGuard::enter(terminal) {
                    Ok(guard) => Some(guard),
                    Err(error) => {
                        warn!(%error, "raw mode unavailable, attaching without a tty");
                        None
                    }
                }
            } else {
                None
            };
            let target = ExecTarget {
                namespace: namespace.to_string(),
                pod: pod.to_string(),
                container: container.clone(),
                tty: guard.is_some(),
            };
            info!(%namespace, %pod, %container, shell = %command.join(" "), "opening shell");
            backend.run(&target, &command).await
        };

        match result {
            Ok(exit_code) => return ExitOutcome::Completed { exit_code },
            Err(ExecError::Rejected(message)) => {
                warn!(shell = %command.join(" "), %message, "shell rejected, trying next");
                eprintln!("Error opening shell {}: {message}", command.join(" "));
            }
            Err(ExecError::Connection(message)) => return ExitOutcome::ConnectionError(message),
        }
    }

    ExitOutcome::NoUsableShell
}

/// Exec backend speaking the websocket exec sub-resource through kube-rs.
pub struct KubeExec {
    client: Client,
    stdin: Mutex<mpsc::Receiver<Vec<u8>>>,
}

impl KubeExec {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            stdin: Mutex::new(spawn_stdin_reader()),
        }
    }
}

impl ExecBackend for KubeExec {
    async fn fetch_pod(&self, namespace: &str, pod: &str) -> Result<PodSnapshot, ExecError> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let pod = pods
            .get(pod)
            .await
            .map_err(|error| ExecError::connection(format!("failed to fetch pod: {error}")))?;
        Ok(PodSnapshot::from_pod(&pod))
    }

    async fn run(&self, target: &ExecTarget, command: &[String]) -> Result<i32, ExecError> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), &target.namespace);
        let params = AttachParams {
            container: Some(target.container.clone()),
            stdin: true,
            stdout: true,
            stderr: !target.tty,
            tty: target.tty,
            ..AttachParams::default()
        };

        let mut attached = pods.exec(&target.pod, command.to_vec(), &params).await?;
        let mut remote_stdin = attached
            .stdin()
            .ok_or_else(|| ExecError::connection("exec: stdin not available"))?;
        let mut remote_stdout = attached
            .stdout()
            .ok_or_else(|| ExecError::connection("exec: stdout not available"))?;
        let remote_stderr = attached.stderr();
        let status = attached
            .take_status()
            .ok_or_else(|| ExecError::connection("exec: status channel not available"))?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let resize_task = if target.tty {
            attached.terminal_size().map(|sink| {
                tokio::spawn(forward_resizes(
                    window_changes(),
                    || crossterm::terminal::size().ok(),
                    sink,
                    shutdown_rx,
                ))
            })
        } else {
            None
        };

        let forwarded_input = Cell::new(false);
        let output = {
            let mut local_stdin = self.stdin.lock().await;
            let forwarded_input = &forwarded_input;
            let forward_stdin = async move {
                while let Some(chunk) = local_stdin.recv().await {
                    if remote_stdin.write_all(&chunk).await.is_err()
                        || remote_stdin.flush().await.is_err()
                    {
                        break;
                    }
                    forwarded_input.set(true);
                }
                let _ = remote_stdin.shutdown().await;
            };
            let copy_output = async {
                let stdout = async {
                    let mut local_stdout = tokio::io::stdout();
                    copy(&mut remote_stdout, &mut local_stdout).await?;
                    local_stdout.flush().await
                };
                let stderr = async {
                    match remote_stderr {
                        Some(mut remote_stderr) => copy(&mut remote_stderr, &mut tokio::io::stderr())
                            .await
                            .map(|_| ()),
                        None => Ok(()),
                    }
                };
                let (stdout, stderr) = tokio::join!(stdout, stderr);
                stdout.and(stderr)
            };
            tokio::pin!(forward_stdin);
            tokio::pin!(copy_output);

            tokio::select! {
                output = &mut copy_output => output,
                () = &mut forward_stdin => {
                    debug!("local stdin closed");
                    (&mut copy_output).await
                }
            }
        };

        let status = status.await;
        let _ = shutdown_tx.send(true);
        if let Some(task) = resize_task {
            let _ = task.await;
        }
        let joined = attached.join().await;

        let exit_code = classify_status(status, forwarded_input.get())?;
        output?;
        joined.map_err(|error| ExecError::connection(error.to_string()))?;
        Ok(exit_code)
    }
}

/// Maps the exec status channel to an exit code or a rejected command.
///
/// Some runtimes report a missing binary as exit code 126 or 127 instead of
/// a failure status. Those codes count as a rejection unless the user already
/// typed into the session.
fn classify_status(status: Option<Status>, forwarded_input: bool) -> Result<i32, ExecError> {
    let Some(status) = status else {
        return Ok(0);
    };
    if status.status.as_deref() == Some("Success") {
        return Ok(0);
    }
    if status.reason.as_deref() == Some("NonZeroExitCode") {
        let code = status
            .details
            .as_ref()
            .and_then(|details| details.causes.as_ref())
            .into_iter()
            .flatten()
            .find(|cause| cause.reason.as_deref() == Some("ExitCode"))
            .and_then(|cause| cause.message.as_deref())
            .and_then(|message| message.trim().parse::<i32>().ok())
            .unwrap_or(1);
        let message = status.message.unwrap_or_default();
        let missing_binary = MISSING_BINARY_MARKERS
            .iter()
            .any(|marker| message.contains(marker));
        if missing_binary || (!forwarded_input && matches!(code, 126 | 127)) {
            return Err(ExecError::rejected(format!(
                "command terminated with exit code {code}: {message}"
            )));
        }
        return Ok(code);
    }
    Err(ExecError::rejected(
        status
            .message
            .unwrap_or_else(|| "command failed to start".to_string()),
    ))
}

/// Sends the local size once, then again on every tick where it changed.
/// A full channel drops the update instead of queueing behind it.
pub async fn forward_resizes<S, F>(
    mut ticks: S,
    mut current_size: F,
    mut sink: Sender<TerminalSize>,
    mut shutdown: watch::Receiver<bool>,
) where
    S: Stream<Item = ()> + Unpin,
    F: FnMut() -> Option<(u16, u16)>,
{
    let mut last_sent = None;
    loop {
        if let Some((width, height)) = current_size()
            && last_sent != Some((width, height))
        {
            match sink.try_send(TerminalSize { width, height }) {
                Ok(()) => last_sent = Some((width, height)),
                Err(error) if error.is_disconnected() => break,
                // Still full: the next tick re-reads the size and retries.
                Err(_) => {}
            }
        }

        tokio::select! {
            _ = shutdown.changed() => break,
            tick = ticks.next() => {
                if tick.is_none() {
                    break;
                }
            }
        }
    }
}

#[cfg(unix)]
fn window_changes() -> std::pin::Pin<Box<dyn Stream<Item = ()> + Send>> {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::window_change()) {
        Ok(signal) => Box::pin(futures::stream::unfold(signal, |mut signal| async move {
            signal.recv().await.map(|()| ((), signal))
        })),
        Err(error) => {
            warn!(%error, "cannot watch terminal resizes");
            Box::pin(futures::stream::pending())
        }
    }
}

#[cfg(not(unix))]
fn window_changes() -> std::pin::Pin<Box<dyn Stream<Item = ()> + Send>> {
    Box::pin(futures::stream::pending())
}

/// One reader thread for the whole run, so a failed shell attempt never
/// swallows keystrokes meant for the next one.
fn spawn_stdin_reader() -> mpsc::Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel(64);
    std::thread::spawn(move || {
        let mut stdin = io::stdin().lock();
        let mut buf = [0u8; STDIN_CHUNK];
        loop {
            match stdin.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if tx.blocking_send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::{
        ExecBackend, ExecTarget, ExitOutcome, PodSnapshot, RawModeGuard, TerminalControl, attach,
        classify_status, forward_resizes,
    };
    use crate::error::ExecError;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::{Status, StatusCause, StatusDetails};
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::io;
    use tokio::sync::watch;

    #[derive(Default)]
    struct FakeTerminal {
        non_interactive: bool,
        refuse_raw: bool,
        raw: Cell<bool>,
        enters: Cell<usize>,
        releases: Cell<usize>,
    }

    impl TerminalControl for FakeTerminal {
        fn is_interactive(&self) -> bool {
            !self.non_interactive
        }

        fn enable_raw(&self) -> io::Result<()> {
            if self.refuse_raw {
                return Err(io::Error::other("not a tty"));
            }
            assert!(!self.raw.get(), "raw mode entered twice");
            self.raw.set(true);
            self.enters.set(self.enters.get() + 1);
            Ok(())
        }

        fn disable_raw(&self) -> io::Result<()> {
            assert!(self.raw.get(), "raw mode released without being entered");
            self.raw.set(false);
            self.releases.set(self.releases.get() + 1);
            Ok(())
        }
    }

    enum Script {
        Exit(i32),
        Status(Status),
        Reject,
        Break,
    }

    struct FakeBackend {
        snapshot: PodSnapshot,
        fetch_fails: bool,
        scripts: HashMap<&'static str, Script>,
        attempts: RefCell<Vec<Vec<String>>>,
        targets: RefCell<Vec<ExecTarget>>,
    }

    impl FakeBackend {
        fn running(scripts: Vec<(&'static str, Script)>) -> Self {
            Self {
                snapshot: PodSnapshot {
                    phase: Some("Running".to_string()),
                    containers: vec!["app".to_string(), "sidecar".to_string()],
                    default_container: None,
                },
                fetch_fails: false,
                scripts: scripts.into_iter().collect(),
                attempts: RefCell::new(Vec::new()),
                targets: RefCell::new(Vec::new()),
            }
        }

        fn attempted(&self) -> Vec<String> {
            self.attempts
                .borrow()
                .iter()
                .map(|command| command.join(" "))
                .collect()
        }
    }

    impl ExecBackend for FakeBackend {
        async fn fetch_pod(&self, _namespace: &str, _pod: &str) -> Result<PodSnapshot, ExecError> {
            if self.fetch_fails {
                return Err(ExecError::connection("connection refused"));
            }
            Ok(self.snapshot.clone())
        }

        async fn run(&self, target: &ExecTarget, command: &[String]) -> Result<i32, ExecError> {
            self.attempts.borrow_mut().push(command.to_vec());
            self.targets.borrow_mut().push(target.clone());
            match self.scripts.get(command[0].as_str()) {
                Some(Script::Exit(code)) => Ok(*code),
                Some(Script::Status(status)) => classify_status(Some(status.clone()), false),
                Some(Script::Break) => Err(ExecError::connection("stream reset")),
                Some(Script::Reject) | None => Err(ExecError::rejected(format!(
                    "exec: \"{}\": executable file not found in $PATH",
                    command[0]
                ))),
            }
        }
    }

    fn exit_status(code: i32, message: &str) -> Status {
        Status {
            status: Some("Failure".to_string()),
            reason: Some("NonZeroExitCode".to_string()),
            message: Some(message.to_string()),
            details: Some(StatusDetails {
                causes: Some(vec![StatusCause {
                    reason: Some("ExitCode".to_string()),
                    message: Some(code.to_string()),
                    ..StatusCause::default()
                }]),
                ..StatusDetails::default()
            }),
            ..Status::default()
        }
    }

    async fn attach_app(backend: &FakeBackend, terminal: &FakeTerminal) -> ExitOutcome {
        attach(backend, terminal, "default", "web-7f", Some("app")).await
    }

    #[tokio::test]
    async fn falls_back_to_sh_in_order() {
        let backend = FakeBackend::running(vec![
            ("bash", Script::Reject),
            ("ash", Script::Reject),
            ("sh", Script::Exit(0)),
        ]);
        let terminal = FakeTerminal::default();

        let outcome = attach_app(&backend, &terminal).await;
        assert_eq!(outcome, ExitOutcome::Completed { exit_code: 0 });
        assert_eq!(backend.attempted(), vec!["bash", "ash", "sh"]);
        assert_eq!(terminal.enters.get(), 3);
        assert_eq!(terminal.releases.get(), 3);
        assert!(!terminal.raw.get());
    }

    #[tokio::test]
    async fn bash_success_stops_the_loop() {
        let backend = FakeBackend::running(vec![("bash", Script::Exit(0))]);
        let terminal = FakeTerminal::default();

        let outcome = attach_app(&backend, &terminal).await;
        assert!(outcome.is_success());
        assert_eq!(backend.attempted(), vec!["bash"]);
        assert_eq!(terminal.releases.get(), 1);
    }

    #[tokio::test]
    async fn all_shells_rejected_is_no_usable_shell() {
        let backend = FakeBackend::running(Vec::new());
        let terminal = FakeTerminal::default();

        let outcome = attach_app(&backend, &terminal).await;
        assert_eq!(outcome, ExitOutcome::NoUsableShell);
        assert_eq!(backend.attempted(), vec!["bash", "ash", "sh"]);
        assert_eq!(terminal.enters.get(), terminal.releases.get());
        assert!(!terminal.raw.get());
    }

    #[tokio::test]
    async fn non_zero_exit_is_still_completed() {
        let backend = FakeBackend::running(vec![("bash", Script::Exit(130))]);
        let terminal = FakeTerminal::default();

        let outcome = attach_app(&backend, &terminal).await;
        assert_eq!(outcome, ExitOutcome::Completed { exit_code: 130 });
        assert_eq!(terminal.releases.get(), 1);
    }

    #[tokio::test]
    async fn broken_stream_releases_raw_mode_and_stops() {
        let backend = FakeBackend::running(vec![("bash", Script::Break)]);
        let terminal = FakeTerminal::default();

        let outcome = attach_app(&backend, &terminal).await;
        assert_eq!(
            outcome,
            ExitOutcome::ConnectionError("stream reset".to_string())
        );
        assert_eq!(backend.attempted(), vec!["bash"]);
        assert_eq!(terminal.enters.get(), 1);
        assert_eq!(terminal.releases.get(), 1);
    }

    #[tokio::test]
    async fn finished_pod_is_not_runnable() {
        for phase in ["Succeeded", "Failed"] {
            let mut backend = FakeBackend::running(vec![("bash", Script::Exit(0))]);
            backend.snapshot.phase = Some(phase.to_string());
            let terminal = FakeTerminal::default();

            let outcome = attach_app(&backend, &terminal).await;
            assert_eq!(
                outcome,
                ExitOutcome::PodNotRunnable {
                    phase: phase.to_string()
                }
            );
            assert!(backend.attempted().is_empty());
            assert_eq!(terminal.enters.get(), 0);
            assert_eq!(terminal.releases.get(), 0);
        }
    }

    #[tokio::test]
    async fn pod_lookup_failure_is_connection_error() {
        let mut backend = FakeBackend::running(Vec::new());
        backend.fetch_fails = true;
        let terminal = FakeTerminal::default();

        let outcome = attach_app(&backend, &terminal).await;
        assert!(matches!(outcome, ExitOutcome::ConnectionError(_)));
        assert_eq!(terminal.enters.get(), 0);
    }

    #[tokio::test]
    async fn missing_container_uses_annotated_default() {
        let mut backend = FakeBackend::running(vec![("bash", Script::Exit(0))]);
        backend.snapshot.default_container = Some("sidecar".to_string());
        let terminal = FakeTerminal::default();

        attach(&backend, &terminal, "default", "web-7f", None).await;
        assert_eq!(backend.targets.borrow()[0].container, "sidecar");
    }

    #[tokio::test]
    async fn missing_container_falls_back_to_first() {
        let backend = FakeBackend::running(vec![("bash", Script::Exit(0))]);
        let terminal = FakeTerminal::default();

        attach(&backend, &terminal, "default", "web-7f", Some("")).await;
        assert_eq!(backend.targets.borrow()[0].container, "app");
    }

    #[tokio::test]
    async fn non_interactive_session_skips_raw_mode_and_tty() {
        let backend = FakeBackend::running(vec![("bash", Script::Exit(0))]);
        let terminal = FakeTerminal {
            non_interactive: true,
            ..FakeTerminal::default()
        };

        attach_app(&backend, &terminal).await;
        assert_eq!(terminal.enters.get(), 0);
        assert!(!backend.targets.borrow()[0].tty);
    }

    #[tokio::test]
    async fn refused_raw_mode_attaches_without_tty() {
        let backend = FakeBackend::running(vec![("bash", Script::Exit(0))]);
        let terminal = FakeTerminal {
            refuse_raw: true,
            ..FakeTerminal::default()
        };

        let outcome = attach_app(&backend, &terminal).await;
        assert!(outcome.is_success());
        assert!(!backend.targets.borrow()[0].tty);
        assert_eq!(terminal.releases.get(), 0);
    }

    #[test]
    fn guard_releases_on_drop() {
        let terminal = FakeTerminal::default();
        {
            let _guard = RawModeGuard::enter(&terminal).expect("raw mode should enter");
            assert!(terminal.raw.get());
        }
        assert!(!terminal.raw.get());
        assert_eq!(terminal.releases.get(), 1);
    }

    #[test]
    fn status_classification() {
        let success = Status {
            status: Some("Success".to_string()),
            ..Status::default()
        };
        assert_eq!(classify_status(Some(success), false).ok(), Some(0));
        assert_eq!(classify_status(None, false).ok(), Some(0));

        let non_zero = Status {
            status: Some("Failure".to_string()),
            reason: Some("NonZeroExitCode".to_string()),
            details: Some(StatusDetails {
                causes: Some(vec![StatusCause {
                    reason: Some("ExitCode".to_string()),
                    message: Some("127".to_string()),
                    ..StatusCause::default()
                }]),
                ..StatusDetails::default()
            }),
            ..Status::default()
        };
        assert_eq!(classify_status(Some(non_zero), true).ok(), Some(127));
        assert_eq!(classify_status(Some(exit_status(2, "")), false).ok(), Some(2));

        let missing = Status {
            status: Some("Failure".to_string()),
            message: Some("exec: \"bash\": executable file not found in $PATH".to_string()),
            ..Status::default()
        };
        assert!(matches!(
            classify_status(Some(missing), false),
            Err(ExecError::Rejected(message)) if message.contains("bash")
        ));
    }

    #[test]
    fn missing_binary_exit_codes_are_rejections() {
        assert!(matches!(
            classify_status(Some(exit_status(126, "")), false),
            Err(ExecError::Rejected(_))
        ));
        assert!(matches!(
            classify_status(Some(exit_status(127, "")), false),
            Err(ExecError::Rejected(_))
        ));
        assert!(matches!(
            classify_status(
                Some(exit_status(1, "exec: \"bash\": no such file or directory")),
                true
            ),
            Err(ExecError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn exit_126_for_bash_falls_back_to_sh() {
        let backend = FakeBackend::running(vec![
            ("bash", Script::Status(exit_status(126, ""))),
            ("ash", Script::Status(exit_status(127, ""))),
            ("sh", Script::Exit(0)),
        ]);
        let terminal = FakeTerminal::default();

        let outcome = attach_app(&backend, &terminal).await;
        assert_eq!(outcome, ExitOutcome::Completed { exit_code: 0 });
        assert_eq!(backend.attempted(), vec!["bash", "ash", "sh"]);
        assert_eq!(terminal.enters.get(), terminal.releases.get());
    }

    #[tokio::test]
    async fn resizes_are_deduplicated() {
        let sizes = RefCell::new(vec![(80, 24), (80, 24), (120, 40), (120, 40)].into_iter());
        let (sink, mut received) = futures::channel::mpsc::channel(8);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        forward_resizes(
            futures::stream::iter(vec![(), (), ()]),
            || sizes.borrow_mut().next(),
            sink,
            shutdown_rx,
        )
        .await;

        let mut sent = Vec::new();
        while let Ok(Some(size)) = received.try_next() {
            sent.push((size.width, size.height));
        }
        assert_eq!(sent, vec![(80, 24), (120, 40)]);
    }

    #[tokio::test]
    async fn resize_watcher_stops_on_shutdown() {
        let (sink, _received) = futures::channel::mpsc::channel(8);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        shutdown_tx.send(true).expect("receiver should be alive");

        forward_resizes(
            futures::stream::pending::<()>(),
            || Some((80, 24)),
            sink,
            shutdown_rx,
        )
        .await;
    }
}
