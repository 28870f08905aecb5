use crate::banner::banner_height;
use crate::error::ClusterQueryError;
use crate::input::Action;
use crate::k8s::ClusterGateway;
use crate::model::{
    ListState, NavLevel, NavigationFrame, SelectableItem, SelectionResult, visible_rows_for,
};
use tracing::debug;

const LABEL_BORDER_ROWS: usize = 2;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum InputMode {
    Normal,
    Filter,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum NavState {
    SelectingNamespace,
    SelectingPod,
    SelectingContainer,
    Done(SelectionResult),
    Cancelled,
}

/// Cluster work requested by a transition; executed by [`run_command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    None,
    LoadPods { namespace: String },
    LoadContainers { namespace: String, pod: String },
}

#[derive(Debug, Clone, Eq, PartialEq)]
enum Finish {
    Done(SelectionResult),
    Cancelled,
}

pub struct App {
    context: String,
    stack: Vec<NavigationFrame>,
    finish: Option<Finish>,
    mode: InputMode,
    status: Option<String>,
    show_labels: bool,
    terminal_rows: Option<u16>,
}

impl App {
    pub fn new(context: String, namespaces: Vec<SelectableItem>, show_labels: bool) -> Self {
        Self {
            context,
            stack: vec![NavigationFrame::namespaces(ListState::new(namespaces))],
            finish: None,
            mode: InputMode::Normal,
            status: None,
            show_labels,
            terminal_rows: None,
        }
    }

    pub fn state(&self) -> NavState {
        match &self.finish {
            Some(Finish::Done(result)) => return NavState::Done(result.clone()),
            Some(Finish::Cancelled) => return NavState::Cancelled,
            None => {}
        }
        match self.active_frame().level() {
            NavLevel::Namespace => NavState::SelectingNamespace,
            NavLevel::Pod => NavState::SelectingPod,
            NavLevel::Container => NavState::SelectingContainer,
        }
    }

    pub fn running(&self) -> bool {
        self.finish.is_none()
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn active_frame(&self) -> &NavigationFrame {
        // The namespace frame at the bottom is never popped.
        &self.stack[self.stack.len() - 1]
    }

    fn active_list_mut(&mut self) -> &mut ListState {
        let last = self.stack.len() - 1;
        &mut self.stack[last].list
    }

    /// Rows of the label panel for the highlighted item, borders included.
    pub fn auxiliary_rows(&self) -> usize {
        if !self.show_labels {
            return 0;
        }
        self.active_frame()
            .list
            .selected()
            .filter(|item| item.has_metadata())
            .map(|item| item.metadata.len() + LABEL_BORDER_ROWS)
            .unwrap_or(0)
    }

    pub fn apply_action(&mut self, action: Action) -> AppCommand {
        if !self.running() {
            return AppCommand::None;
        }
        self.status = None;
        let command = self.dispatch(action);
        // Cursor and filter moves change the label panel height.
        self.fit_window();
        command
    }

    fn dispatch(&mut self, action: Action) -> AppCommand {

        match action {
            Action::Cancel => {
                debug!("navigation cancelled");
                self.finish = Some(Finish::Cancelled);
                AppCommand::None
            }
            Action::Back => {
                self.pop_frame();
                AppCommand::None
            }
            Action::Confirm => self.confirm_selected(),
            Action::Down => self.move_cursor(1),
            Action::Up => self.move_cursor(-1),
            Action::PageDown => self.move_cursor(self.page_step()),
            Action::PageUp => self.move_cursor(-self.page_step()),
            Action::Top => {
                self.active_list_mut().select_first();
                AppCommand::None
            }
            Action::Bottom => {
                self.active_list_mut().select_last();
                AppCommand::None
            }
            Action::StartFilter => {
                self.mode = InputMode::Filter;
                AppCommand::None
            }
            Action::AcceptFilter => {
                self.mode = InputMode::Normal;
                AppCommand::None
            }
            Action::ClearFilter => {
                self.mode = InputMode::Normal;
                self.active_list_mut().set_filter("");
                AppCommand::None
            }
            Action::Backspace => {
                let mut query = self.active_frame().list.filter_query().to_string();
                query.pop();
                self.active_list_mut().set_filter(&query);
                AppCommand::None
            }
            Action::InputChar(c) => {
                let mut query = self.active_frame().list.filter_query().to_string();
                query.push(c);
                self.active_list_mut().set_filter(&query);
                AppCommand::None
            }
        }
    }

    pub fn on_resize(&mut self, rows: u16) {
        self.terminal_rows = Some(rows);
        self.fit_window();
    }

    /// Sizes the active list to the last known terminal height.
    fn fit_window(&mut self) {
        let Some(rows) = self.terminal_rows else {
            return;
        };
        let level = self.active_frame().level();
        let aux = self.auxiliary_rows();
        let item_count = self.active_frame().list.len();
        let visible = visible_rows_for(rows, banner_height(level), aux, item_count);
        self.active_list_mut().set_window_rows(visible);
    }

    pub fn finish_pods(&mut self, namespace: String, pods: Vec<SelectableItem>) {
        if pods.is_empty() {
            debug!(namespace = %namespace, "namespace has no pods");
            self.status = Some(format!("No pods found in namespace {namespace}"));
            return;
        }
        debug!(namespace = %namespace, count = pods.len(), "entering pod selection");
        self.enter_level(NavigationFrame::pods(namespace, ListState::new(pods)));
    }

    pub fn finish_containers(
        &mut self,
        namespace: String,
        pod: String,
        mut containers: Vec<SelectableItem>,
    ) {
        match containers.len() {
            0 => {
                self.status = Some(format!("Pod {namespace}/{pod} has no containers"));
            }
            1 => {
                let container = containers.remove(0).name;
                debug!(%namespace, %pod, %container, "single container, skipping selection");
                self.finish = Some(Finish::Done(SelectionResult {
                    namespace,
                    pod,
                    container,
                }));
            }
            count => {
                debug!(%namespace, %pod, count, "entering container selection");
                self.enter_level(NavigationFrame::containers(
                    namespace,
                    pod,
                    ListState::new(containers),
                ));
            }
        }
    }

    fn enter_level(&mut self, frame: NavigationFrame) {
        self.stack.push(frame);
        self.mode = InputMode::Normal;
        self.fit_window();
    }

    fn pop_frame(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        if let Some(frame) = self.stack.pop() {
            debug!(level = frame.level().title(), "left level");
        }
        self.mode = InputMode::Normal;
        self.fit_window();
    }

    fn confirm_selected(&mut self) -> AppCommand {
        let frame = self.active_frame();
        let Some(item) = frame.list.selected() else {
            return AppCommand::None;
        };
        let name = item.name.clone();
        let level = frame.level();
        let namespace = frame.resolved_namespace().map(str::to_string);
        let pod = frame.resolved_pod().map(str::to_string);

        match (level, namespace, pod) {
            (NavLevel::Namespace, _, _) => AppCommand::LoadPods { namespace: name },
            (NavLevel::Pod, Some(namespace), _) => AppCommand::LoadContainers {
                namespace,
                pod: name,
            },
            (NavLevel::Container, Some(namespace), Some(pod)) => {
                self.finish = Some(Finish::Done(SelectionResult {
                    namespace,
                    pod,
                    container: name,
                }));
                AppCommand::None
            }
            _ => AppCommand::None,
        }
    }

    fn move_cursor(&mut self, delta: isize) -> AppCommand {
        self.active_list_mut().move_cursor(delta);
        AppCommand::None
    }

    fn page_step(&self) -> isize {
        self.active_frame().list.window_rows().max(1) as isize
    }
}

/// Runs the cluster query behind `command` and feeds the result back into `app`.
pub async fn run_command<G: ClusterGateway>(
    app: &mut App,
    gateway: &G,
    command: AppCommand,
) -> Result<(), ClusterQueryError> {
    match command {
        AppCommand::None => {}
        AppCommand::LoadPods { namespace } => {
            let pods = gateway.list_pods(&namespace).await?;
            app.finish_pods(namespace, pods);
        }
        AppCommand::LoadContainers { namespace, pod } => {
            let containers = gateway.list_containers(&namespace, &pod).await?;
            app.finish_containers(namespace, pod, containers);
        }
    }
    Ok(())
}
